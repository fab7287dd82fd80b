use serde::{Deserialize, Deserializer};

/// Tri-state update instruction for optional fields: an absent key leaves
/// the value untouched, an explicit `null` clears it, a value replaces it.
/// Avoids the usual `Option<Option<T>>` ambiguity on PATCH bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Resolves against the current value; `None` means "leave unchanged".
    pub fn apply(self, _current: Option<T>) -> Option<Option<T>> {
        match self {
            FieldUpdate::Unchanged => None,
            FieldUpdate::Clear => Some(None),
            FieldUpdate::Set(value) => Some(Some(value)),
        }
    }
}

// Only ever reached for keys present in the body; `#[serde(default)]` on the
// field covers the absent case with `Unchanged`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        })
    }
}
