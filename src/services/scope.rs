use chrono::NaiveDate;

use crate::{
    auth::{Claims, Role},
    db::dao::DateRange,
    error::AppError,
};

/// Authenticated caller as seen by the services. Derived from the verified
/// access-token claims at the route boundary.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub handle: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_plain_user(&self) -> bool {
        self.role == Role::User
    }
}

impl TryFrom<&Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            handle: claims.handle.clone(),
            role: claims.effective_role(),
        })
    }
}

/// Owner for a new ledger record: plain users always write their own rows,
/// privileged roles must name the target user.
pub fn resolve_target_user(
    current: &CurrentUser,
    requested: Option<i32>,
) -> Result<i32, AppError> {
    if current.is_plain_user() {
        return Ok(current.id);
    }
    requested.ok_or_else(|| AppError::bad_request("A target user must be specified"))
}

/// Owner filter for listings and aggregates: plain users are pinned to
/// themselves, privileged roles may narrow to any user or see everything.
pub fn resolve_filter_user(current: &CurrentUser, requested: Option<i32>) -> Option<i32> {
    if current.is_plain_user() {
        return Some(current.id);
    }
    requested
}

/// Owner constraint for single-record access.
pub fn resolve_owner(current: &CurrentUser) -> Option<i32> {
    current.is_plain_user().then_some(current.id)
}

/// Date-range resolution shared by the ledger listings: explicit from/to
/// bounds win, otherwise month (requires year), otherwise year.
pub fn resolve_date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<DateRange, AppError> {
    if from.is_some() || to.is_some() {
        return Ok(DateRange { start: from, end: to });
    }

    if let Some(month) = month {
        let Some(year) = year else {
            return Err(AppError::bad_request(
                "A year is required when a month is specified",
            ));
        };
        return month_range(year, month);
    }

    if let Some(year) = year {
        return year_range(year);
    }

    Ok(DateRange::default())
}

pub fn month_range(year: i32, month: u32) -> Result<DateRange, AppError> {
    if year < 1 {
        return Err(AppError::bad_request("The year must be a valid value"));
    }
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("The month must be between 1 and 12"));
    }

    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::bad_request("The month must be between 1 and 12"))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let end = next_month
        .and_then(|day| day.pred_opt())
        .ok_or_else(|| AppError::bad_request("The year must be a valid value"))?;

    Ok(DateRange::between(start, end))
}

pub fn year_range(year: i32) -> Result<DateRange, AppError> {
    if year < 1 {
        return Err(AppError::bad_request("The year must be a valid value"));
    }
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange::between(start, end)),
        _ => Err(AppError::bad_request("The year must be a valid value")),
    }
}

/// List page with the metadata the listings return.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Paged<T> {
    /// Without an explicit page/limit the whole result set is one page
    /// and `limit` echoes the total.
    pub fn new(data: Vec<T>, total: u64, page: Option<u64>, limit: Option<u64>) -> Self {
        let (page, limit) = match (page, limit) {
            (None, None) => (1, total),
            (page, limit) => (page.unwrap_or(1).max(1), limit.unwrap_or(20).max(1)),
        };
        Self {
            data,
            total,
            page,
            limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}
