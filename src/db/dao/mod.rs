use chrono::{NaiveDate, NaiveTime};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::Deserialize;

pub mod context;
pub mod error;
pub mod expense_dao;
pub mod income_dao;
pub mod mileage_dao;
pub mod password_reset_dao;
pub mod refresh_session_dao;
pub mod staff_dao;
pub mod store_dao;
pub mod user_dao;

pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use expense_dao::ExpenseDao;
pub use income_dao::IncomeDao;
pub use mileage_dao::MileageDao;
pub use password_reset_dao::PasswordResetDao;
pub use refresh_session_dao::RefreshSessionDao;
pub use staff_dao::StaffDao;
pub use store_dao::StoreDao;
pub use user_dao::UserDao;

/// Which column a date filter applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateField {
    #[default]
    Date,
    CreatedAt,
}

/// Inclusive calendar-date window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Half-open timestamp bounds covering the same calendar days, for filters
/// that target a creation timestamp instead of the record's date column.
pub(crate) fn timestamp_bound_start(day: NaiveDate) -> DateTimeWithTimeZone {
    day.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

pub(crate) fn timestamp_bound_end(day: NaiveDate) -> DateTimeWithTimeZone {
    let next = day.succ_opt().unwrap_or(day);
    next.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}
