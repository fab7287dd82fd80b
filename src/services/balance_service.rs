use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    db::dao::{DateField, DateRange, ExpenseDao, IncomeDao, MileageDao},
    error::AppError,
    services::scope::{CurrentUser, month_range, resolve_filter_user, year_range},
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceTotals {
    pub total_incomes: Decimal,
    pub total_expenses: Decimal,
    pub total_mileage: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBalance {
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub totals: BalanceTotals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualBalance {
    pub year: i32,
    #[serde(flatten)]
    pub totals: BalanceTotals,
}

#[derive(Clone)]
pub struct BalanceService {
    incomes: IncomeDao,
    expenses: ExpenseDao,
    mileage: MileageDao,
}

impl BalanceService {
    pub fn new(incomes: IncomeDao, expenses: ExpenseDao, mileage: MileageDao) -> Self {
        Self {
            incomes,
            expenses,
            mileage,
        }
    }

    pub async fn overall(
        &self,
        requested_user: Option<i32>,
        field: DateField,
        current: &CurrentUser,
    ) -> Result<BalanceTotals, AppError> {
        let user_id = resolve_filter_user(current, requested_user);
        self.totals(user_id, DateRange::default(), field).await
    }

    pub async fn monthly(
        &self,
        year: i32,
        month: u32,
        requested_user: Option<i32>,
        field: DateField,
        current: &CurrentUser,
    ) -> Result<MonthlyBalance, AppError> {
        let user_id = resolve_filter_user(current, requested_user);
        let range = month_range(year, month)?;
        Ok(MonthlyBalance {
            year,
            month,
            totals: self.totals(user_id, range, field).await?,
        })
    }

    pub async fn annual(
        &self,
        year: i32,
        requested_user: Option<i32>,
        field: DateField,
        current: &CurrentUser,
    ) -> Result<AnnualBalance, AppError> {
        let user_id = resolve_filter_user(current, requested_user);
        let range = year_range(year)?;
        Ok(AnnualBalance {
            year,
            totals: self.totals(user_id, range, field).await?,
        })
    }

    /// balance = incomes − expenses − mileage reimbursements.
    async fn totals(
        &self,
        user_id: Option<i32>,
        range: DateRange,
        field: DateField,
    ) -> Result<BalanceTotals, AppError> {
        let total_incomes = self.incomes.sum_amount(user_id, range, field).await?;
        let total_expenses = self.expenses.sum_amount(user_id, range, field).await?;
        let total_mileage = self.mileage.sum_amount(user_id, range, field).await?;

        Ok(BalanceTotals {
            balance: total_incomes - total_expenses - total_mileage,
            total_incomes,
            total_expenses,
            total_mileage,
        })
    }
}
