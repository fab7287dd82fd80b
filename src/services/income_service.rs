use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::Set;

use crate::{
    db::dao::{
        IncomeDao, StaffDao, UserDao,
        income_dao::{IncomeFilter, NewIncome},
    },
    db::entities::income,
    error::AppError,
    services::{
        patch::FieldUpdate,
        scope::{CurrentUser, Paged, resolve_date_range, resolve_filter_user, resolve_owner,
            resolve_target_user},
    },
};

#[derive(Debug, Clone)]
pub struct IncomeInput {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub user_id: Option<i32>,
    pub deposited_by: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct IncomeListQuery {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct IncomePatch {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub deposited_by: FieldUpdate<i32>,
}

#[derive(Clone)]
pub struct IncomeService {
    incomes: IncomeDao,
    users: UserDao,
    staff: StaffDao,
}

impl IncomeService {
    pub fn new(incomes: IncomeDao, users: UserDao, staff: StaffDao) -> Self {
        Self {
            incomes,
            users,
            staff,
        }
    }

    pub async fn create(
        &self,
        input: IncomeInput,
        current: &CurrentUser,
    ) -> Result<income::Model, AppError> {
        let user_id = resolve_target_user(current, input.user_id)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        if let Some(staff_id) = input.deposited_by {
            self.require_staff(staff_id).await?;
        }

        Ok(self
            .incomes
            .create(NewIncome {
                date: input.date,
                amount: input.amount,
                user_id,
                deposited_by: input.deposited_by,
            })
            .await?)
    }

    pub async fn list(
        &self,
        query: IncomeListQuery,
        current: &CurrentUser,
    ) -> Result<Paged<income::Model>, AppError> {
        let filter = IncomeFilter {
            user_id: resolve_filter_user(current, query.user_id),
            range: resolve_date_range(query.from, query.to, query.month, query.year)?,
            page: query.page,
            limit: query.limit,
        };
        let (rows, total) = self.incomes.search(&filter).await?;
        Ok(Paged::new(rows, total, query.page, query.limit))
    }

    pub async fn get(&self, id: i32, current: &CurrentUser) -> Result<income::Model, AppError> {
        self.incomes
            .find_by_id(id, resolve_owner(current))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Income {id} not found")))
    }

    pub async fn update(
        &self,
        id: i32,
        patch: IncomePatch,
        current: &CurrentUser,
    ) -> Result<income::Model, AppError> {
        if let Some(staff_id) = patch.deposited_by.as_set() {
            self.require_staff(*staff_id).await?;
        }

        self.incomes
            .update(id, resolve_owner(current), move |active| {
                if let Some(date) = patch.date {
                    active.date = Set(date);
                }
                if let Some(amount) = patch.amount {
                    active.amount = Set(amount);
                }
                match patch.deposited_by {
                    FieldUpdate::Unchanged => {}
                    FieldUpdate::Clear => active.deposited_by = Set(None),
                    FieldUpdate::Set(staff_id) => active.deposited_by = Set(Some(staff_id)),
                }
            })
            .await?
            .ok_or_else(|| AppError::not_found(format!("Income {id} not found")))
    }

    pub async fn remove(&self, id: i32, current: &CurrentUser) -> Result<(), AppError> {
        let deleted = self.incomes.delete(id, resolve_owner(current)).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Income {id} not found")));
        }
        Ok(())
    }

    async fn require_staff(&self, staff_id: i32) -> Result<(), AppError> {
        self.staff
            .find_by_id(staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff member {staff_id} not found")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    use crate::{
        auth::Role,
        db::dao::{IncomeDao, StaffDao, UserDao},
        db::entities::user,
        error::AppError,
        services::scope::CurrentUser,
        test_helpers::{income_model, user_model},
    };

    use super::{IncomeInput, IncomeService};

    fn service(db: &DatabaseConnection) -> IncomeService {
        IncomeService::new(IncomeDao::new(db), UserDao::new(db), StaffDao::new(db))
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            id: 1,
            handle: Some("admin".to_string()),
            role: Role::Admin,
        }
    }

    fn input(user_id: Option<i32>) -> IncomeInput {
        IncomeInput {
            date: NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date"),
            amount: Decimal::new(120000, 2),
            user_id,
            deposited_by: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_unknown_target_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = service(&db)
            .create(input(Some(99)), &admin())
            .await
            .expect_err("create should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_persists_for_existing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(7, "ana", "ana@x.com")]])
            .append_query_results([[income_model(1, 7, "1200.00")]])
            .into_connection();

        let created = service(&db)
            .create(input(Some(7)), &admin())
            .await
            .expect("create should succeed");
        assert_eq!(created.user_id, 7);
    }
}
