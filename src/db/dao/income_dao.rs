use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use super::expense_dao::page_window;
use super::{DaoResult, DateField, DateRange, timestamp_bound_end, timestamp_bound_start};
use crate::db::entities::income::{self, Entity as Income};

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub user_id: i32,
    pub deposited_by: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct IncomeFilter {
    pub user_id: Option<i32>,
    pub range: DateRange,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Clone)]
pub struct IncomeDao {
    db: DatabaseConnection,
}

impl IncomeDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(&self, new_income: NewIncome) -> DaoResult<income::Model> {
        let model = income::ActiveModel {
            date: Set(new_income.date),
            amount: Set(new_income.amount),
            user_id: Set(new_income.user_id),
            deposited_by: Set(new_income.deposited_by),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_id(
        &self,
        id: i32,
        owner: Option<i32>,
    ) -> DaoResult<Option<income::Model>> {
        let mut query = Income::find_by_id(id);
        if let Some(owner) = owner {
            query = query.filter(income::Column::UserId.eq(owner));
        }
        Ok(query.one(&self.db).await?)
    }

    pub async fn search(&self, filter: &IncomeFilter) -> DaoResult<(Vec<income::Model>, u64)> {
        let mut query = Income::find().order_by_desc(income::Column::Date);

        if let Some(user_id) = filter.user_id {
            query = query.filter(income::Column::UserId.eq(user_id));
        }
        if let Some(start) = filter.range.start {
            query = query.filter(income::Column::Date.gte(start));
        }
        if let Some(end) = filter.range.end {
            query = query.filter(income::Column::Date.lte(end));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = match page_window(filter.page, filter.limit) {
            Some((page, limit)) => {
                query
                    .paginate(&self.db, limit)
                    .fetch_page(page.saturating_sub(1))
                    .await?
            }
            None => query.all(&self.db).await?,
        };
        Ok((rows, total))
    }

    pub async fn update(
        &self,
        id: i32,
        owner: Option<i32>,
        apply: impl FnOnce(&mut income::ActiveModel) + Send,
    ) -> DaoResult<Option<income::Model>> {
        let Some(model) = self.find_by_id(id, owner).await? else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        apply(&mut active);
        Ok(Some(active.update(&self.db).await?))
    }

    pub async fn delete(&self, id: i32, owner: Option<i32>) -> DaoResult<bool> {
        let mut query = Income::delete_by_id(id);
        if let Some(owner) = owner {
            query = query.filter(income::Column::UserId.eq(owner));
        }
        let result = query.exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn sum_amount(
        &self,
        user_id: Option<i32>,
        range: DateRange,
        field: DateField,
    ) -> DaoResult<Decimal> {
        let mut query = Income::find()
            .select_only()
            .column_as(income::Column::Amount.sum(), "total");
        if let Some(user_id) = user_id {
            query = query.filter(income::Column::UserId.eq(user_id));
        }
        query = apply_date_window(query, range, field);

        let total = query.into_tuple::<Option<Decimal>>().one(&self.db).await?;
        Ok(total.flatten().unwrap_or_default())
    }
}

fn apply_date_window(
    mut query: Select<Income>,
    range: DateRange,
    field: DateField,
) -> Select<Income> {
    match field {
        DateField::Date => {
            if let Some(start) = range.start {
                query = query.filter(income::Column::Date.gte(start));
            }
            if let Some(end) = range.end {
                query = query.filter(income::Column::Date.lte(end));
            }
        }
        DateField::CreatedAt => {
            if let Some(start) = range.start {
                query = query.filter(income::Column::CreatedAt.gte(timestamp_bound_start(start)));
            }
            if let Some(end) = range.end {
                query = query.filter(income::Column::CreatedAt.lt(timestamp_bound_end(end)));
            }
        }
    }
    query
}
