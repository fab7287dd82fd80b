use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use super::{DaoResult, DateField, DateRange, timestamp_bound_end, timestamp_bound_start};
use crate::db::entities::expense::{self, Entity as Expense};

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub item: String,
    pub reason: String,
    pub amount: Decimal,
    pub user_id: i32,
    pub approved_by: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub user_id: Option<i32>,
    pub range: DateRange,
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Clone)]
pub struct ExpenseDao {
    db: DatabaseConnection,
}

impl ExpenseDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(&self, new_expense: NewExpense) -> DaoResult<expense::Model> {
        let model = expense::ActiveModel {
            date: Set(new_expense.date),
            item: Set(new_expense.item),
            reason: Set(new_expense.reason),
            amount: Set(new_expense.amount),
            user_id: Set(new_expense.user_id),
            approved_by: Set(new_expense.approved_by),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Lookup scoped to an owner when the caller may only see its own rows.
    pub async fn find_by_id(
        &self,
        id: i32,
        owner: Option<i32>,
    ) -> DaoResult<Option<expense::Model>> {
        let mut query = Expense::find_by_id(id);
        if let Some(owner) = owner {
            query = query.filter(expense::Column::UserId.eq(owner));
        }
        Ok(query.one(&self.db).await?)
    }

    pub async fn search(&self, filter: &ExpenseFilter) -> DaoResult<(Vec<expense::Model>, u64)> {
        let mut query = Expense::find().order_by_desc(expense::Column::Date);

        if let Some(user_id) = filter.user_id {
            query = query.filter(expense::Column::UserId.eq(user_id));
        }
        if let Some(start) = filter.range.start {
            query = query.filter(expense::Column::Date.gte(start));
        }
        if let Some(end) = filter.range.end {
            query = query.filter(expense::Column::Date.lte(end));
        }
        if let Some(keyword) = filter.keyword.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(expense::Column::Item.contains(keyword))
                    .add(expense::Column::Reason.contains(keyword)),
            );
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
        apply: impl FnOnce(&mut expense::ActiveModel) + Send,
    ) -> DaoResult<Option<expense::Model>> {
        let Some(model) = self.find_by_id(id, owner).await? else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        apply(&mut active);
        Ok(Some(active.update(&self.db).await?))
    }

    pub async fn delete(&self, id: i32, owner: Option<i32>) -> DaoResult<bool> {
        let mut query = Expense::delete_by_id(id);
        if let Some(owner) = owner {
            query = query.filter(expense::Column::UserId.eq(owner));
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
        let mut query = Expense::find()
            .select_only()
            .column_as(expense::Column::Amount.sum(), "total");
        if let Some(user_id) = user_id {
            query = query.filter(expense::Column::UserId.eq(user_id));
        }
        query = apply_date_window(query, range, field);

        let total = query.into_tuple::<Option<Decimal>>().one(&self.db).await?;
        Ok(total.flatten().unwrap_or_default())
    }
}

fn apply_date_window(
    mut query: Select<Expense>,
    range: DateRange,
    field: DateField,
) -> Select<Expense> {
    match field {
        DateField::Date => {
            if let Some(start) = range.start {
                query = query.filter(expense::Column::Date.gte(start));
            }
            if let Some(end) = range.end {
                query = query.filter(expense::Column::Date.lte(end));
            }
        }
        DateField::CreatedAt => {
            if let Some(start) = range.start {
                query = query.filter(expense::Column::CreatedAt.gte(timestamp_bound_start(start)));
            }
            if let Some(end) = range.end {
                query = query.filter(expense::Column::CreatedAt.lt(timestamp_bound_end(end)));
            }
        }
    }
    query
}

pub(crate) fn page_window(page: Option<u64>, limit: Option<u64>) -> Option<(u64, u64)> {
    if page.is_none() && limit.is_none() {
        return None;
    }
    Some((page.unwrap_or(1).max(1), limit.unwrap_or(20).max(1)))
}
