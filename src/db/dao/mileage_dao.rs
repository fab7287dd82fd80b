use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use super::expense_dao::page_window;
use super::{DaoResult, DateField, DateRange, timestamp_bound_end, timestamp_bound_start};
use crate::db::entities::mileage_record::{self, Entity as MileageRecord};

#[derive(Debug, Clone)]
pub struct NewMileageRecord {
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub reason: String,
    pub detail: String,
    pub amount: Decimal,
    pub user_id: i32,
    pub store_id: Option<i32>,
    pub ticket: String,
}

#[derive(Debug, Clone, Default)]
pub struct MileageFilter {
    pub user_id: Option<i32>,
    pub range: DateRange,
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Clone)]
pub struct MileageDao {
    db: DatabaseConnection,
}

impl MileageDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(&self, record: NewMileageRecord) -> DaoResult<mileage_record::Model> {
        let model = mileage_record::ActiveModel {
            date: Set(record.date),
            origin: Set(record.origin),
            destination: Set(record.destination),
            reason: Set(record.reason),
            detail: Set(record.detail),
            amount: Set(record.amount),
            user_id: Set(record.user_id),
            store_id: Set(record.store_id),
            ticket: Set(record.ticket),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_id(
        &self,
        id: i32,
        owner: Option<i32>,
    ) -> DaoResult<Option<mileage_record::Model>> {
        let mut query = MileageRecord::find_by_id(id);
        if let Some(owner) = owner {
            query = query.filter(mileage_record::Column::UserId.eq(owner));
        }
        Ok(query.one(&self.db).await?)
    }

    pub async fn search(
        &self,
        filter: &MileageFilter,
    ) -> DaoResult<(Vec<mileage_record::Model>, u64)> {
        let mut query = MileageRecord::find().order_by_desc(mileage_record::Column::Date);

        if let Some(user_id) = filter.user_id {
            query = query.filter(mileage_record::Column::UserId.eq(user_id));
        }
        if let Some(start) = filter.range.start {
            query = query.filter(mileage_record::Column::Date.gte(start));
        }
        if let Some(end) = filter.range.end {
            query = query.filter(mileage_record::Column::Date.lte(end));
        }
        if let Some(keyword) = filter.keyword.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(mileage_record::Column::Origin.contains(keyword))
                    .add(mileage_record::Column::Destination.contains(keyword))
                    .add(mileage_record::Column::Reason.contains(keyword))
                    .add(mileage_record::Column::Detail.contains(keyword))
                    .add(mileage_record::Column::Ticket.contains(keyword)),
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
        apply: impl FnOnce(&mut mileage_record::ActiveModel) + Send,
    ) -> DaoResult<Option<mileage_record::Model>> {
        let Some(model) = self.find_by_id(id, owner).await? else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        apply(&mut active);
        Ok(Some(active.update(&self.db).await?))
    }

    pub async fn delete(&self, id: i32, owner: Option<i32>) -> DaoResult<bool> {
        let mut query = MileageRecord::delete_by_id(id);
        if let Some(owner) = owner {
            query = query.filter(mileage_record::Column::UserId.eq(owner));
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
        let mut query = MileageRecord::find()
            .select_only()
            .column_as(mileage_record::Column::Amount.sum(), "total");
        if let Some(user_id) = user_id {
            query = query.filter(mileage_record::Column::UserId.eq(user_id));
        }
        query = apply_date_window(query, range, field);

        let total = query.into_tuple::<Option<Decimal>>().one(&self.db).await?;
        Ok(total.flatten().unwrap_or_default())
    }
}

fn apply_date_window(
    mut query: Select<MileageRecord>,
    range: DateRange,
    field: DateField,
) -> Select<MileageRecord> {
    match field {
        DateField::Date => {
            if let Some(start) = range.start {
                query = query.filter(mileage_record::Column::Date.gte(start));
            }
            if let Some(end) = range.end {
                query = query.filter(mileage_record::Column::Date.lte(end));
            }
        }
        DateField::CreatedAt => {
            if let Some(start) = range.start {
                query = query
                    .filter(mileage_record::Column::CreatedAt.gte(timestamp_bound_start(start)));
            }
            if let Some(end) = range.end {
                query =
                    query.filter(mileage_record::Column::CreatedAt.lt(timestamp_bound_end(end)));
            }
        }
    }
    query
}
