use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::Set;

use crate::{
    db::dao::{
        MileageDao, StoreDao,
        mileage_dao::{MileageFilter, NewMileageRecord},
    },
    db::entities::mileage_record,
    error::AppError,
    services::{
        expense_service::normalize_keyword,
        patch::FieldUpdate,
        scope::{CurrentUser, Paged, resolve_date_range, resolve_filter_user, resolve_owner,
            resolve_target_user},
    },
};

#[derive(Debug, Clone)]
pub struct MileageInput {
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub reason: String,
    pub detail: String,
    pub amount: Decimal,
    pub user_id: Option<i32>,
    pub store_id: Option<i32>,
    pub ticket: String,
}

#[derive(Debug, Clone, Default)]
pub struct MileageListQuery {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct MileagePatch {
    pub date: Option<NaiveDate>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub reason: Option<String>,
    pub detail: Option<String>,
    pub amount: Option<Decimal>,
    pub ticket: Option<String>,
    pub store_id: FieldUpdate<i32>,
}

#[derive(Clone)]
pub struct MileageService {
    records: MileageDao,
    stores: StoreDao,
}

impl MileageService {
    pub fn new(records: MileageDao, stores: StoreDao) -> Self {
        Self { records, stores }
    }

    pub async fn create(
        &self,
        input: MileageInput,
        current: &CurrentUser,
    ) -> Result<mileage_record::Model, AppError> {
        let user_id = resolve_target_user(current, input.user_id)?;
        if let Some(store_id) = input.store_id {
            self.require_store(store_id).await?;
        }

        Ok(self
            .records
            .create(NewMileageRecord {
                date: input.date,
                origin: input.origin,
                destination: input.destination,
                reason: input.reason,
                detail: input.detail,
                amount: input.amount,
                user_id,
                store_id: input.store_id,
                ticket: input.ticket,
            })
            .await?)
    }

    pub async fn list(
        &self,
        query: MileageListQuery,
        current: &CurrentUser,
    ) -> Result<Paged<mileage_record::Model>, AppError> {
        let filter = MileageFilter {
            user_id: resolve_filter_user(current, query.user_id),
            range: resolve_date_range(query.from, query.to, query.month, query.year)?,
            keyword: normalize_keyword(query.keyword),
            page: query.page,
            limit: query.limit,
        };
        let (rows, total) = self.records.search(&filter).await?;
        Ok(Paged::new(rows, total, query.page, query.limit))
    }

    pub async fn get(
        &self,
        id: i32,
        current: &CurrentUser,
    ) -> Result<mileage_record::Model, AppError> {
        self.records
            .find_by_id(id, resolve_owner(current))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Mileage record {id} not found")))
    }

    pub async fn update(
        &self,
        id: i32,
        patch: MileagePatch,
        current: &CurrentUser,
    ) -> Result<mileage_record::Model, AppError> {
        if let Some(store_id) = patch.store_id.as_set() {
            self.require_store(*store_id).await?;
        }

        self.records
            .update(id, resolve_owner(current), move |active| {
                if let Some(date) = patch.date {
                    active.date = Set(date);
                }
                if let Some(origin) = patch.origin {
                    active.origin = Set(origin);
                }
                if let Some(destination) = patch.destination {
                    active.destination = Set(destination);
                }
                if let Some(reason) = patch.reason {
                    active.reason = Set(reason);
                }
                if let Some(detail) = patch.detail {
                    active.detail = Set(detail);
                }
                if let Some(amount) = patch.amount {
                    active.amount = Set(amount);
                }
                if let Some(ticket) = patch.ticket {
                    active.ticket = Set(ticket);
                }
                match patch.store_id {
                    FieldUpdate::Unchanged => {}
                    FieldUpdate::Clear => active.store_id = Set(None),
                    FieldUpdate::Set(store_id) => active.store_id = Set(Some(store_id)),
                }
            })
            .await?
            .ok_or_else(|| AppError::not_found(format!("Mileage record {id} not found")))
    }

    pub async fn remove(&self, id: i32, current: &CurrentUser) -> Result<(), AppError> {
        let deleted = self.records.delete(id, resolve_owner(current)).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Mileage record {id} not found")));
        }
        Ok(())
    }

    async fn require_store(&self, store_id: i32) -> Result<(), AppError> {
        self.stores
            .find_by_id(store_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Store {store_id} not found")))?;
        Ok(())
    }
}
