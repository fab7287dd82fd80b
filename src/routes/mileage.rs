use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::mileage_record,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        mileage_service::{MileageInput, MileageListQuery, MileagePatch},
        patch::FieldUpdate,
        scope::CurrentUser,
    },
    state::AppState,
};

use super::{ListResponse, paged_response, validate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMileageRequest {
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMileageRequest {
    pub date: Option<NaiveDate>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub reason: Option<String>,
    pub detail: Option<String>,
    pub amount: Option<Decimal>,
    pub ticket: Option<String>,
    #[serde(default)]
    pub store_id: FieldUpdate<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageListParams {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub reason: String,
    pub detail: String,
    pub amount: Decimal,
    pub user_id: i32,
    pub store_id: Option<i32>,
    pub ticket: String,
    pub created_at: DateTimeWithTimeZone,
}

impl From<mileage_record::Model> for MileageResponse {
    fn from(model: mileage_record::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            origin: model.origin,
            destination: model.destination,
            reason: model.reason,
            detail: model.detail,
            amount: model.amount,
            user_id: model.user_id,
            store_id: model.store_id,
            ticket: model.ticket,
            created_at: model.created_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mileage-records", get(list).post(create))
        .route(
            "/mileage-records/{id}",
            get(get_one).patch(update).delete(remove),
        )
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateMileageRequest>,
) -> ApiResult<MileageResponse> {
    let mut errors = Vec::new();
    validate::check_required(&body.origin, "origin", &mut errors);
    validate::check_required(&body.destination, "destination", &mut errors);
    validate::check_required(&body.reason, "reason", &mut errors);
    validate::check_required(&body.ticket, "ticket", &mut errors);
    validate::check_positive_amount(body.amount, &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).mileage();
    let record = service
        .create(
            MileageInput {
                date: body.date,
                origin: body.origin,
                destination: body.destination,
                reason: body.reason,
                detail: body.detail,
                amount: body.amount,
                user_id: body.user_id,
                store_id: body.store_id,
                ticket: body.ticket,
            },
            &current,
        )
        .await?;
    JsonApiResponse::created(record.into())
}

async fn list(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<MileageListParams>,
) -> ApiResult<ListResponse<MileageResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).mileage();
    let page = service
        .list(
            MileageListQuery {
                user_id: params.user_id,
                from: params.from,
                to: params.to,
                month: params.month,
                year: params.year,
                keyword: params.q,
                page: params.page,
                limit: params.limit,
            },
            &current,
        )
        .await?;
    JsonApiResponse::ok(paged_response(page))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<MileageResponse> {
    let service = ServiceContext::from_state(state.as_ref()).mileage();
    let record = service.get(id, &current).await?;
    JsonApiResponse::ok(record.into())
}

async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateMileageRequest>,
) -> ApiResult<MileageResponse> {
    let mut errors = Vec::new();
    if let Some(amount) = body.amount {
        validate::check_positive_amount(amount, &mut errors);
    }
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).mileage();
    let record = service
        .update(
            id,
            MileagePatch {
                date: body.date,
                origin: body.origin,
                destination: body.destination,
                reason: body.reason,
                detail: body.detail,
                amount: body.amount,
                ticket: body.ticket,
                store_id: body.store_id,
            },
            &current,
        )
        .await?;
    JsonApiResponse::ok(record.into())
}

async fn remove(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    let service = ServiceContext::from_state(state.as_ref()).mileage();
    service.remove(id, &current).await?;
    JsonApiResponse::ok(serde_json::Value::Null)
}
