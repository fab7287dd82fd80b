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
    db::entities::income,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        income_service::{IncomeInput, IncomeListQuery, IncomePatch},
        patch::FieldUpdate,
        scope::CurrentUser,
    },
    state::AppState,
};

use super::{ListResponse, paged_response, validate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncomeRequest {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub user_id: Option<i32>,
    pub deposited_by_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncomeRequest {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub deposited_by_id: FieldUpdate<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeListParams {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub user_id: i32,
    pub deposited_by_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
}

impl From<income::Model> for IncomeResponse {
    fn from(model: income::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            amount: model.amount,
            user_id: model.user_id,
            deposited_by_id: model.deposited_by,
            created_at: model.created_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/incomes", get(list).post(create))
        .route("/incomes/{id}", get(get_one).patch(update).delete(remove))
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateIncomeRequest>,
) -> ApiResult<IncomeResponse> {
    let mut errors = Vec::new();
    validate::check_positive_amount(body.amount, &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).incomes();
    let income = service
        .create(
            IncomeInput {
                date: body.date,
                amount: body.amount,
                user_id: body.user_id,
                deposited_by: body.deposited_by_id,
            },
            &current,
        )
        .await?;
    JsonApiResponse::created(income.into())
}

async fn list(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<IncomeListParams>,
) -> ApiResult<ListResponse<IncomeResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).incomes();
    let page = service
        .list(
            IncomeListQuery {
                user_id: params.user_id,
                from: params.from,
                to: params.to,
                month: params.month,
                year: params.year,
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
) -> ApiResult<IncomeResponse> {
    let service = ServiceContext::from_state(state.as_ref()).incomes();
    let income = service.get(id, &current).await?;
    JsonApiResponse::ok(income.into())
}

async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateIncomeRequest>,
) -> ApiResult<IncomeResponse> {
    let mut errors = Vec::new();
    if let Some(amount) = body.amount {
        validate::check_positive_amount(amount, &mut errors);
    }
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).incomes();
    let income = service
        .update(
            id,
            IncomePatch {
                date: body.date,
                amount: body.amount,
                deposited_by: body.deposited_by_id,
            },
            &current,
        )
        .await?;
    JsonApiResponse::ok(income.into())
}

async fn remove(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    let service = ServiceContext::from_state(state.as_ref()).incomes();
    service.remove(id, &current).await?;
    JsonApiResponse::ok(serde_json::Value::Null)
}
