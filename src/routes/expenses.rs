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
    db::entities::expense,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        expense_service::{ExpenseInput, ExpenseListQuery, ExpensePatch},
        patch::FieldUpdate,
        scope::CurrentUser,
    },
    state::AppState,
};

use super::{ListResponse, paged_response, validate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub date: NaiveDate,
    pub item: String,
    pub reason: String,
    pub amount: Decimal,
    pub user_id: Option<i32>,
    pub approved_by_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub date: Option<NaiveDate>,
    pub item: Option<String>,
    pub reason: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub approved_by_id: FieldUpdate<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListParams {
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
pub struct ExpenseResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub item: String,
    pub reason: String,
    pub amount: Decimal,
    pub user_id: i32,
    pub approved_by_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
}

impl From<expense::Model> for ExpenseResponse {
    fn from(model: expense::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            item: model.item,
            reason: model.reason,
            amount: model.amount,
            user_id: model.user_id,
            approved_by_id: model.approved_by,
            created_at: model.created_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/expenses", get(list).post(create))
        .route(
            "/expenses/{id}",
            get(get_one).patch(update).delete(remove),
        )
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateExpenseRequest>,
) -> ApiResult<ExpenseResponse> {
    let mut errors = Vec::new();
    validate::check_required(&body.item, "item", &mut errors);
    validate::check_required(&body.reason, "reason", &mut errors);
    validate::check_positive_amount(body.amount, &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).expenses();
    let expense = service
        .create(
            ExpenseInput {
                date: body.date,
                item: body.item,
                reason: body.reason,
                amount: body.amount,
                user_id: body.user_id,
                approved_by: body.approved_by_id,
            },
            &current,
        )
        .await?;
    JsonApiResponse::created(expense.into())
}

async fn list(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<ExpenseListParams>,
) -> ApiResult<ListResponse<ExpenseResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).expenses();
    let page = service
        .list(
            ExpenseListQuery {
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
) -> ApiResult<ExpenseResponse> {
    let service = ServiceContext::from_state(state.as_ref()).expenses();
    let expense = service.get(id, &current).await?;
    JsonApiResponse::ok(expense.into())
}

async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateExpenseRequest>,
) -> ApiResult<ExpenseResponse> {
    let mut errors = Vec::new();
    if let Some(amount) = body.amount {
        validate::check_positive_amount(amount, &mut errors);
    }
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).expenses();
    let expense = service
        .update(
            id,
            ExpensePatch {
                date: body.date,
                item: body.item,
                reason: body.reason,
                amount: body.amount,
                approved_by: body.approved_by_id,
            },
            &current,
        )
        .await?;
    JsonApiResponse::ok(expense.into())
}

async fn remove(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    let service = ServiceContext::from_state(state.as_ref()).expenses();
    service.remove(id, &current).await?;
    JsonApiResponse::ok(serde_json::Value::Null)
}
