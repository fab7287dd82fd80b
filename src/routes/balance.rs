use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::{
    db::dao::DateField,
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        balance_service::{AnnualBalance, BalanceTotals, MonthlyBalance},
        scope::CurrentUser,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceParams {
    pub user_id: Option<i32>,
    pub date_field: Option<DateField>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/balance", get(overall))
        .route("/balance/monthly", get(monthly))
        .route("/balance/annual", get(annual))
        .with_state(state)
}

async fn overall(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<BalanceParams>,
) -> ApiResult<BalanceTotals> {
    let service = ServiceContext::from_state(state.as_ref()).balance();
    let totals = service
        .overall(
            params.user_id,
            params.date_field.unwrap_or_default(),
            &current,
        )
        .await?;
    JsonApiResponse::ok(totals)
}

async fn monthly(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<BalanceParams>,
) -> ApiResult<MonthlyBalance> {
    let year = require(params.year, "year")?;
    let month = require(params.month, "month")?;

    let service = ServiceContext::from_state(state.as_ref()).balance();
    let totals = service
        .monthly(
            year,
            month,
            params.user_id,
            params.date_field.unwrap_or_default(),
            &current,
        )
        .await?;
    JsonApiResponse::ok(totals)
}

async fn annual(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<BalanceParams>,
) -> ApiResult<AnnualBalance> {
    let year = require(params.year, "year")?;

    let service = ServiceContext::from_state(state.as_ref()).balance();
    let totals = service
        .annual(
            year,
            params.user_id,
            params.date_field.unwrap_or_default(),
            &current,
        )
        .await?;
    JsonApiResponse::ok(totals)
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::bad_request(format!("The {field} parameter is required")))
}
