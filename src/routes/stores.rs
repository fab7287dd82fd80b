use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::{
    auth::AdminRole,
    db::dao::store_dao::NewStore,
    db::entities::store,
    middleware::{AuthGuard, AuthRoleGuard},
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, patch::FieldUpdate, store_service::StorePatch},
    state::AppState,
};

use super::validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub code: String,
    pub name: String,
    pub district: String,
    pub province: String,
    pub department: String,
    pub service_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub service_status: FieldUpdate<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub district: String,
    pub province: String,
    pub department: String,
    pub service_status: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

impl From<store::Model> for StoreResponse {
    fn from(model: store::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            district: model.district,
            province: model.province,
            department: model.department,
            service_status: model.service_status,
            created_at: model.created_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stores", get(list).post(create))
        .route("/stores/{id}", get(get_one).patch(update).delete(remove))
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Json(body): Json<CreateStoreRequest>,
) -> ApiResult<StoreResponse> {
    let mut errors = Vec::new();
    validate::check_required(&body.code, "code", &mut errors);
    validate::check_required(&body.name, "name", &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).stores();
    let created = service
        .create(NewStore {
            code: body.code,
            name: body.name,
            district: body.district,
            province: body.province,
            department: body.department,
            service_status: body.service_status,
        })
        .await?;
    JsonApiResponse::created(created.into())
}

async fn list(
    State(state): State<Arc<AppState>>,
    _auth: AuthGuard,
) -> ApiResult<Vec<StoreResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).stores();
    let stores = service.list().await?;
    JsonApiResponse::ok(stores.into_iter().map(StoreResponse::from).collect())
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    _auth: AuthGuard,
    Path(id): Path<i32>,
) -> ApiResult<StoreResponse> {
    let service = ServiceContext::from_state(state.as_ref()).stores();
    let store = service.get(id).await?;
    JsonApiResponse::ok(store.into())
}

async fn update(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStoreRequest>,
) -> ApiResult<StoreResponse> {
    let service = ServiceContext::from_state(state.as_ref()).stores();
    let store = service
        .update(
            id,
            StorePatch {
                code: body.code,
                name: body.name,
                district: body.district,
                province: body.province,
                department: body.department,
                service_status: body.service_status,
            },
        )
        .await?;
    JsonApiResponse::ok(store.into())
}

async fn remove(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    let service = ServiceContext::from_state(state.as_ref()).stores();
    service.remove(id).await?;
    JsonApiResponse::ok(serde_json::Value::Null)
}
