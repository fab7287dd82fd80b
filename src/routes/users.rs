use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use serde::Deserialize;

use crate::{
    auth::{AdminRole, Role},
    db::dao::user_dao::ProfilePatch,
    error::AppError,
    middleware::{AuthGuard, AuthRoleGuard},
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, scope::CurrentUser, user_service::UserView},
    state::AppState,
};

use super::validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", get(list))
        .route("/users/{id}", patch(update))
        .route("/users/{id}/approve", patch(approve))
        .with_state(state)
}

async fn list(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<Vec<UserView>> {
    if !claims.has_any(&[Role::Admin, Role::Analyst]) {
        return Err(AppError::forbidden("Missing required role"));
    }

    let service = ServiceContext::from_state(state.as_ref()).users();
    JsonApiResponse::ok(service.list().await?)
}

async fn approve(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<i32>,
) -> ApiResult<UserView> {
    let service = ServiceContext::from_state(state.as_ref()).users();
    JsonApiResponse::ok(service.approve_analyst(id).await?)
}

async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<UserView> {
    let mut errors = Vec::new();
    if let Some(name) = body.name.as_deref() {
        validate::check_name(name, &mut errors);
    }
    if let Some(email) = body.email.as_deref() {
        validate::check_email(email, &mut errors);
    }
    validate::check_phone(body.phone.as_deref(), &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).users();
    let view = service
        .update_profile(
            id,
            ProfilePatch {
                name: body.name,
                email: body.email,
                phone: body.phone,
            },
            &current,
        )
        .await?;
    JsonApiResponse::ok(view)
}
