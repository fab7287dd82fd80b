use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    auth::TokenBundle,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, auth_service::SignUpInput, user_service::UserView},
    state::AppState,
};

use super::validate;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub handle: String,
    pub email: String,
    pub phone: Option<String>,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequestBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetVerifyBody {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetConfirmBody {
    pub email: String,
    pub code: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: usize,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ValidityResponse {
    pub valid: bool,
}

impl TokenResponse {
    fn new(bundle: TokenBundle, user: UserView) -> Self {
        Self {
            access_token: bundle.access_token,
            refresh_token: bundle.refresh_token,
            token_type: bundle.token_type,
            expires_in: bundle.expires_in,
            user,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/refresh", post(refresh))
        .route("/auth/password-reset/request", post(reset_request))
        .route("/auth/password-reset/verify", post(reset_verify))
        .route("/auth/password-reset/confirm", post(reset_confirm))
        .with_state(state)
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignUpRequest>,
) -> ApiResult<TokenResponse> {
    let mut errors = Vec::new();
    validate::check_handle(&body.handle, &mut errors);
    validate::check_email(&body.email, &mut errors);
    validate::check_phone(body.phone.as_deref(), &mut errors);
    validate::check_name(&body.name, &mut errors);
    validate::check_strong_password(&body.password, &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).auth();
    let (tokens, user) = service
        .sign_up(SignUpInput {
            handle: body.handle,
            email: body.email,
            phone: body.phone,
            name: body.name,
            password: body.password,
        })
        .await?;
    JsonApiResponse::created(TokenResponse::new(tokens, user.into()))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignInRequest>,
) -> ApiResult<TokenResponse> {
    let mut errors = Vec::new();
    validate::check_required(&body.handle, "handle", &mut errors);
    validate::check_required(&body.password, "password", &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).auth();
    let (tokens, user) = service.sign_in(&body.handle, &body.password).await?;
    JsonApiResponse::created(TokenResponse::new(tokens, user.into()))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let service = ServiceContext::from_state(state.as_ref()).auth();
    let (tokens, user) = service.refresh(&body.refresh_token).await?;
    JsonApiResponse::created(TokenResponse::new(tokens, user.into()))
}

async fn reset_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetRequestBody>,
) -> ApiResult<MessageResponse> {
    let mut errors = Vec::new();
    validate::check_email(&body.email, &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).password_reset();
    let message = service.request(&body.email).await?;
    JsonApiResponse::created(MessageResponse { message })
}

async fn reset_verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetVerifyBody>,
) -> ApiResult<ValidityResponse> {
    let mut errors = Vec::new();
    validate::check_email(&body.email, &mut errors);
    validate::check_reset_code(&body.code, &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).password_reset();
    service.verify(&body.email, &body.code).await?;
    JsonApiResponse::created(ValidityResponse { valid: true })
}

async fn reset_confirm(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetConfirmBody>,
) -> ApiResult<MessageResponse> {
    let mut errors = Vec::new();
    validate::check_email(&body.email, &mut errors);
    validate::check_reset_code(&body.code, &mut errors);
    validate::check_strong_password(&body.password, &mut errors);
    validate::finish(errors)?;

    let service = ServiceContext::from_state(state.as_ref()).password_reset();
    let message = service
        .confirm(&body.email, &body.code, &body.password)
        .await?;
    JsonApiResponse::created(MessageResponse { message })
}
