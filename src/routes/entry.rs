use std::sync::Arc;

use axum::Router;

use crate::{
    middleware::{catch_panic_layer, json_error_middleware},
    state::AppState,
};

use super::{auth, balance, expenses, incomes, mileage, stores, users};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(expenses::router(state.clone()))
        .merge(incomes::router(state.clone()))
        .merge(mileage::router(state.clone()))
        .merge(stores::router(state.clone()))
        .merge(balance::router(state))
        .layer(axum::middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}
