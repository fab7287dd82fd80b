use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;

use crate::{
    auth::{jwt::JwtKeys, password::SecretHasher},
    config::{AppConfig, AuthConfig},
    notifier::Notifier,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: AuthConfig,
    pub db: DatabaseConnection,
    pub jwt: JwtKeys,
    pub hasher: SecretHasher,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Arc<Self>> {
        let auth = config
            .auth
            .clone()
            .context("auth config section is required")?;
        let jwt = JwtKeys::from_secret(auth.jwt_secret.as_bytes());
        let hasher = SecretHasher::new(auth.hash_cost);
        Ok(Arc::new(Self {
            config,
            auth,
            db,
            jwt,
            hasher,
            notifier,
        }))
    }
}
