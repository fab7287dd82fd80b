use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: Option<AuthConfig>,
    pub mailer: Option<MailerConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: usize,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    #[serde(default = "default_refresh_idle_timeout_mins")]
    pub refresh_idle_timeout_mins: i64,
    #[serde(default = "default_reset_code_ttl_mins")]
    pub reset_code_ttl_mins: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailerConfig {
    pub webhook_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub from_address: String,
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}

fn default_hash_cost() -> u32 {
    defaults::DEFAULT_HASH_COST as u32
}

fn default_access_token_ttl_secs() -> usize {
    defaults::DEFAULT_ACCESS_TOKEN_TTL_SECS as usize
}

fn default_refresh_ttl_days() -> i64 {
    defaults::DEFAULT_REFRESH_TTL_DAYS
}

fn default_refresh_idle_timeout_mins() -> i64 {
    defaults::DEFAULT_REFRESH_IDLE_TIMEOUT_MINS
}

fn default_reset_code_ttl_mins() -> i64 {
    defaults::DEFAULT_RESET_CODE_TTL_MINS
}
