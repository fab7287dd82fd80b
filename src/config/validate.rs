use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.jwt_secret.trim().is_empty() {
            errors.push("auth.jwt_secret must not be empty".to_string());
        }

        if auth.admin_email.trim().is_empty() {
            errors.push("auth.admin_email must not be empty".to_string());
        }

        if auth.admin_password.len() < 8 {
            errors.push("auth.admin_password must be at least 8 characters".to_string());
        }

        // Argon2 requires at least 8 KiB of memory (cost 3).
        if !(3..=20).contains(&auth.hash_cost) {
            errors.push(format!(
                "auth.hash_cost ({}) must be between 3 and 20",
                auth.hash_cost
            ));
        }

        if auth.access_token_ttl_secs == 0 {
            errors.push("auth.access_token_ttl_secs must be > 0".to_string());
        }

        if auth.refresh_ttl_days <= 0 {
            errors.push("auth.refresh_ttl_days must be > 0".to_string());
        }

        if auth.refresh_idle_timeout_mins <= 0 {
            errors.push("auth.refresh_idle_timeout_mins must be > 0".to_string());
        }

        if auth.reset_code_ttl_mins <= 0 {
            errors.push("auth.reset_code_ttl_mins must be > 0".to_string());
        }
    }

    if let Some(mailer) = cfg.mailer.as_ref() {
        if mailer.webhook_url.trim().is_empty() {
            errors.push("mailer.webhook_url must not be empty".to_string());
        }

        if mailer.from_address.trim().is_empty() {
            errors.push("mailer.from_address must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
