//! Fixtures shared by the unit and router tests. Everything runs against a
//! sea-orm MockDatabase; callers queue the query/exec results they expect.

use std::{collections::BTreeMap, sync::Arc, sync::Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};

use crate::{
    auth::Role,
    config::{AppConfig, AuthConfig},
    db::entities::{
        expense, income, mileage_record, password_reset_token, refresh_session, staff_member,
        store, user,
    },
    notifier::{Notifier, NotifierError},
    routes::router,
    state::AppState,
};

pub fn ts() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset should be valid")
        .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("timestamp should be valid")
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).expect("date should be valid")
}

pub fn test_auth_config(secret: &str) -> AuthConfig {
    AuthConfig {
        jwt_secret: secret.to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "adminpassword".to_string(),
        // Small cost keeps the suite fast.
        hash_cost: 6,
        access_token_ttl_secs: 3600,
        refresh_ttl_days: 7,
        refresh_idle_timeout_mins: 60,
        reset_code_ttl_mins: 15,
    }
}

pub fn test_state_with_db(
    secret: &[u8],
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
) -> Arc<AppState> {
    let mut cfg = AppConfig::default();
    cfg.auth = Some(test_auth_config(&String::from_utf8_lossy(secret)));
    AppState::new(cfg, db, notifier).expect("state should build")
}

pub fn test_state(secret: &[u8]) -> Arc<AppState> {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    test_state_with_db(secret, db, Arc::new(RecordingNotifier::default()))
}

pub fn test_router(secret: &[u8]) -> Router {
    router(test_state(secret))
}

// ---- entity fixtures -------------------------------------------------------

pub fn user_model(id: i32, handle: &str, email: &str) -> user::Model {
    user::Model {
        id,
        name: "Ana Torres".to_string(),
        handle: Some(handle.to_string()),
        email: email.to_string(),
        phone: None,
        password_hash: Some("digest".to_string()),
        role: None,
        active: true,
        created_at: ts(),
    }
}

pub fn user_model_with_password(id: i32, handle: &str, email: &str, digest: &str) -> user::Model {
    let mut model = user_model(id, handle, email);
    model.password_hash = Some(digest.to_string());
    model
}

pub fn user_model_with_role(id: i32, handle: &str, email: &str, role: Role) -> user::Model {
    let mut model = user_model(id, handle, email);
    model.role = Some(role.as_str().to_string());
    model.active = false;
    model
}

pub fn session_model(
    id: i32,
    user_id: i32,
    secret_hash: &str,
    expires_at: DateTime<FixedOffset>,
    last_used_at: DateTime<FixedOffset>,
) -> refresh_session::Model {
    refresh_session::Model {
        id,
        user_id,
        secret_hash: secret_hash.to_string(),
        expires_at,
        last_used_at,
        revoked_at: None,
        created_at: ts(),
    }
}

pub fn reset_token_model(
    id: i32,
    user_id: i32,
    code_hash: &str,
    expires_at: DateTime<FixedOffset>,
) -> password_reset_token::Model {
    password_reset_token::Model {
        id,
        user_id,
        code_hash: code_hash.to_string(),
        expires_at,
        used_at: None,
        created_at: ts(),
    }
}

pub fn expense_model(id: i32, user_id: i32, amount: &str) -> expense::Model {
    expense::Model {
        id,
        date: day(),
        item: "Taxi".to_string(),
        reason: "Client visit".to_string(),
        amount: amount.parse().expect("amount should parse"),
        user_id,
        approved_by: None,
        created_at: ts(),
    }
}

pub fn income_model(id: i32, user_id: i32, amount: &str) -> income::Model {
    income::Model {
        id,
        date: day(),
        amount: amount.parse().expect("amount should parse"),
        user_id,
        deposited_by: None,
        created_at: ts(),
    }
}

pub fn mileage_model(id: i32, user_id: i32, amount: &str) -> mileage_record::Model {
    mileage_record::Model {
        id,
        date: day(),
        origin: "Office".to_string(),
        destination: "Branch 12".to_string(),
        reason: "Audit".to_string(),
        detail: "Quarterly stock audit".to_string(),
        amount: amount.parse().expect("amount should parse"),
        user_id,
        store_id: None,
        ticket: "T-0042".to_string(),
        created_at: ts(),
    }
}

pub fn store_model(id: i32, code: &str) -> store::Model {
    store::Model {
        id,
        code: code.to_string(),
        name: "Branch 12".to_string(),
        district: "Miraflores".to_string(),
        province: "Lima".to_string(),
        department: "Lima".to_string(),
        service_status: None,
        created_at: ts(),
    }
}

pub fn staff_model(id: i32, user_id: i32) -> staff_member::Model {
    staff_member::Model {
        id,
        name: "Carla Rojas".to_string(),
        active: true,
        user_id,
        created_at: ts(),
    }
}

// ---- raw mock rows ---------------------------------------------------------

/// Aggregate row for `SUM(amount) AS total`.
pub fn total_row(total: Option<&str>) -> BTreeMap<&'static str, Value> {
    let value = match total {
        Some(total) => {
            let decimal: Decimal = total.parse().expect("total should parse");
            Value::Decimal(Some(decimal))
        }
        None => Value::Decimal(None),
    };
    BTreeMap::from([("total", value)])
}

/// Count row for `SELECT COUNT(*) AS num_items`.
pub fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(count)))])
}

// ---- notifier doubles ------------------------------------------------------

/// Records delivered codes; optionally fails every send to exercise the
/// service-unavailable path.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_reset_code(&self, email: &str, code: &str) -> Result<(), NotifierError> {
        if self.fail {
            return Err(NotifierError::Delivery(502));
        }
        self.sent
            .lock()
            .expect("notifier lock")
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}
