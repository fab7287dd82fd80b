use std::sync::Arc;

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::Duration;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::json;
use tower::ServiceExt; // for `oneshot`

use ledger_server::{
    auth::password::SecretHasher,
    notifier::Notifier,
    routes::router,
    test_helpers::{
        RecordingNotifier, reset_token_model, session_model, test_state_with_db, ts, user_model,
        user_model_with_password,
    },
};

const SECRET: &[u8] = b"test-secret";

fn app_with(db: DatabaseConnection, notifier: Arc<dyn Notifier>) -> Router {
    router(test_state_with_db(SECRET, db, notifier))
}

fn app(db: DatabaseConnection) -> Router {
    app_with(db, Arc::new(RecordingNotifier::default()))
}

fn empty_app() -> Router {
    app(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

fn exec_ok(rows: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: rows,
    }
}

async fn post_json(
    app: Router,
    uri: &str,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = res.status();
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn signup_payload() -> serde_json::Value {
    json!({
        "handle": "ana",
        "email": "ana@x.com",
        "name": "Ana Torres",
        "password": "Str0ng!pw"
    })
}

#[tokio::test]
async fn signup_returns_tokens_and_sanitized_user() {
    let now = ts();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // duplicate check, user insert, refresh session insert
        .append_query_results([Vec::<ledger_server::db::entities::user::Model>::new()])
        .append_query_results([[user_model(8, "ana", "ana@x.com")]])
        .append_query_results([[session_model(
            21,
            8,
            "digest",
            now + Duration::days(7),
            now,
        )]])
        .into_connection();

    let (status, body) = post_json(app(db), "/auth/signup", signup_payload()).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert!(!data["accessToken"].as_str().unwrap().is_empty());
    let refresh = data["refreshToken"].as_str().unwrap();
    let (id, secret) = refresh.split_once('.').expect("composite refresh token");
    assert!(id.parse::<i32>().is_ok());
    assert!(!secret.is_empty());
    assert_eq!(data["user"]["handle"], "ana");
    assert!(data["user"].get("passwordHash").is_none());
    assert!(data["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn signup_duplicate_handle_is_conflict() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(3, "ana", "other@x.com")]])
        .into_connection();

    let (status, body) = post_json(app(db), "/auth/signup", signup_payload()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Handle already exists");
}

#[tokio::test]
async fn signup_weak_password_is_rejected_before_the_service() {
    let mut payload = signup_payload();
    payload["password"] = json!("weak");

    // No queued results: a database roundtrip would fail the request with
    // a 500 instead of the expected validation error.
    let (status, body) = post_json(empty_app(), "/auth/signup", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn signup_reserved_handle_is_conflict() {
    let mut payload = signup_payload();
    payload["handle"] = json!("admin");

    let (status, body) = post_json(empty_app(), "/auth/signup", payload).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Handle is reserved");
}

#[tokio::test]
async fn signin_wrong_password_is_unauthorized() {
    let digest = SecretHasher::new(6)
        .hash("Str0ng!pw")
        .expect("hash succeeds");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model_with_password(8, "ana", "ana@x.com", &digest)]])
        .into_connection();

    let (status, body) = post_json(
        app(db),
        "/auth/signin",
        json!({"handle": "ana", "password": "Wr0ng!pass"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn signin_returns_token_pair() {
    let now = ts();
    let digest = SecretHasher::new(6)
        .hash("Str0ng!pw")
        .expect("hash succeeds");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model_with_password(8, "ana", "ana@x.com", &digest)]])
        .append_query_results([[session_model(
            30,
            8,
            "digest",
            now + Duration::days(7),
            now,
        )]])
        .into_connection();

    let (status, body) = post_json(
        app(db),
        "/auth/signin",
        json!({"handle": "ana", "password": "Str0ng!pw"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["refreshToken"].as_str().unwrap().starts_with("30."));
}

#[tokio::test]
async fn refresh_with_malformed_token_touches_no_rows() {
    // Nothing queued: any query or exec against the mock would surface as
    // a 500, so the plain 401 also proves the database was left alone.
    let (status, body) = post_json(
        empty_app(),
        "/auth/refresh",
        json!({"refreshToken": "no-delimiter"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn refresh_rotates_the_session() {
    let now = ts();
    let hasher = SecretHasher::new(6);
    let secret_hash = hasher.hash("old-secret").expect("hash succeeds");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[session_model(
            4,
            8,
            &secret_hash,
            now + Duration::days(1),
            now,
        )]])
        .append_query_results([[session_model(
            5,
            8,
            "next-digest",
            now + Duration::days(7),
            now,
        )]])
        .append_query_results([[user_model(8, "ana", "ana@x.com")]])
        .append_exec_results([exec_ok(1)])
        .into_connection();

    let (status, body) = post_json(
        app(db),
        "/auth/refresh",
        json!({"refreshToken": "4.old-secret"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let refreshed = body["data"]["refreshToken"].as_str().unwrap();
    assert!(refreshed.starts_with("5."));
    assert_eq!(body["data"]["user"]["id"], 8);
}

#[tokio::test]
async fn reset_request_reads_the_same_for_unknown_and_known_emails() {
    let now = ts();

    let missing_db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<ledger_server::db::entities::user::Model>::new()])
        .into_connection();
    let (missing_status, missing_body) = post_json(
        app(missing_db),
        "/auth/password-reset/request",
        json!({"email": "ghost@x.com"}),
    )
    .await;

    let existing_db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(7, "ana", "ana@x.com")]])
        .append_exec_results([exec_ok(1)])
        .append_query_results([[reset_token_model(
            9,
            7,
            "digest",
            now + Duration::minutes(15),
        )]])
        .into_connection();
    let (existing_status, existing_body) = post_json(
        app(existing_db),
        "/auth/password-reset/request",
        json!({"email": "ana@x.com"}),
    )
    .await;

    assert_eq!(missing_status, StatusCode::CREATED);
    assert_eq!(existing_status, StatusCode::CREATED);
    assert_eq!(missing_body, existing_body);
}

#[tokio::test]
async fn reset_request_surfaces_notifier_outage_as_unavailable() {
    let now = ts();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(7, "ana", "ana@x.com")]])
        .append_exec_results([exec_ok(0)])
        .append_query_results([[reset_token_model(
            9,
            7,
            "digest",
            now + Duration::minutes(15),
        )]])
        .into_connection();

    let (status, _) = post_json(
        app_with(db, Arc::new(RecordingNotifier::failing())),
        "/auth/password-reset/request",
        json!({"email": "ana@x.com"}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn reset_verify_confirms_a_valid_code_without_consuming_it() {
    let now = ts();
    let hasher = SecretHasher::new(6);
    let code_hash = hasher.hash("482917").expect("hash succeeds");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(7, "ana", "ana@x.com")]])
        .append_query_results([[reset_token_model(
            9,
            7,
            &code_hash,
            now + Duration::minutes(10),
        )]])
        .into_connection();

    let (status, body) = post_json(
        app(db),
        "/auth/password-reset/verify",
        json!({"email": "ana@x.com", "code": "482917"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["valid"], true);
}

#[tokio::test]
async fn reset_verify_rejects_a_wrong_code() {
    let now = ts();
    let hasher = SecretHasher::new(6);
    let code_hash = hasher.hash("482917").expect("hash succeeds");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(7, "ana", "ana@x.com")]])
        .append_query_results([[reset_token_model(
            9,
            7,
            &code_hash,
            now + Duration::minutes(10),
        )]])
        .into_connection();

    let (status, _) = post_json(
        app(db),
        "/auth/password-reset/verify",
        json!({"email": "ana@x.com", "code": "111111"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reset_confirm_updates_password_and_revokes_sessions() {
    let now = ts();
    let hasher = SecretHasher::new(6);
    let code_hash = hasher.hash("482917").expect("hash succeeds");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(7, "ana", "ana@x.com")]])
        .append_query_results([[reset_token_model(
            9,
            7,
            &code_hash,
            now + Duration::minutes(10),
        )]])
        .append_query_results([[user_model(7, "ana", "ana@x.com")]])
        .append_query_results([[user_model(7, "ana", "ana@x.com")]])
        .append_exec_results([exec_ok(1), exec_ok(3)])
        .into_connection();

    let (status, body) = post_json(
        app(db),
        "/auth/password-reset/confirm",
        json!({"email": "ana@x.com", "code": "482917", "password": "N3w!passw0rd"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["message"], "Password updated");
}

#[tokio::test]
#[ignore = "requires Postgres database"]
async fn refresh_single_use_against_live_database() {
    use ledger_server::{
        config::AppConfig, db::connection, state::AppState, test_helpers::test_auth_config,
    };

    let mut cfg = AppConfig::from_env().expect("load app config");
    let db_cfg = cfg
        .database
        .as_ref()
        .expect("database config should be present in integration tests");
    let db = connection::connect(db_cfg).await.expect("connect to database");
    cfg.auth = Some(test_auth_config("test-secret"));
    let state = AppState::new(cfg, db, Arc::new(RecordingNotifier::default()))
        .expect("state should build");
    let app = router(state);

    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    let handle = format!("ana{suffix}");
    let payload = json!({
        "handle": handle,
        "email": format!("{handle}@example.com"),
        "name": "Ana Torres",
        "password": "Str0ng!pw"
    });

    let (status, body) = post_json(app.clone(), "/auth/signup", payload).await;
    assert_eq!(status, StatusCode::CREATED);
    let first = body["data"]["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        app.clone(),
        "/auth/refresh",
        json!({"refreshToken": first}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let second = body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    // The rotated-out token is single use: replaying it must fail.
    let (status, _) = post_json(app, "/auth/refresh", json!({"refreshToken": first})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
