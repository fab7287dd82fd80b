use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use rand::RngCore;

use crate::{
    auth::password::SecretHasher,
    db::dao::RefreshSessionDao,
    error::AppError,
};

/// 384 bits of entropy per refresh secret.
const SECRET_BYTES: usize = 48;

/// Stateful refresh-token lifecycle: one row per issued token, rotated on
/// every successful redemption, revoked on expiry, idle timeout or any
/// suspicious presentation of the secret.
#[derive(Clone)]
pub struct RefreshSessionManager {
    sessions: RefreshSessionDao,
    hasher: SecretHasher,
    ttl_days: i64,
    idle_timeout_mins: i64,
}

impl RefreshSessionManager {
    pub fn new(
        sessions: RefreshSessionDao,
        hasher: SecretHasher,
        ttl_days: i64,
        idle_timeout_mins: i64,
    ) -> Self {
        Self {
            sessions,
            hasher,
            ttl_days,
            idle_timeout_mins,
        }
    }

    /// Issues a fresh session and returns the composite opaque token
    /// `"<sessionId>.<secret>"`. Only the secret's hash is persisted.
    pub async fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let secret = generate_secret();
        let secret_hash = self.hasher.hash(&secret)?;
        let now = now_fixed();
        let session = self
            .sessions
            .create(user_id, &secret_hash, now, self.ttl_days)
            .await?;
        Ok(format!("{}.{secret}", session.id))
    }

    /// Redeems a composite token: on success the presented session is
    /// revoked (single use) and a brand-new one is issued for the same
    /// user. Every failure mode answers a plain Unauthorized; expiry, idle
    /// timeout and secret mismatch additionally revoke the session.
    pub async fn redeem(&self, composite: &str) -> Result<(i32, String), AppError> {
        let (id, secret) = parse_composite(composite)?;
        let now = now_fixed();

        let session = self
            .sessions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if session.revoked_at.is_some() {
            return Err(AppError::unauthorized("Invalid refresh token"));
        }

        if session.expires_at < now {
            self.sessions.revoke_if_active(id, now).await?;
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        if now > session.last_used_at + Duration::minutes(self.idle_timeout_mins) {
            self.sessions.revoke_if_active(id, now).await?;
            return Err(AppError::unauthorized("Idle session"));
        }

        if !self.hasher.verify(secret, &session.secret_hash)? {
            // A wrong secret for a known session id reads as replay or
            // theft, so the session is burned before failing.
            self.sessions.revoke_if_active(id, now).await?;
            tracing::warn!(session = id, "refresh secret mismatch, session revoked");
            return Err(AppError::unauthorized("Invalid refresh token"));
        }

        // The conditional update serializes concurrent redemptions: the
        // loser observes an already-revoked row.
        if !self.sessions.revoke_if_active(id, now).await? {
            return Err(AppError::unauthorized("Invalid refresh token"));
        }

        let refresh_token = self.issue(session.user_id).await?;
        Ok((session.user_id, refresh_token))
    }

    pub async fn revoke_all_for_user(&self, user_id: i32) -> Result<u64, AppError> {
        Ok(self
            .sessions
            .revoke_all_for_user(user_id, now_fixed())
            .await?)
    }
}

fn now_fixed() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn generate_secret() -> String {
    // OS CSPRNG, not the thread RNG: these secrets are credentials.
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn parse_composite(composite: &str) -> Result<(i32, &str), AppError> {
    let (id, secret) = composite
        .split_once('.')
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;
    let id: i32 = id
        .parse()
        .map_err(|_| AppError::unauthorized("Invalid refresh token"))?;
    if secret.is_empty() {
        return Err(AppError::unauthorized("Invalid refresh token"));
    }
    Ok((id, secret))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    use crate::{
        auth::password::SecretHasher,
        db::dao::RefreshSessionDao,
        db::entities::refresh_session,
        error::AppError,
        test_helpers::{session_model, ts},
    };

    use super::{RefreshSessionManager, generate_secret, parse_composite};

    fn manager(db: &DatabaseConnection) -> RefreshSessionManager {
        RefreshSessionManager::new(RefreshSessionDao::new(db), SecretHasher::new(6), 7, 60)
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn hashed(secret: &str) -> String {
        SecretHasher::new(6).hash(secret).expect("hash succeeds")
    }

    #[test]
    fn generated_secrets_are_long_and_unique() {
        let first = generate_secret();
        let second = generate_secret();

        assert_ne!(first, second);
        // 48 bytes of base64url without padding.
        assert_eq!(first.len(), 64);
        assert!(!first.contains('.'));
    }

    #[test]
    fn parse_rejects_malformed_composites() {
        for token in ["", "no-delimiter", ".secret", "abc.secret", "12."] {
            assert!(parse_composite(token).is_err(), "accepted {token:?}");
        }
        let (id, secret) = parse_composite("12.secret").expect("token should parse");
        assert_eq!((id, secret), (12, "secret"));
    }

    #[tokio::test]
    async fn issue_returns_id_dot_secret() {
        let now = ts();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model(5, 7, "digest", now + Duration::days(7), now)]])
            .into_connection();

        let token = manager(&db).issue(7).await.expect("issue should succeed");

        assert!(token.starts_with("5."));
        assert!(token.len() > "5.".len() + 40);
    }

    #[tokio::test]
    async fn redeem_rejects_unknown_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<refresh_session::Model>::new()])
            .into_connection();

        let err = manager(&db)
            .redeem("41.secret")
            .await
            .expect_err("redeem should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn redeem_rejects_revoked_session_without_touching_it() {
        let now = ts();
        let mut session = session_model(4, 7, &hashed("secret"), now + Duration::days(5), now);
        session.revoked_at = Some(now - Duration::minutes(10));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session]])
            .into_connection();

        let err = manager(&db)
            .redeem("4.secret")
            .await
            .expect_err("redeem should fail");
        assert_eq!(err.message(), "Invalid refresh token");
    }

    #[tokio::test]
    async fn redeem_revokes_expired_session() {
        let now = ts();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model(
                4,
                7,
                &hashed("secret"),
                now - Duration::minutes(1),
                now - Duration::minutes(5),
            )]])
            .append_exec_results([exec_ok()])
            .into_connection();

        let err = manager(&db)
            .redeem("4.secret")
            .await
            .expect_err("redeem should fail");
        assert_eq!(err.message(), "Refresh token expired");
    }

    #[tokio::test]
    async fn redeem_revokes_idle_session_before_expiry() {
        let now = ts();
        // Still a day from expiry but last used beyond the idle window.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model(
                4,
                7,
                &hashed("secret"),
                now + Duration::days(1),
                now - Duration::minutes(61),
            )]])
            .append_exec_results([exec_ok()])
            .into_connection();

        let err = manager(&db)
            .redeem("4.secret")
            .await
            .expect_err("redeem should fail");
        assert_eq!(err.message(), "Idle session");
    }

    #[tokio::test]
    async fn redeem_revokes_session_on_secret_mismatch() {
        let now = ts();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model(
                4,
                7,
                &hashed("the-real-secret"),
                now + Duration::days(1),
                now,
            )]])
            .append_exec_results([exec_ok()])
            .into_connection();

        let err = manager(&db)
            .redeem("4.stolen-guess")
            .await
            .expect_err("redeem should fail");
        assert_eq!(err.message(), "Invalid refresh token");
    }

    #[tokio::test]
    async fn redeem_rotates_into_a_new_session() {
        let now = ts();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model(
                4,
                7,
                &hashed("secret"),
                now + Duration::days(1),
                now,
            )]])
            .append_exec_results([exec_ok()])
            .append_query_results([[session_model(
                5,
                7,
                "next-digest",
                now + Duration::days(7),
                now,
            )]])
            .into_connection();

        let (user_id, refresh_token) = manager(&db)
            .redeem("4.secret")
            .await
            .expect("redeem should succeed");

        assert_eq!(user_id, 7);
        assert!(refresh_token.starts_with("5."));
        assert!(!refresh_token.starts_with("4."));
    }

    #[tokio::test]
    async fn redeem_loses_rotation_race_gracefully() {
        let now = ts();
        // Row was active when read, but another redemption won the
        // conditional update in between.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model(
                4,
                7,
                &hashed("secret"),
                now + Duration::days(1),
                now,
            )]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = manager(&db)
            .redeem("4.secret")
            .await
            .expect_err("redeem should fail");
        assert_eq!(err.message(), "Invalid refresh token");
    }
}
