use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;

use crate::{
    auth::password::SecretHasher,
    db::dao::{PasswordResetDao, UserDao},
    db::entities::{password_reset_token, user},
    error::AppError,
    notifier::Notifier,
    services::refresh_sessions::RefreshSessionManager,
};

/// Returned for every reset request, whether or not the address exists.
pub const GENERIC_REQUEST_MESSAGE: &str =
    "If the address is registered, a verification code has been sent";

pub const CONFIRM_MESSAGE: &str = "Password updated";

#[derive(Clone)]
pub struct PasswordResetService {
    users: UserDao,
    tokens: PasswordResetDao,
    sessions: RefreshSessionManager,
    hasher: SecretHasher,
    notifier: Arc<dyn Notifier>,
    code_ttl_mins: i64,
}

impl PasswordResetService {
    pub fn new(
        users: UserDao,
        tokens: PasswordResetDao,
        sessions: RefreshSessionManager,
        hasher: SecretHasher,
        notifier: Arc<dyn Notifier>,
        code_ttl_mins: i64,
    ) -> Self {
        Self {
            users,
            tokens,
            sessions,
            hasher,
            notifier,
            code_ttl_mins,
        }
    }

    /// Issues a one-time code for the address. The response never reveals
    /// whether the address exists; only delivery failures surface, as
    /// service-unavailable.
    pub async fn request(&self, email: &str) -> Result<&'static str, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(GENERIC_REQUEST_MESSAGE);
        };

        let now = now_fixed();
        // Invalidate-then-insert keeps at most one token outstanding.
        self.tokens.invalidate_outstanding(user.id, now).await?;

        let code = generate_code();
        let code_hash = self.hasher.hash(&code)?;
        self.tokens
            .create(user.id, &code_hash, now, self.code_ttl_mins)
            .await?;

        self.notifier.send_reset_code(&user.email, &code).await?;
        Ok(GENERIC_REQUEST_MESSAGE)
    }

    /// Read-only code check; the token stays outstanding.
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), AppError> {
        self.outstanding_token(email, code).await?;
        Ok(())
    }

    /// Consumes the code, rotates the password and forces re-login
    /// everywhere by revoking every outstanding refresh session.
    pub async fn confirm(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<&'static str, AppError> {
        let (user, token) = self.outstanding_token(email, code).await?;

        let password_hash = self.hasher.hash(new_password)?;
        self.users.set_password_hash(user.id, &password_hash).await?;
        self.tokens.mark_used(token.id, now_fixed()).await?;
        self.sessions.revoke_all_for_user(user.id).await?;

        Ok(CONFIRM_MESSAGE)
    }

    async fn outstanding_token(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(user::Model, password_reset_token::Model), AppError> {
        let invalid = || AppError::unauthorized("Invalid or expired code");

        let user = self.users.find_by_email(email).await?.ok_or_else(invalid)?;
        let token = self
            .tokens
            .find_latest_outstanding(user.id, now_fixed())
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify(code, &token.code_hash)? {
            return Err(invalid());
        }
        Ok((user, token))
    }
}

fn now_fixed() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

/// Uniform 6-digit code from the OS CSPRNG.
fn generate_code() -> String {
    rand::rngs::OsRng.gen_range(100_000..=999_999).to_string()
}
