use crate::{
    auth::{
        Role, TokenBundle,
        jwt::{JwtKeys, encode_token, make_access_claims},
        password::SecretHasher,
    },
    config::AuthConfig,
    db::dao::{UserDao, user_dao::NewUser},
    db::entities::user,
    error::AppError,
    services::refresh_sessions::RefreshSessionManager,
};

/// Handle reserved for the seeded administrator account.
pub const RESERVED_ADMIN_HANDLE: &str = "admin";

#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub handle: String,
    pub email: String,
    pub phone: Option<String>,
    pub name: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserDao,
    sessions: RefreshSessionManager,
    hasher: SecretHasher,
    jwt: JwtKeys,
    access_ttl_secs: usize,
}

impl AuthService {
    pub fn new(
        users: UserDao,
        sessions: RefreshSessionManager,
        hasher: SecretHasher,
        jwt: JwtKeys,
        access_ttl_secs: usize,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            jwt,
            access_ttl_secs,
        }
    }

    pub async fn sign_up(
        &self,
        input: SignUpInput,
    ) -> Result<(TokenBundle, user::Model), AppError> {
        if input.handle.eq_ignore_ascii_case(RESERVED_ADMIN_HANDLE) {
            return Err(AppError::conflict("Handle is reserved"));
        }

        if let Some(existing) = self
            .users
            .find_by_handle_or_email(&input.handle, &input.email)
            .await?
        {
            if existing.handle.as_deref() == Some(input.handle.as_str()) {
                return Err(AppError::conflict("Handle already exists"));
            }
            return Err(AppError::conflict("Email already exists"));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                name: input.name,
                handle: Some(input.handle),
                email: input.email,
                phone: input.phone,
                password_hash: Some(password_hash),
                role: None,
            })
            .await?;

        let tokens = self.issue_tokens(&user).await?;
        Ok((tokens, user))
    }

    pub async fn sign_in(
        &self,
        handle: &str,
        password: &str,
    ) -> Result<(TokenBundle, user::Model), AppError> {
        let invalid = || AppError::unauthorized("Invalid credentials");

        let user = self.users.find_by_handle(handle).await?.ok_or_else(invalid)?;
        // Accounts without a stored hash (e.g. invited externally) can
        // never sign in with a password.
        let Some(password_hash) = user.password_hash.as_deref() else {
            return Err(invalid());
        };
        if !self.hasher.verify(password, password_hash)? {
            return Err(invalid());
        }

        let tokens = self.issue_tokens(&user).await?;
        Ok((tokens, user))
    }

    pub async fn refresh(&self, composite: &str) -> Result<(TokenBundle, user::Model), AppError> {
        let (user_id, refresh_token) = self.sessions.redeem(composite).await?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        let access_token = self.access_token_for(&user)?;
        Ok((
            TokenBundle {
                access_token,
                refresh_token,
                token_type: "Bearer",
                expires_in: self.access_ttl_secs,
            },
            user,
        ))
    }

    pub async fn seed_admin(&self, cfg: &AuthConfig) -> anyhow::Result<()> {
        if let Some(existing) = self
            .users
            .find_by_handle(RESERVED_ADMIN_HANDLE)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?
        {
            tracing::info!("admin user already present: {}", existing.email);
            return Ok(());
        }

        let password_hash = self
            .hasher
            .hash(&cfg.admin_password)
            .map_err(|err| anyhow::anyhow!("admin seed hash error: {err}"))?;
        let user = self
            .users
            .create(NewUser {
                name: "Administrator".to_string(),
                handle: Some(RESERVED_ADMIN_HANDLE.to_string()),
                email: cfg.admin_email.clone(),
                phone: None,
                password_hash: Some(password_hash),
                role: Some(Role::Admin.as_str().to_string()),
            })
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?;
        tracing::info!("seeded admin user {}", user.email);
        Ok(())
    }

    async fn issue_tokens(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let access_token = self.access_token_for(user)?;
        let refresh_token = self.sessions.issue(user.id).await?;
        Ok(TokenBundle {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
        })
    }

    fn access_token_for(&self, user: &user::Model) -> Result<String, AppError> {
        let role = user.role.as_deref().and_then(|role| Role::try_from(role).ok());
        let claims =
            make_access_claims(user.id, user.handle.clone(), role, self.access_ttl_secs);
        encode_token(&self.jwt, &claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{Algorithm, Validation, decode};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    use crate::{
        auth::{Claims, jwt::JwtKeys, password::SecretHasher},
        config::AuthConfig,
        db::dao::{RefreshSessionDao, UserDao},
        db::entities::user,
        error::AppError,
        services::refresh_sessions::RefreshSessionManager,
        test_helpers::{session_model, ts, user_model, user_model_with_password},
    };

    use super::{AuthService, SignUpInput};

    const SECRET: &[u8] = b"auth-service-secret";

    fn service(db: &DatabaseConnection) -> AuthService {
        let hasher = SecretHasher::new(6);
        AuthService::new(
            UserDao::new(db),
            RefreshSessionManager::new(RefreshSessionDao::new(db), hasher.clone(), 7, 60),
            hasher,
            JwtKeys::from_secret(SECRET),
            3600,
        )
    }

    fn signup_input(handle: &str, email: &str) -> SignUpInput {
        SignUpInput {
            handle: handle.to_string(),
            email: email.to_string(),
            phone: None,
            name: "Ana Torres".to_string(),
            password: "Str0ng!pw".to_string(),
        }
    }

    fn decode_claims(token: &str) -> Claims {
        let keys = JwtKeys::from_secret(SECRET);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        decode::<Claims>(token, &keys.dec, &validation)
            .expect("token should decode")
            .claims
    }

    #[tokio::test]
    async fn sign_up_rejects_reserved_handle_without_db_access() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(&db)
            .sign_up(signup_input("Admin", "x@x.com"))
            .await
            .expect_err("sign up should fail");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn sign_up_distinguishes_duplicate_handle_from_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(3, "ana", "other@x.com")]])
            .append_query_results([[user_model(3, "someone", "ana@x.com")]])
            .into_connection();
        let service = service(&db);

        let err = service
            .sign_up(signup_input("ana", "ana@x.com"))
            .await
            .expect_err("duplicate handle should fail");
        assert_eq!(err.message(), "Handle already exists");

        let err = service
            .sign_up(signup_input("ana", "ana@x.com"))
            .await
            .expect_err("duplicate email should fail");
        assert_eq!(err.message(), "Email already exists");
    }

    #[tokio::test]
    async fn sign_up_returns_tokens_and_user() {
        let now = ts();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[user_model(8, "ana", "ana@x.com")]])
            .append_query_results([[session_model(
                21,
                8,
                "digest",
                now + Duration::days(7),
                now,
            )]])
            .into_connection();

        let (tokens, user) = service(&db)
            .sign_up(signup_input("ana", "ana@x.com"))
            .await
            .expect("sign up should succeed");

        assert_eq!(user.handle.as_deref(), Some("ana"));
        assert!(tokens.refresh_token.starts_with("21."));
        assert_eq!(tokens.token_type, "Bearer");
        let claims = decode_claims(&tokens.access_token);
        assert_eq!(claims.sub, "8");
        assert_eq!(claims.handle.as_deref(), Some("ana"));
    }

    #[tokio::test]
    async fn sign_in_rejects_unknown_handle() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = service(&db)
            .sign_in("ghost", "Str0ng!pw")
            .await
            .expect_err("sign in should fail");
        assert_eq!(err.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn sign_in_rejects_account_without_password() {
        let mut user = user_model(8, "ana", "ana@x.com");
        user.password_hash = None;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();

        let err = service(&db)
            .sign_in("ana", "Str0ng!pw")
            .await
            .expect_err("sign in should fail");
        assert_eq!(err.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn sign_in_rejects_wrong_password() {
        let digest = SecretHasher::new(6)
            .hash("Str0ng!pw")
            .expect("hash succeeds");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model_with_password(8, "ana", "ana@x.com", &digest)]])
            .into_connection();

        let err = service(&db)
            .sign_in("ana", "wrong-password")
            .await
            .expect_err("sign in should fail");
        assert_eq!(err.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn sign_in_issues_pair_on_success() {
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

        let (tokens, _) = service(&db)
            .sign_in("ana", "Str0ng!pw")
            .await
            .expect("sign in should succeed");
        assert!(tokens.refresh_token.starts_with("30."));
    }

    #[tokio::test]
    async fn refresh_returns_rotated_pair() {
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
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[session_model(
                5,
                8,
                "next-digest",
                now + Duration::days(7),
                now,
            )]])
            .append_query_results([[user_model(8, "ana", "ana@x.com")]])
            .into_connection();

        let (tokens, user) = service(&db)
            .refresh("4.old-secret")
            .await
            .expect("refresh should succeed");

        assert_eq!(user.id, 8);
        assert!(tokens.refresh_token.starts_with("5."));
    }

    #[tokio::test]
    async fn seed_admin_noops_when_admin_exists() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(1, "admin", "admin@example.com")]])
            .into_connection();

        let cfg = AuthConfig {
            jwt_secret: "secret".to_string(),
            admin_email: "admin@example.com".to_string(),
            admin_password: "adminpassword".to_string(),
            hash_cost: 6,
            access_token_ttl_secs: 3600,
            refresh_ttl_days: 7,
            refresh_idle_timeout_mins: 60,
            reset_code_ttl_mins: 15,
        };

        service(&db)
            .seed_admin(&cfg)
            .await
            .expect("seed should succeed");
    }
}
