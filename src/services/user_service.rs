use serde::Serialize;

use crate::{
    auth::Role,
    db::dao::{UserDao, user_dao::ProfilePatch},
    db::entities::user,
    error::AppError,
    services::scope::CurrentUser,
};

/// Public projection of a user record. The password hash never leaves the
/// service layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub handle: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub active: bool,
}

impl From<user::Model> for UserView {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            handle: model.handle,
            email: model.email,
            phone: model.phone,
            role: model.role,
            active: model.active,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    users: UserDao,
}

impl UserService {
    pub fn new(users: UserDao) -> Self {
        Self { users }
    }

    pub async fn list(&self) -> Result<Vec<UserView>, AppError> {
        let users = self.users.list_all().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Admin action: flips an analyst account to active.
    pub async fn approve_analyst(&self, id: i32) -> Result<UserView, AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if user.role.as_deref() != Some(Role::Analyst.as_str()) {
            return Err(AppError::bad_request("User is not an analyst"));
        }

        let updated = self.users.set_active(id, true).await?;
        Ok(updated.into())
    }

    pub async fn update_profile(
        &self,
        id: i32,
        patch: ProfilePatch,
        current: &CurrentUser,
    ) -> Result<UserView, AppError> {
        if current.role != Role::Admin && current.id != id {
            return Err(AppError::forbidden(
                "Not allowed to update this profile",
            ));
        }

        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if let Some(email) = patch.email.as_deref() {
            if email != user.email {
                if let Some(existing) = self.users.find_by_email(email).await? {
                    if existing.id != id {
                        return Err(AppError::conflict("Email already exists"));
                    }
                }
            }
        }

        let updated = self.users.update_profile(id, patch).await?;
        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    use crate::{
        auth::Role,
        db::dao::{UserDao, user_dao::ProfilePatch},
        error::AppError,
        services::scope::CurrentUser,
        test_helpers::{user_model, user_model_with_role},
    };

    use super::{UserService, UserView};

    fn service(db: &DatabaseConnection) -> UserService {
        UserService::new(UserDao::new(db))
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            id: 1,
            handle: Some("admin".to_string()),
            role: Role::Admin,
        }
    }

    fn plain(id: i32) -> CurrentUser {
        CurrentUser {
            id,
            handle: Some("ana".to_string()),
            role: Role::User,
        }
    }

    #[test]
    fn view_drops_password_hash() {
        let view = UserView::from(user_model(3, "ana", "ana@x.com"));
        let json = serde_json::to_value(&view).expect("view serializes");

        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["handle"], "ana");
    }

    #[tokio::test]
    async fn approve_analyst_rejects_non_analysts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(3, "ana", "ana@x.com")]])
            .into_connection();

        let err = service(&db)
            .approve_analyst(3)
            .await
            .expect_err("approval should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn approve_analyst_activates_account() {
        let analyst = user_model_with_role(4, "bea", "bea@x.com", Role::Analyst);
        let mut activated = analyst.clone();
        activated.active = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[analyst.clone()]])
            .append_query_results([[analyst]])
            .append_query_results([[activated]])
            .into_connection();

        let view = service(&db)
            .approve_analyst(4)
            .await
            .expect("approval should succeed");
        assert!(view.active);
    }

    #[tokio::test]
    async fn update_profile_requires_self_or_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(&db)
            .update_profile(3, ProfilePatch::default(), &plain(99))
            .await
            .expect_err("update should fail");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_profile_rejects_taken_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(3, "ana", "ana@x.com")]])
            .append_query_results([[user_model(9, "other", "new@x.com")]])
            .into_connection();

        let patch = ProfilePatch {
            email: Some("new@x.com".to_string()),
            ..Default::default()
        };
        let err = service(&db)
            .update_profile(3, patch, &admin())
            .await
            .expect_err("update should fail");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_profile_applies_patch_for_self() {
        let current = user_model(3, "ana", "ana@x.com");
        let mut renamed = current.clone();
        renamed.name = "Ana Maria".to_string();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[current.clone()]])
            .append_query_results([[current]])
            .append_query_results([[renamed]])
            .into_connection();

        let patch = ProfilePatch {
            name: Some("Ana Maria".to_string()),
            ..Default::default()
        };
        let view = service(&db)
            .update_profile(3, patch, &plain(3))
            .await
            .expect("update should succeed");
        assert_eq!(view.name, "Ana Maria");
    }
}
