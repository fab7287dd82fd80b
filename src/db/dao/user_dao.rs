use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};

use super::{DaoLayerError, DaoResult};
use crate::db::entities::user::{self, Entity as User};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub handle: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl UserDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn find_by_id(&self, id: i32) -> DaoResult<Option<user::Model>> {
        Ok(User::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    pub async fn find_by_handle(&self, handle: &str) -> DaoResult<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::Handle.eq(handle))
            .one(&self.db)
            .await?)
    }

    /// First user claiming either unique field, for duplicate checks at
    /// sign-up.
    pub async fn find_by_handle_or_email(
        &self,
        handle: &str,
        email: &str,
    ) -> DaoResult<Option<user::Model>> {
        Ok(User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Handle.eq(handle))
                    .add(user::Column::Email.eq(email)),
            )
            .one(&self.db)
            .await?)
    }

    pub async fn list_all(&self) -> DaoResult<Vec<user::Model>> {
        Ok(User::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn create(&self, new_user: NewUser) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            name: Set(new_user.name),
            handle: Set(new_user.handle),
            email: Set(new_user.email),
            phone: Set(new_user.phone),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
            active: Set(true),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn set_password_hash(&self, id: i32, password_hash: &str) -> DaoResult<()> {
        let model = self.require(id).await?;
        let mut active = model.into_active_model();
        active.password_hash = Set(Some(password_hash.to_string()));
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn set_active(&self, id: i32, active_flag: bool) -> DaoResult<user::Model> {
        let model = self.require(id).await?;
        let mut active = model.into_active_model();
        active.active = Set(active_flag);
        Ok(active.update(&self.db).await?)
    }

    pub async fn update_profile(&self, id: i32, patch: ProfilePatch) -> DaoResult<user::Model> {
        let model = self.require(id).await?;
        let mut active = model.into_active_model();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(phone) = patch.phone {
            active.phone = Set(Some(phone));
        }
        Ok(active.update(&self.db).await?)
    }

    async fn require(&self, id: i32) -> DaoResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(DaoLayerError::NotFound { entity: "user", id })
    }
}
