use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use super::DaoResult;
use crate::db::entities::staff_member::{self, Entity as StaffMember};

#[derive(Clone)]
pub struct StaffDao {
    db: DatabaseConnection,
}

impl StaffDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(&self, name: &str, user_id: i32) -> DaoResult<staff_member::Model> {
        let model = staff_member::ActiveModel {
            name: Set(name.to_string()),
            active: Set(true),
            user_id: Set(user_id),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_id(&self, id: i32) -> DaoResult<Option<staff_member::Model>> {
        Ok(StaffMember::find_by_id(id).one(&self.db).await?)
    }
}
