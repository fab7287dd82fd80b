use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use super::DaoResult;
use crate::db::entities::store::{self, Entity as Store};

#[derive(Debug, Clone)]
pub struct NewStore {
    pub code: String,
    pub name: String,
    pub district: String,
    pub province: String,
    pub department: String,
    pub service_status: Option<String>,
}

#[derive(Clone)]
pub struct StoreDao {
    db: DatabaseConnection,
}

impl StoreDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(&self, new_store: NewStore) -> DaoResult<store::Model> {
        let model = store::ActiveModel {
            code: Set(new_store.code),
            name: Set(new_store.name),
            district: Set(new_store.district),
            province: Set(new_store.province),
            department: Set(new_store.department),
            service_status: Set(new_store.service_status),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_id(&self, id: i32) -> DaoResult<Option<store::Model>> {
        Ok(Store::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_code(&self, code: &str) -> DaoResult<Option<store::Model>> {
        Ok(Store::find()
            .filter(store::Column::Code.eq(code))
            .one(&self.db)
            .await?)
    }

    pub async fn list_all(&self) -> DaoResult<Vec<store::Model>> {
        Ok(Store::find()
            .order_by_asc(store::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn update(
        &self,
        id: i32,
        apply: impl FnOnce(&mut store::ActiveModel) + Send,
    ) -> DaoResult<Option<store::Model>> {
        let Some(model) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        apply(&mut active);
        Ok(Some(active.update(&self.db).await?))
    }

    pub async fn delete(&self, id: i32) -> DaoResult<bool> {
        let result = Store::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
