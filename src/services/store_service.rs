use sea_orm::Set;

use crate::{
    db::dao::{StoreDao, store_dao::NewStore},
    db::entities::store,
    error::AppError,
    services::patch::FieldUpdate,
};

#[derive(Debug, Clone, Default)]
pub struct StorePatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub department: Option<String>,
    pub service_status: FieldUpdate<String>,
}

#[derive(Clone)]
pub struct StoreService {
    stores: StoreDao,
}

impl StoreService {
    pub fn new(stores: StoreDao) -> Self {
        Self { stores }
    }

    pub async fn create(&self, new_store: NewStore) -> Result<store::Model, AppError> {
        if self.stores.find_by_code(&new_store.code).await?.is_some() {
            return Err(AppError::conflict("Store code already exists"));
        }
        Ok(self.stores.create(new_store).await?)
    }

    pub async fn list(&self) -> Result<Vec<store::Model>, AppError> {
        Ok(self.stores.list_all().await?)
    }

    pub async fn get(&self, id: i32) -> Result<store::Model, AppError> {
        self.stores
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Store {id} not found")))
    }

    pub async fn update(&self, id: i32, patch: StorePatch) -> Result<store::Model, AppError> {
        if let Some(code) = patch.code.as_deref() {
            if let Some(existing) = self.stores.find_by_code(code).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Store code already exists"));
                }
            }
        }

        self.stores
            .update(id, move |active| {
                if let Some(code) = patch.code {
                    active.code = Set(code);
                }
                if let Some(name) = patch.name {
                    active.name = Set(name);
                }
                if let Some(district) = patch.district {
                    active.district = Set(district);
                }
                if let Some(province) = patch.province {
                    active.province = Set(province);
                }
                if let Some(department) = patch.department {
                    active.department = Set(department);
                }
                match patch.service_status {
                    FieldUpdate::Unchanged => {}
                    FieldUpdate::Clear => active.service_status = Set(None),
                    FieldUpdate::Set(status) => active.service_status = Set(Some(status)),
                }
            })
            .await?
            .ok_or_else(|| AppError::not_found(format!("Store {id} not found")))
    }

    pub async fn remove(&self, id: i32) -> Result<(), AppError> {
        let deleted = self.stores.delete(id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Store {id} not found")));
        }
        Ok(())
    }
}
