use sea_orm::DatabaseConnection;

use super::{
    ExpenseDao, IncomeDao, MileageDao, PasswordResetDao, RefreshSessionDao, StaffDao, StoreDao,
    UserDao,
};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        UserDao::new(&self.db)
    }

    pub fn refresh_session(&self) -> RefreshSessionDao {
        RefreshSessionDao::new(&self.db)
    }

    pub fn password_reset(&self) -> PasswordResetDao {
        PasswordResetDao::new(&self.db)
    }

    pub fn expense(&self) -> ExpenseDao {
        ExpenseDao::new(&self.db)
    }

    pub fn income(&self) -> IncomeDao {
        IncomeDao::new(&self.db)
    }

    pub fn mileage(&self) -> MileageDao {
        MileageDao::new(&self.db)
    }

    pub fn store(&self) -> StoreDao {
        StoreDao::new(&self.db)
    }

    pub fn staff(&self) -> StaffDao {
        StaffDao::new(&self.db)
    }
}
