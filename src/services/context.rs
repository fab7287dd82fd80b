use std::sync::Arc;

use crate::{
    auth::{jwt::JwtKeys, password::SecretHasher},
    config::AuthConfig,
    db::dao::DaoContext,
    notifier::Notifier,
    services::{
        auth_service::AuthService, balance_service::BalanceService,
        expense_service::ExpenseService, income_service::IncomeService,
        mileage_service::MileageService, password_reset::PasswordResetService,
        refresh_sessions::RefreshSessionManager, store_service::StoreService,
        user_service::UserService,
    },
    state::AppState,
};

/// Composition root for the service layer: every service gets its
/// collaborators through the constructor, nothing reaches for globals.
#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
    auth_cfg: AuthConfig,
    jwt: JwtKeys,
    hasher: SecretHasher,
    notifier: Arc<dyn Notifier>,
}

impl ServiceContext {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            daos: DaoContext::new(&state.db),
            auth_cfg: state.auth.clone(),
            jwt: state.jwt.clone(),
            hasher: state.hasher.clone(),
            notifier: state.notifier.clone(),
        }
    }

    pub fn refresh_sessions(&self) -> RefreshSessionManager {
        RefreshSessionManager::new(
            self.daos.refresh_session(),
            self.hasher.clone(),
            self.auth_cfg.refresh_ttl_days,
            self.auth_cfg.refresh_idle_timeout_mins,
        )
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            self.daos.user(),
            self.refresh_sessions(),
            self.hasher.clone(),
            self.jwt.clone(),
            self.auth_cfg.access_token_ttl_secs,
        )
    }

    pub fn password_reset(&self) -> PasswordResetService {
        PasswordResetService::new(
            self.daos.user(),
            self.daos.password_reset(),
            self.refresh_sessions(),
            self.hasher.clone(),
            self.notifier.clone(),
            self.auth_cfg.reset_code_ttl_mins,
        )
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn expenses(&self) -> ExpenseService {
        ExpenseService::new(self.daos.expense(), self.daos.staff())
    }

    pub fn incomes(&self) -> IncomeService {
        IncomeService::new(self.daos.income(), self.daos.user(), self.daos.staff())
    }

    pub fn mileage(&self) -> MileageService {
        MileageService::new(self.daos.mileage(), self.daos.store())
    }

    pub fn stores(&self) -> StoreService {
        StoreService::new(self.daos.store())
    }

    pub fn balance(&self) -> BalanceService {
        BalanceService::new(self.daos.income(), self.daos.expense(), self.daos.mileage())
    }
}
