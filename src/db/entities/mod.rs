#[allow(unused_imports)]
pub mod prelude {
    pub use super::expense::Entity as Expense;
    pub use super::income::Entity as Income;
    pub use super::mileage_record::Entity as MileageRecord;
    pub use super::password_reset_token::Entity as PasswordResetToken;
    pub use super::refresh_session::Entity as RefreshSession;
    pub use super::staff_member::Entity as StaffMember;
    pub use super::store::Entity as Store;
    pub use super::user::Entity as User;
}

pub mod expense;
pub mod income;
pub mod mileage_record;
pub mod password_reset_token;
pub mod refresh_session;
pub mod staff_member;
pub mod store;
pub mod user;
