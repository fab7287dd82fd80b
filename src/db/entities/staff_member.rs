use sea_orm::entity::prelude::*;

/// Administrative staff able to approve expenses and register deposits.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "staff_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(default_value = true)]
    pub active: bool,
    #[sea_orm(indexed)]
    pub user_id: i32,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(has_many)]
    pub approved_expenses: HasMany<super::expense::Entity>,
    #[sea_orm(has_many)]
    pub deposited_incomes: HasMany<super::income::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
