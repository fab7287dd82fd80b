use chrono::{DateTime, Duration, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use super::DaoResult;
use crate::db::entities::password_reset_token::{self, Entity as PasswordResetToken};

#[derive(Clone)]
pub struct PasswordResetDao {
    db: DatabaseConnection,
}

impl PasswordResetDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    /// Marks every outstanding (unused, unexpired) token of the user as
    /// used. Runs right before inserting a replacement so at most one
    /// token stays outstanding.
    pub async fn invalidate_outstanding(
        &self,
        user_id: i32,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<u64> {
        let result = PasswordResetToken::update_many()
            .col_expr(password_reset_token::Column::UsedAt, Expr::value(Some(now)))
            .filter(password_reset_token::Column::UserId.eq(user_id))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .filter(password_reset_token::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn create(
        &self,
        user_id: i32,
        code_hash: &str,
        now: DateTime<FixedOffset>,
        ttl_mins: i64,
    ) -> DaoResult<password_reset_token::Model> {
        let model = password_reset_token::ActiveModel {
            user_id: Set(user_id),
            code_hash: Set(code_hash.to_string()),
            expires_at: Set(now + Duration::minutes(ttl_mins)),
            used_at: Set(None),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Newest outstanding token. Only one should exist, but ordering by
    /// creation time tolerates a racing second request.
    pub async fn find_latest_outstanding(
        &self,
        user_id: i32,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<Option<password_reset_token::Model>> {
        Ok(PasswordResetToken::find()
            .filter(password_reset_token::Column::UserId.eq(user_id))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .filter(password_reset_token::Column::ExpiresAt.gt(now))
            .order_by_desc(password_reset_token::Column::CreatedAt)
            .order_by_desc(password_reset_token::Column::Id)
            .one(&self.db)
            .await?)
    }

    pub async fn mark_used(&self, id: i32, now: DateTime<FixedOffset>) -> DaoResult<()> {
        PasswordResetToken::update_many()
            .col_expr(password_reset_token::Column::UsedAt, Expr::value(Some(now)))
            .filter(password_reset_token::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
