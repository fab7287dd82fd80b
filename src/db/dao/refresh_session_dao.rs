use chrono::{DateTime, Duration, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use super::DaoResult;
use crate::db::entities::refresh_session::{self, Entity as RefreshSession};

#[derive(Clone)]
pub struct RefreshSessionDao {
    db: DatabaseConnection,
}

impl RefreshSessionDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(
        &self,
        user_id: i32,
        secret_hash: &str,
        now: DateTime<FixedOffset>,
        ttl_days: i64,
    ) -> DaoResult<refresh_session::Model> {
        let model = refresh_session::ActiveModel {
            user_id: Set(user_id),
            secret_hash: Set(secret_hash.to_string()),
            expires_at: Set(now + Duration::days(ttl_days)),
            last_used_at: Set(now),
            revoked_at: Set(None),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_id(&self, id: i32) -> DaoResult<Option<refresh_session::Model>> {
        Ok(RefreshSession::find_by_id(id).one(&self.db).await?)
    }

    /// Conditional revocation: only flips a still-active row. Returns
    /// whether this caller won the row, which serializes concurrent
    /// redemptions of the same session.
    pub async fn revoke_if_active(
        &self,
        id: i32,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<bool> {
        let result = RefreshSession::update_many()
            .col_expr(refresh_session::Column::RevokedAt, Expr::value(Some(now)))
            .filter(refresh_session::Column::Id.eq(id))
            .filter(refresh_session::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn revoke_all_for_user(
        &self,
        user_id: i32,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<u64> {
        let result = RefreshSession::update_many()
            .col_expr(refresh_session::Column::RevokedAt, Expr::value(Some(now)))
            .filter(refresh_session::Column::UserId.eq(user_id))
            .filter(refresh_session::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
