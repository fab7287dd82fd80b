use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaoLayerError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i32 },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
