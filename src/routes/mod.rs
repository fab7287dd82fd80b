use serde::Serialize;

use crate::services::scope::Paged;

pub mod auth;
pub mod balance;
mod entry;
pub mod expenses;
pub mod incomes;
pub mod mileage;
pub mod stores;
pub mod users;
pub mod validate;

pub use entry::router;

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    pub meta: ListMeta,
}

pub(crate) fn paged_response<M, T>(page: Paged<M>) -> ListResponse<T>
where
    T: From<M> + Serialize,
{
    let meta = ListMeta {
        total: page.total,
        page: page.page,
        limit: page.limit,
    };
    ListResponse {
        data: page.data.into_iter().map(T::from).collect(),
        meta,
    }
}
