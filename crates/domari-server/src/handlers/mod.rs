//! Route handlers, one module per resource.

pub mod audit;
pub mod billing;
pub mod export;
pub mod health;
pub mod invoices;
pub mod messages;
pub mod notifications;
pub mod occupants;
pub mod properties;
pub mod providers;
pub mod users;
pub mod work_orders;

use domari_core::query::{ListParams, Page, SortOrder, total_pages};
use domari_core::repository::PaginatedResult;
use serde::{Deserialize, Serialize};

/// Common list-window query parameters, shared by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListQuery {
    pub fn normalize(self) -> Page {
        ListParams {
            page: self.page,
            limit: self.limit,
            search: self.search,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
        .normalize()
    }
}

/// Paginated payload: the items plus the window they came from.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> From<PaginatedResult<T>> for Paged<T> {
    fn from(result: PaginatedResult<T>) -> Self {
        let page = if result.limit == 0 {
            1
        } else {
            result.offset / result.limit + 1
        };
        Self {
            items: result.items,
            total: result.total,
            page,
            limit: result.limit,
            total_pages: total_pages(result.total, result.limit),
        }
    }
}
