//! List-query parameters and their normalization rules.
//!
//! Repositories receive an already-normalized [`Page`]; the tenant
//! filter itself is injected by the repository, never supplied by the
//! caller.

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw list parameters as they arrive from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

/// Normalized pagination window plus sort/search state.
#[derive(Debug, Clone)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
    /// Lower-cased search term, absent when blank.
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

impl ListParams {
    /// Apply the normalization rules: `page >= 1`, `limit` clamped to
    /// `[1, MAX_PAGE_SIZE]`, `offset = (page - 1) * limit`, descending
    /// creation-time sort by default.
    pub fn normalize(self) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let search = self
            .search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Page {
            offset: (page - 1) * limit,
            limit,
            search,
            sort_by: self.sort_by,
            sort_order: self.sort_order.unwrap_or(SortOrder::Desc),
        }
    }
}

/// Total page count for a result set; what the HTTP layer reports.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 { 0 } else { total.div_ceil(limit) }
}
