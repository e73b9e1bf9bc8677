//! Page-based pagination for list endpoints.
//!
//! Query parameters arrive as `?page=2&per_page=50`; both are optional and
//! clamped server-side. `limit()`/`offset()` return `i64` because that is
//! what the SQL binds want.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    page: Option<u32>,
    per_page: Option<u32>,
}

impl PaginationParams {
    /// 1-indexed page, never below 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, clamped to `1..=100`.
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

/// List payload plus its pagination envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: u64) -> Self {
        let per_page = params.per_page();
        Self {
            data,
            pagination: PaginationMeta {
                page: params.page(),
                per_page,
                total_items,
                total_pages: total_items.div_ceil(u64::from(per_page)),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, per_page: Option<u32>) -> PaginationParams {
        PaginationParams { page, per_page }
    }

    #[test]
    fn defaults_and_clamps() {
        let p = params(None, None);
        assert_eq!((p.page(), p.per_page()), (1, 20));

        let p = params(Some(0), Some(1000));
        assert_eq!((p.page(), p.per_page()), (1, 100));
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn offset_follows_page() {
        let p = params(Some(3), Some(25));
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        let meta = Paginated::<u32>::new(vec![], &params(None, Some(20)), 41).pagination;
        assert_eq!(meta.total_pages, 3);
        let meta = Paginated::<u32>::new(vec![], &params(None, Some(20)), 0).pagination;
        assert_eq!(meta.total_pages, 0);
    }
}
