//! Pagination contract shared by the listing endpoint and the client.
//!
//! Normalizes raw query parameters into a `PageRequest` (page >= 1, limit
//! defaulting to 12), computes the skip offset, and derives total page
//! counts. When zero items match, `total_pages` clamps to 1 so the client
//! always has a coherent "page 1 of 1" state.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Product;

/// Items per page when the client does not say otherwise.
pub const DEFAULT_LIMIT: u32 = 12;

/// Raw listing query parameters. Page and limit tolerate garbage: a
/// non-numeric value is treated as absent rather than rejected.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub limit: Option<u32>,
    pub search: Option<String>,
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

/// A normalized page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl PageRequest {
    pub fn from_query(query: PageQuery) -> Self {
        let page = query.page.unwrap_or(1).max(1);
        let limit = match query.limit {
            Some(l) if l > 0 => l,
            _ => DEFAULT_LIMIT,
        };
        let search = query.search.filter(|s| !s.is_empty());
        PageRequest {
            page,
            limit,
            search,
        }
    }

    /// Offset of the first item on this page.
    pub fn skip(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

/// `ceil(total / limit)`, clamped to at least 1.
pub fn total_pages(total: i64, limit: u32) -> i64 {
    let limit = limit.max(1) as i64;
    ((total + limit - 1) / limit).max(1)
}

/// Listing response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedProducts {
    pub products: Vec<Product>,
    pub current_page: u32,
    pub total_pages: i64,
    pub total_products: i64,
}

impl PaginatedProducts {
    pub fn new(products: Vec<Product>, request: &PageRequest, total: i64) -> Self {
        PaginatedProducts {
            products,
            current_page: request.page,
            total_pages: total_pages(total, request.limit),
            total_products: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>, search: Option<&str>) -> PageQuery {
        let mut parts = Vec::new();
        if let Some(p) = page {
            parts.push(format!("page={p}"));
        }
        if let Some(l) = limit {
            parts.push(format!("limit={l}"));
        }
        if let Some(s) = search {
            parts.push(format!("search={s}"));
        }
        serde_urlencoded::from_str(&parts.join("&")).expect("query should always deserialize")
    }

    #[test]
    fn non_numeric_page_becomes_page_one() {
        let req = PageRequest::from_query(query(Some("abc"), None, None));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn zero_page_becomes_page_one() {
        let req = PageRequest::from_query(query(Some("0"), None, None));
        assert_eq!(req.page, 1);
    }

    #[test]
    fn zero_or_garbage_limit_defaults() {
        assert_eq!(
            PageRequest::from_query(query(None, Some("0"), None)).limit,
            DEFAULT_LIMIT
        );
        assert_eq!(
            PageRequest::from_query(query(None, Some("x"), None)).limit,
            DEFAULT_LIMIT
        );
    }

    #[test]
    fn empty_search_is_dropped() {
        let req = PageRequest::from_query(query(None, None, Some("")));
        assert_eq!(req.search, None);
        let req = PageRequest::from_query(query(None, None, Some("mouse")));
        assert_eq!(req.search.as_deref(), Some("mouse"));
    }

    #[test]
    fn skip_is_page_minus_one_times_limit() {
        let req = PageRequest {
            page: 3,
            limit: 12,
            search: None,
        };
        assert_eq!(req.skip(), 24);
    }

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 12), 1); // clamp policy
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(25, 12), 3);
    }

    #[test]
    fn pages_partition_all_items_exactly_once() {
        // Walking every page with a given limit must touch indices
        // 0..total exactly once, no duplicates, no omissions.
        for limit in [1u32, 4, 6, 9, 12] {
            for total in [0i64, 1, 5, 12, 13, 47] {
                let pages = total_pages(total, limit);
                let mut seen = Vec::new();
                for page in 1..=pages {
                    let req = PageRequest {
                        page: page as u32,
                        limit,
                        search: None,
                    };
                    let start = req.skip();
                    let end = (start + limit as i64).min(total);
                    for i in start..end.max(start) {
                        seen.push(i);
                    }
                }
                let expected: Vec<i64> = (0..total).collect();
                assert_eq!(seen, expected, "limit={limit} total={total}");
            }
        }
    }
}
