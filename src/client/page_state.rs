//! Page-state synchronization for the product listing.
//!
//! Keeps (page, page size, search term) consistent with the URL and
//! decides when a new listing fetch is needed. The sync is
//! one-directional: state serializes to a canonical query string, and a
//! query string parsed on load or back-navigation produces state. In-
//! flight fetches carry a ticket; only the latest ticket's response is
//! applied, so rapid superseding requests cannot overwrite fresh data
//! with stale data.

use serde::Deserialize;

use crate::models::Product;
use crate::pagination::PaginatedProducts;

/// Items per page by viewport width.
pub fn page_size_for_width(width: u32) -> u32 {
    if width > 1200 {
        12 // 4 columns x 3 rows
    } else if width > 800 {
        9 // 3 columns x 3 rows
    } else if width > 500 {
        6 // 2 columns x 3 rows
    } else {
        4 // 1 column x 4 rows
    }
}

/// Parameters for one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Deserialize, Default)]
struct UrlParams {
    page: Option<String>,
    #[serde(rename = "returnPage")]
    return_page: Option<String>,
    search: Option<String>,
}

impl UrlParams {
    fn parse(query: &str) -> Self {
        serde_urlencoded::from_str(query).unwrap_or_default()
    }
}

fn lenient_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
}

/// Listing page state.
#[derive(Debug)]
pub struct PageState {
    page: u32,
    limit: u32,
    search: Option<String>,
    total_pages: i64,
    products: Vec<Product>,
    loading: bool,
    error: Option<String>,
    latest_ticket: u64,
}

impl PageState {
    /// Page 1 with the page size for the given viewport.
    pub fn new(viewport_width: u32) -> Self {
        PageState {
            page: 1,
            limit: page_size_for_width(viewport_width),
            search: None,
            total_pages: 1,
            products: Vec::new(),
            loading: false,
            error: None,
            latest_ticket: 0,
        }
    }

    /// State from a URL query string (load or back-navigation). Garbage
    /// page values fall back to 1; the page size comes from the viewport,
    /// never the URL.
    pub fn from_url_query(query: &str, viewport_width: u32) -> Self {
        let params = UrlParams::parse(query);
        let mut state = Self::new(viewport_width);
        state.page = lenient_page(params.page.as_deref());
        state.search = non_empty(params.search);
        state
    }

    /// The canonical URL query for the current state. Parsing it back
    /// reproduces (page, search); there is no second sync path.
    pub fn to_url_query(&self) -> String {
        let mut pairs = vec![("page", self.page.to_string())];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }

    /// Recompute the page size from a new viewport width. A changed size
    /// resets to page 1 and returns true (a new fetch is needed);
    /// re-applying the same width is a no-op.
    pub fn resize(&mut self, viewport_width: u32) -> bool {
        let limit = page_size_for_width(viewport_width);
        if limit == self.limit {
            return false;
        }
        self.limit = limit;
        self.page = 1;
        true
    }

    /// Change the search term; any change resets to page 1. Returns true
    /// when the term actually changed.
    pub fn set_search(&mut self, term: Option<&str>) -> bool {
        let term = term.filter(|t| !t.is_empty()).map(str::to_owned);
        if term == self.search {
            return false;
        }
        self.search = term;
        self.page = 1;
        true
    }

    /// Navigate to a page, silently clamped into `[1, total_pages]`.
    pub fn go_to_page(&mut self, target: u32) {
        let max = self.total_pages.max(1).min(u32::MAX as i64) as u32;
        self.page = target.clamp(1, max);
    }

    /// The listing request for the current state.
    pub fn listing_query(&self) -> ListingQuery {
        ListingQuery {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
        }
    }

    /// Start a fetch for the current state. Any previously issued ticket
    /// becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.loading = true;
        FetchTicket(self.latest_ticket)
    }

    /// Apply a fetch outcome. Stale tickets are dropped and return
    /// false: the last response to arrive wins, without cancellation.
    /// A network failure becomes a visible error state, not a panic.
    pub fn apply_response(
        &mut self,
        ticket: FetchTicket,
        result: Result<PaginatedProducts, String>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            return false;
        }
        self.loading = false;
        match result {
            Ok(response) => {
                self.products = response.products;
                self.total_pages = response.total_pages.max(1);
                // The result may shrink the page count under us.
                if (self.page as i64) > self.total_pages {
                    self.page = self.total_pages as u32;
                }
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        true
    }

    /// Query string carrying the state a detail view needs to return
    /// here: the originating page and search term.
    pub fn return_query(&self) -> String {
        let mut pairs = vec![("returnPage", self.page.to_string())];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }

    /// Rebuild listing state from a detail view's return query.
    pub fn from_return_query(query: &str, viewport_width: u32) -> Self {
        let params = UrlParams::parse(query);
        let mut state = Self::new(viewport_width);
        state.page = lenient_page(params.return_page.as_deref());
        state.search = non_empty(params.search);
        state
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;
    use uuid::Uuid;

    fn response(count: usize, total_pages: i64) -> PaginatedProducts {
        let products = (0..count)
            .map(|i| Product {
                id: Uuid::new_v4(),
                name: format!("Product {i}"),
                description: String::new(),
                category: Category::Home,
                price: 1.0,
                quantity: 1,
                image: None,
                created_at: Utc::now(),
            })
            .collect();
        PaginatedProducts {
            products,
            current_page: 1,
            total_pages,
            total_products: total_pages * 12,
        }
    }

    #[test]
    fn breakpoint_table() {
        assert_eq!(page_size_for_width(1920), 12);
        assert_eq!(page_size_for_width(1201), 12);
        assert_eq!(page_size_for_width(1200), 9);
        assert_eq!(page_size_for_width(801), 9);
        assert_eq!(page_size_for_width(800), 6);
        assert_eq!(page_size_for_width(501), 6);
        assert_eq!(page_size_for_width(500), 4);
        assert_eq!(page_size_for_width(320), 4);
    }

    #[test]
    fn resize_resets_page_and_is_idempotent() {
        let mut state = PageState::new(1920);
        state.total_pages = 5;
        state.go_to_page(3);

        assert!(state.resize(700));
        assert_eq!(state.limit(), 6);
        assert_eq!(state.page(), 1);

        // Same width again: nothing changes.
        state.go_to_page(2);
        assert!(!state.resize(700));
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn navigation_clamps_out_of_range_pages() {
        let mut state = PageState::new(1920);
        state.total_pages = 4;

        state.go_to_page(99);
        assert_eq!(state.page(), 4);
        state.go_to_page(0);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn search_change_resets_to_page_one() {
        let mut state = PageState::new(1920);
        state.total_pages = 5;
        state.go_to_page(4);

        assert!(state.set_search(Some("mouse")));
        assert_eq!(state.page(), 1);
        assert_eq!(state.search(), Some("mouse"));

        // Setting the identical term is not a change.
        state.go_to_page(3);
        assert!(!state.set_search(Some("mouse")));
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn url_query_round_trips() {
        let mut state = PageState::new(1920);
        state.total_pages = 9;
        state.set_search(Some("denim jacket"));
        state.go_to_page(2);

        let query = state.to_url_query();
        let restored = PageState::from_url_query(&query, 1920);
        assert_eq!(restored.page(), 2);
        assert_eq!(restored.search(), Some("denim jacket"));
    }

    #[test]
    fn garbage_url_page_falls_back_to_one() {
        let state = PageState::from_url_query("page=abc&search=x", 1920);
        assert_eq!(state.page(), 1);
        assert_eq!(state.search(), Some("x"));
        let state = PageState::from_url_query("page=0", 1920);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn return_state_restores_page_and_search() {
        let mut state = PageState::new(1920);
        state.total_pages = 6;
        state.set_search(Some("shoes"));
        state.go_to_page(3);

        let back = PageState::from_return_query(&state.return_query(), 1920);
        assert_eq!(back.page(), 3);
        assert_eq!(back.search(), Some("shoes"));
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut state = PageState::new(1920);

        let first = state.begin_fetch();
        let second = state.begin_fetch();

        // The second (latest) fetch lands first.
        assert!(state.apply_response(second, Ok(response(3, 2))));
        assert_eq!(state.products().len(), 3);
        assert!(!state.is_loading());

        // The superseded fetch must not overwrite it.
        assert!(!state.apply_response(first, Ok(response(12, 7))));
        assert_eq!(state.products().len(), 3);
        assert_eq!(state.total_pages(), 2);
    }

    #[test]
    fn loading_flag_spans_fetch_lifetime() {
        let mut state = PageState::new(1920);
        assert!(!state.is_loading());

        let ticket = state.begin_fetch();
        assert!(state.is_loading());

        state.apply_response(ticket, Ok(response(1, 1)));
        assert!(!state.is_loading());
    }

    #[test]
    fn fetch_failure_becomes_error_state() {
        let mut state = PageState::new(1920);
        let ticket = state.begin_fetch();
        state.apply_response(ticket, Err("network unreachable".into()));
        assert_eq!(state.error(), Some("network unreachable"));
        assert!(!state.is_loading());

        // A later successful fetch clears it.
        let ticket = state.begin_fetch();
        state.apply_response(ticket, Ok(response(1, 1)));
        assert_eq!(state.error(), None);
    }

    #[test]
    fn zero_match_response_keeps_a_valid_page_state() {
        let mut state = PageState::new(1920);
        state.total_pages = 5;
        state.go_to_page(5);

        let ticket = state.begin_fetch();
        state.apply_response(ticket, Ok(response(0, 1)));
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.page(), 1);
    }
}
