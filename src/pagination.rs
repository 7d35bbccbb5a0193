//! # Pagination Engine
//!
//! Fetches the complete collection behind a paginated listing endpoint.
//!
//! The platform has no single paging contract. Depending on the resource,
//! the cursor is `page`/`size` or `pageIndex`/`pageSize` in the query string,
//! an `offset` counted in items, or fields embedded in a POST body, and the
//! items sit at different depths of the response envelope. A
//! [`PaginationSpec`] describes one listing call's contract declaratively and
//! [`fetch_all`] drives any of them.
//!
//! ## Termination
//!
//! The loop stops at the first of:
//!
//! 1. a non-success status or transport error (the partial result is returned),
//! 2. a batch shorter than the page size,
//! 3. a resolvable total-pages field saying the last page was reached,
//! 4. the safety ceiling of [`MAX_PAGES`] pages.
//!
//! Pages are concatenated in fetch order. Overlapping pages from the backend
//! produce duplicate items; nothing is de-duplicated here.

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::client::{ApiRequest, HttpMethod, HttpTransport};
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGES};
use crate::utils::json::{lenient_u64, unwrap_key, walk_path};
use crate::utils::Throttle;

/// Where the pagination cursor is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationLocation {
    Query,
    Body,
}

/// How the cursor advances from one page to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// Cursor is the raw page index
    PageNumber,
    /// Cursor is `page_index * page_size`
    Offset,
}

/// Paging contract of one listing endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationSpec {
    pub method: HttpMethod,
    pub endpoint: String,
    pub query_params: Vec<(String, String)>,
    pub body_params: Map<String, Value>,
    pub page_param: String,
    pub size_param: String,
    pub location: PaginationLocation,
    pub advance: PageAdvance,
    /// Dot-separated path to the item array; empty means the response is the array
    pub content_path: String,
    pub total_pages_path: Option<String>,
    pub page_size: usize,
    /// Per-item wrapper key to unwrap, e.g. `connector` in `content[].connector`
    pub unwrap_key: Option<String>,
    pub max_pages: usize,
}

impl PaginationSpec {
    fn base(
        method: HttpMethod,
        endpoint: &str,
        page_param: &str,
        size_param: &str,
        location: PaginationLocation,
        advance: PageAdvance,
    ) -> Self {
        Self {
            method,
            endpoint: endpoint.to_string(),
            query_params: Vec::new(),
            body_params: Map::new(),
            page_param: page_param.to_string(),
            size_param: size_param.to_string(),
            location,
            advance,
            content_path: "data.content".to_string(),
            total_pages_path: Some("data.totalPages".to_string()),
            page_size: DEFAULT_PAGE_SIZE,
            unwrap_key: None,
            max_pages: MAX_PAGES,
        }
    }

    /// `GET ?page=N&size=S`
    pub fn page_size_query(endpoint: &str) -> Self {
        Self::base(
            HttpMethod::Get,
            endpoint,
            "page",
            "size",
            PaginationLocation::Query,
            PageAdvance::PageNumber,
        )
    }

    /// `GET ?pageIndex=N&pageSize=S`
    pub fn page_index_query(endpoint: &str) -> Self {
        Self::base(
            HttpMethod::Get,
            endpoint,
            "pageIndex",
            "pageSize",
            PaginationLocation::Query,
            PageAdvance::PageNumber,
        )
    }

    /// `GET ?offset=N*S&pageSize=S`
    pub fn offset_query(endpoint: &str) -> Self {
        Self::base(
            HttpMethod::Get,
            endpoint,
            "offset",
            "pageSize",
            PaginationLocation::Query,
            PageAdvance::Offset,
        )
    }

    /// `POST` with `{"page": N, "size": S, ...body_params}`
    pub fn body(endpoint: &str, body_params: Value) -> Self {
        let mut spec = Self::base(
            HttpMethod::Post,
            endpoint,
            "page",
            "size",
            PaginationLocation::Body,
            PageAdvance::PageNumber,
        );
        if let Value::Object(map) = body_params {
            spec.body_params = map;
        }
        spec
    }

    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_params(mut self, page_param: &str, size_param: &str) -> Self {
        self.page_param = page_param.to_string();
        self.size_param = size_param.to_string();
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Send a static JSON body alongside query-string pagination
    #[must_use]
    pub fn with_body(mut self, body_params: Value) -> Self {
        if let Value::Object(map) = body_params {
            self.body_params = map;
        }
        self
    }

    #[must_use]
    pub fn with_content_path(mut self, path: &str) -> Self {
        self.content_path = path.to_string();
        self
    }

    #[must_use]
    pub fn with_total_pages_path(mut self, path: Option<&str>) -> Self {
        self.total_pages_path = path.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_unwrap_key(mut self, key: &str) -> Self {
        self.unwrap_key = Some(key.to_string());
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn cursor(&self, page_index: usize) -> usize {
        match self.advance {
            PageAdvance::PageNumber => page_index,
            PageAdvance::Offset => page_index * self.page_size,
        }
    }

    /// Build the request for one page
    pub fn request_for_page(&self, page_index: usize, scope_params: &[(String, String)]) -> ApiRequest {
        let cursor = self.cursor(page_index);
        let mut request = ApiRequest::new(self.method, self.endpoint.clone())
            .query_pairs(self.query_params.iter().cloned())
            .query_pairs(scope_params.iter().cloned());

        let mut body = self.body_params.clone();
        match self.location {
            PaginationLocation::Query => {
                request = request
                    .query(self.page_param.clone(), cursor.to_string())
                    .query(self.size_param.clone(), self.page_size.to_string());
            }
            PaginationLocation::Body => {
                body.insert(self.page_param.clone(), Value::from(cursor));
                body.insert(self.size_param.clone(), Value::from(self.page_size));
            }
        }

        if !body.is_empty() || self.method != HttpMethod::Get {
            request = request.json(Value::Object(body));
        }
        request
    }
}

/// Fetch every item behind a paginated listing.
///
/// Never fails: listing problems end the walk and whatever was collected so
/// far is returned. The throttle pauses after every page fetch.
pub async fn fetch_all(
    transport: &dyn HttpTransport,
    spec: &PaginationSpec,
    scope_params: &[(String, String)],
    throttle: &Throttle,
) -> Vec<Value> {
    let mut items = Vec::new();

    for page_index in 0..spec.max_pages {
        let request = spec.request_for_page(page_index, scope_params);
        let sent = transport.send(request).await;
        throttle.pause().await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                error!(
                    endpoint = %spec.endpoint,
                    page = page_index,
                    error = %e,
                    "Listing request failed, returning partial result"
                );
                break;
            }
        };

        if !response.is_success() {
            error!(
                endpoint = %spec.endpoint,
                page = page_index,
                status = response.status,
                body = %response.body,
                "Listing returned non-success status, returning partial result"
            );
            break;
        }

        let json = match response.json() {
            Ok(json) => json,
            Err(e) => {
                error!(endpoint = %spec.endpoint, page = page_index, error = %e, "Listing response is not JSON");
                break;
            }
        };

        let batch = walk_path(&json, &spec.content_path)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let batch_len = batch.len();
        items.extend(
            batch
                .into_iter()
                .map(|item| unwrap_key(item, spec.unwrap_key.as_deref())),
        );

        debug!(
            endpoint = %spec.endpoint,
            page = page_index,
            batch = batch_len,
            total = items.len(),
            "Fetched listing page"
        );

        if batch_len < spec.page_size {
            break;
        }

        let total_pages = spec
            .total_pages_path
            .as_deref()
            .and_then(|path| walk_path(&json, path))
            .and_then(lenient_u64);
        if let Some(total) = total_pages {
            if page_index as u64 + 1 >= total {
                break;
            }
        }

        if page_index + 1 == spec.max_pages {
            warn!(
                endpoint = %spec.endpoint,
                max_pages = spec.max_pages,
                "Listing hit the page ceiling without signalling completion"
            );
        }
    }

    items
}
