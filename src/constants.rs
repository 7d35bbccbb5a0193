//! # System Constants
//!
//! Operational boundaries of a migration run: API defaults, paging limits,
//! throttling and the names of query parameters every call carries.

/// Default Harness gateway URL
pub const DEFAULT_BASE_URL: &str = "https://app.harness.io/gateway";

/// Header carrying the platform API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default HTTP timeout for a single request
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Delay applied after every write and every page fetch
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Hard ceiling on pages fetched from a single listing
pub const MAX_PAGES: usize = 10_000;

/// Default directory for the audit export side-channel
pub const DEFAULT_EXPORT_DIR: &str = "harness_exports";

/// Query parameter names shared by every platform endpoint
pub mod params {
    pub const ACCOUNT: &str = "accountIdentifier";
    pub const ORG: &str = "orgIdentifier";
    pub const PROJECT: &str = "projectIdentifier";
}

/// Environment variables consulted at startup
pub mod env {
    pub const SOURCE_API_KEY: &str = "HARNESS_SOURCE_API_KEY";
    pub const SOURCE_ACCOUNT_ID: &str = "HARNESS_SOURCE_ACCOUNT_ID";
    pub const DEST_API_KEY: &str = "HARNESS_DEST_API_KEY";
    pub const DEST_ACCOUNT_ID: &str = "HARNESS_DEST_ACCOUNT_ID";
    pub const BASE_URL: &str = "HARNESS_BASE_URL";
    pub const DELAY_MS: &str = "HARNESS_MIGRATE_DELAY_MS";
    /// `json` switches the console log to JSON lines
    pub const LOG_FORMAT: &str = "HARNESS_MIGRATE_LOG_FORMAT";
}
