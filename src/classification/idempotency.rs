//! # Write Failure Classification
//!
//! Decides whether a failed write means "the destination already has this
//! resource" (safe to skip) or a genuine failure. This is what makes a run
//! re-executable: re-running from the first phase after a crash turns every
//! previously migrated resource into a skip instead of a failure.
//!
//! Classification is table-driven string matching over the lower-cased
//! response body.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bumped whenever one of the tables below changes
pub const CLASSIFIER_TABLE_VERSION: u32 = 4;

/// Statuses the platform uses for duplicate writes. Duplicate-key storage
/// errors sometimes arrive as a 500.
pub const ALREADY_EXISTS_STATUSES: [u16; 3] = [400, 409, 500];

/// Error codes that always mean a duplicate
pub const DUPLICATE_ERROR_CODES: [&str; 2] = ["duplicate_field", "duplicate_file_import"];

/// Generic code that only means a duplicate alongside a confirming phrase
pub const INVALID_REQUEST_CODE: &str = "invalid_request";

/// Phrases that confirm an `INVALID_REQUEST` is a duplicate
pub const INVALID_REQUEST_CONFIRMATIONS: [&str; 3] =
    ["already exists", "already been imported", "already present"];

/// Message fragments that mean a duplicate on their own
pub const ALREADY_EXISTS_FRAGMENTS: [&str; 7] = [
    "already exists",
    "duplicate",
    "must be unique",
    "e11000 duplicate key",
    "dup key",
    "already exists in this scope",
    "cannot be used",
];

/// Outcome of classifying a failed write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailureKind {
    /// Destination already has the resource; count as skipped
    AlreadyExists,
    /// Anything else; count as failed
    Failed,
}

impl fmt::Display for WriteFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Whether a failed write response means the resource already exists. Pure.
///
/// ```rust
/// use harness_migrate::classification::is_already_exists;
///
/// assert!(is_already_exists(409, "Organization with identifier 'x' already exists"));
/// assert!(!is_already_exists(400, "field 'name' is required"));
/// assert!(!is_already_exists(200, "already exists"));
/// ```
pub fn is_already_exists(status: u16, body: &str) -> bool {
    if !ALREADY_EXISTS_STATUSES.contains(&status) {
        return false;
    }

    let body = body.to_lowercase();

    if DUPLICATE_ERROR_CODES.iter().any(|code| body.contains(code)) {
        return true;
    }
    // INVALID_REQUEST also covers validation errors; only a confirming phrase counts.
    if body.contains(INVALID_REQUEST_CODE) {
        return INVALID_REQUEST_CONFIRMATIONS
            .iter()
            .any(|phrase| body.contains(phrase));
    }

    ALREADY_EXISTS_FRAGMENTS
        .iter()
        .any(|fragment| body.contains(fragment))
}

/// Classify a failed write for the runner's counters
pub fn classify_write_failure(status: u16, body: &str) -> WriteFailureKind {
    if is_already_exists(status, body) {
        WriteFailureKind::AlreadyExists
    } else {
        WriteFailureKind::Failed
    }
}
