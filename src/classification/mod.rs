//! # Resource and Outcome Classification
//!
//! Pure decision functions used by the runner:
//!
//! - [`storage_mode`] - Inline vs Remote storage of a fetched resource
//! - [`idempotency`] - "already exists" detection for failed writes

pub mod idempotency;
pub mod storage_mode;

pub use idempotency::{classify_write_failure, is_already_exists, WriteFailureKind};
pub use storage_mode::{classify, extract_git_ref, GitRef, StorageMode};
