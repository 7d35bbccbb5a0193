//! Resource values flowing through a phase: the summary a listing returns and
//! the fully fetched, classified instance that gets written.

use serde_json::{Map, Value};

use crate::classification::{classify, extract_git_ref, GitRef, StorageMode};
use crate::error::MigrateResult;
use crate::utils::json::str_field;

/// One item of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSummary {
    pub identifier: String,
    pub display_name: String,
    /// The listing item as returned, after envelope unwrapping
    pub item: Map<String, Value>,
}

impl ResourceSummary {
    /// Build a summary from a listing item; items without an identifier are dropped
    pub fn from_item(item: Value, identifier_field: &str) -> Option<Self> {
        let Value::Object(item) = item else {
            return None;
        };
        let identifier = str_field(&item, identifier_field)?.to_string();
        let display_name = str_field(&item, "name")
            .unwrap_or(&identifier)
            .to_string();
        Some(Self {
            identifier,
            display_name,
            item,
        })
    }

    /// String field of the listing item
    pub fn field(&self, key: &str) -> Option<&str> {
        str_field(&self.item, key)
    }
}

/// A fetched resource, classified and ready to write
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInstance {
    pub identifier: String,
    pub display_name: String,
    pub raw_data: Map<String, Value>,
    pub storage_mode: StorageMode,
    pub git_ref: Option<GitRef>,
}

impl ResourceInstance {
    /// Classify fetched data. A Remote resource without complete git
    /// coordinates is an error for this resource only.
    pub fn classify(summary: &ResourceSummary, raw_data: Map<String, Value>) -> MigrateResult<Self> {
        let storage_mode = classify(&raw_data);
        let git_ref = match storage_mode {
            StorageMode::Remote => Some(extract_git_ref(&summary.identifier, &raw_data)?),
            StorageMode::Inline => None,
        };
        Ok(Self {
            identifier: summary.identifier.clone(),
            display_name: summary.display_name.clone(),
            raw_data,
            storage_mode,
            git_ref,
        })
    }

    /// The `yaml` field of the fetched data, if any
    pub fn yaml(&self) -> Option<&str> {
        str_field(&self.raw_data, "yaml")
    }
}
