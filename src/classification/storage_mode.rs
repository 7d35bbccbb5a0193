//! # Storage Mode Classification
//!
//! Decides whether a fetched resource is stored by the platform itself
//! (Inline) or lives in an external Git repository (Remote).
//!
//! Rules are applied in a fixed order and the first match wins:
//!
//! 1. `storeType` of `REMOTE` / `INLINE`
//! 2. a non-empty `gitDetails` or `entityGitDetails`
//! 3. a top-level `repo` or `branch` key
//! 4. a non-empty `yaml`: Remote when a git-details key exists at all, else Inline
//! 5. Inline
//!
//! Rule 4's Remote branch only fires for git-details keys that are present
//! but empty, because rule 2 already claimed the non-empty ones.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{MigrateResult, MigrationError};
use crate::utils::json::{is_non_empty, str_field};

const GIT_DETAILS_KEYS: [&str; 2] = ["gitDetails", "entityGitDetails"];

/// Where a resource's definition is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageMode {
    Inline,
    Remote,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "INLINE"),
            Self::Remote => write!(f, "REMOTE"),
        }
    }
}

/// Location of a Remote resource's definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    pub repo_name: String,
    pub branch: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_ref: Option<String>,
}

/// Classify a resource's storage mode from its fetched data. Pure.
pub fn classify(data: &Map<String, Value>) -> StorageMode {
    match data.get("storeType").and_then(Value::as_str) {
        Some("REMOTE") => return StorageMode::Remote,
        Some("INLINE") => return StorageMode::Inline,
        _ => {}
    }

    if GIT_DETAILS_KEYS
        .iter()
        .any(|key| data.get(*key).is_some_and(is_non_empty))
    {
        return StorageMode::Remote;
    }

    if data.contains_key("repo") || data.contains_key("branch") {
        return StorageMode::Remote;
    }

    if data.get("yaml").is_some_and(is_non_empty) {
        return if GIT_DETAILS_KEYS.iter().any(|key| data.contains_key(*key)) {
            StorageMode::Remote
        } else {
            StorageMode::Inline
        };
    }

    StorageMode::Inline
}

/// Extract the git coordinates of a Remote resource.
///
/// Looks in `gitDetails`, then `entityGitDetails`, then the top level. Each
/// field is taken from the first place that has it.
pub fn extract_git_ref(identifier: &str, data: &Map<String, Value>) -> MigrateResult<GitRef> {
    let sources: Vec<&Map<String, Value>> = GIT_DETAILS_KEYS
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_object))
        .chain(std::iter::once(data))
        .collect();

    let find = |keys: &[&str]| -> Option<String> {
        sources.iter().find_map(|source| {
            keys.iter()
                .find_map(|key| str_field(source, key))
                .map(str::to_string)
        })
    };

    let repo_name = find(&["repoName", "repo", "repoIdentifier"])
        .ok_or_else(|| MigrationError::missing_git_reference(identifier, "repoName"))?;
    let branch = find(&["branch"])
        .ok_or_else(|| MigrationError::missing_git_reference(identifier, "branch"))?;
    let file_path = find(&["filePath"])
        .ok_or_else(|| MigrationError::missing_git_reference(identifier, "filePath"))?;
    let connector_ref = find(&["connectorRef"]);

    Ok(GitRef {
        repo_name,
        branch,
        file_path,
        connector_ref,
    })
}
