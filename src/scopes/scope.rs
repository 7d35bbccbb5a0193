use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::params;

/// Level of the account → organization → project hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    Account,
    Organization,
    Project,
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "account"),
            Self::Organization => write!(f, "organization"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// Coordinate a resource lives at.
///
/// Fields are private so a project can never be set without its organization;
/// build scopes through [`Scope::account`], [`Scope::organization`] and
/// [`Scope::project`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Scope {
    org_id: Option<String>,
    project_id: Option<String>,
}

impl Scope {
    pub fn account() -> Self {
        Self::default()
    }

    pub fn organization(org_id: impl Into<String>) -> Self {
        Self {
            org_id: Some(org_id.into()),
            project_id: None,
        }
    }

    pub fn project(org_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            org_id: Some(org_id.into()),
            project_id: Some(project_id.into()),
        }
    }

    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn level(&self) -> ScopeLevel {
        match (&self.org_id, &self.project_id) {
            (None, _) => ScopeLevel::Account,
            (Some(_), None) => ScopeLevel::Organization,
            (Some(_), Some(_)) => ScopeLevel::Project,
        }
    }

    /// `orgIdentifier` / `projectIdentifier` pairs for this scope
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(2);
        if let Some(org) = &self.org_id {
            out.push((params::ORG.to_string(), org.clone()));
        }
        if let Some(project) = &self.project_id {
            out.push((params::PROJECT.to_string(), project.clone()));
        }
        out
    }

    /// Filesystem-safe suffix used by the export side-channel
    pub fn file_suffix(&self) -> String {
        match (&self.org_id, &self.project_id) {
            (None, _) => String::new(),
            (Some(org), None) => format!("__{org}"),
            (Some(org), Some(project)) => format!("__{org}__{project}"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.org_id, &self.project_id) {
            (None, _) => write!(f, "account"),
            (Some(org), None) => write!(f, "org:{org}"),
            (Some(org), Some(project)) => write!(f, "org:{org}/project:{project}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Scope::account().level(), ScopeLevel::Account);
        assert_eq!(Scope::organization("o").level(), ScopeLevel::Organization);
        assert_eq!(Scope::project("o", "p").level(), ScopeLevel::Project);
    }

    #[test]
    fn test_query_params() {
        assert!(Scope::account().query_params().is_empty());
        assert_eq!(
            Scope::project("o", "p").query_params(),
            vec![
                ("orgIdentifier".to_string(), "o".to_string()),
                ("projectIdentifier".to_string(), "p".to_string()),
            ]
        );
    }

    #[test]
    fn test_display_and_suffix() {
        assert_eq!(Scope::account().to_string(), "account");
        assert_eq!(Scope::organization("eng").to_string(), "org:eng");
        assert_eq!(
            Scope::project("eng", "web").to_string(),
            "org:eng/project:web"
        );
        assert_eq!(Scope::project("eng", "web").file_suffix(), "__eng__web");
        assert_eq!(Scope::account().file_suffix(), "");
    }

    #[test]
    fn test_scope_serializes_both_coordinates() {
        let value = serde_json::to_value(Scope::project("eng", "web")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"org_id": "eng", "project_id": "web"})
        );
        let value = serde_json::to_value(Scope::account()).unwrap();
        assert_eq!(value, serde_json::json!({"org_id": null, "project_id": null}));
    }
}
