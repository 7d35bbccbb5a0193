use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Scope, ScopeLevel};
use crate::client::HttpTransport;
use crate::error::MigrateResult;
use crate::pagination::{fetch_all, PaginationSpec};
use crate::utils::json::str_field;
use crate::utils::Throttle;

/// A project as seen in the flat, account-wide project listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub org_id: Option<String>,
    pub project_id: String,
}

/// Source of the organization and project listings the enumerator walks
#[async_trait]
pub trait ScopeSource: Send + Sync {
    /// Organization identifiers, in listing order
    async fn organizations(&self) -> MigrateResult<Vec<String>>;

    /// Project identifiers inside one organization, in listing order
    async fn projects_in(&self, org_id: &str) -> MigrateResult<Vec<String>>;

    /// Every project of the account with its parent organization, if resolvable
    async fn all_projects(&self) -> MigrateResult<Vec<ProjectRef>>;
}

/// Restrict enumeration to one organization and optionally one project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    pub org_id: Option<String>,
    pub project_id: Option<String>,
}

impl ScopeFilter {
    fn allows_org(&self, org_id: &str) -> bool {
        self.org_id.as_deref().map_or(true, |wanted| wanted == org_id)
    }

    fn allows_project(&self, org_id: &str, project_id: &str) -> bool {
        self.allows_org(org_id)
            && self
                .project_id
                .as_deref()
                .map_or(true, |wanted| wanted == project_id)
    }

    fn is_unrestricted(&self) -> bool {
        self.org_id.is_none() && self.project_id.is_none()
    }

    /// Account scope is only visited by an unrestricted run
    fn allows_account(&self) -> bool {
        self.is_unrestricted()
    }

    /// Organization scopes are skipped once the run is pinned to one project
    fn allows_org_scopes(&self) -> bool {
        self.project_id.is_none()
    }
}

/// Builds the scopes a phase iterates over.
///
/// Scopes are produced fresh on every call and never cached. A listing that
/// fails contributes nothing for its branch and enumeration carries on.
///
/// With a [`ScopeFilter`] set, only scopes inside the filter are produced:
/// no account scope, and no organization scopes when a project is pinned.
#[derive(Clone)]
pub struct ScopeEnumerator {
    source: Arc<dyn ScopeSource>,
    filter: ScopeFilter,
}

impl std::fmt::Debug for ScopeEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeEnumerator")
            .field("filter", &self.filter)
            .finish()
    }
}

impl ScopeEnumerator {
    pub fn new(source: Arc<dyn ScopeSource>) -> Self {
        Self {
            source,
            filter: ScopeFilter::default(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: ScopeFilter) -> Self {
        self.filter = filter;
        self
    }

    async fn organizations(&self) -> Vec<String> {
        match self.source.organizations().await {
            Ok(orgs) => orgs
                .into_iter()
                .filter(|org| self.filter.allows_org(org))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list organizations, continuing without them");
                Vec::new()
            }
        }
    }

    /// Account scope, then every organization, then every (org, project) pair
    /// from the flat project listing.
    ///
    /// Projects whose parent organization cannot be resolved are skipped. Scopes
    /// outside the filter are left out.
    pub async fn all_scopes(&self) -> Vec<Scope> {
        let mut scopes = Vec::new();
        if self.filter.allows_account() {
            scopes.push(Scope::account());
        }

        scopes.extend(self.organization_scopes().await);

        let projects = match self.source.all_projects().await {
            Ok(projects) => projects,
            Err(e) => {
                warn!(error = %e, "Failed to list projects, continuing without them");
                Vec::new()
            }
        };
        for project in projects {
            match project.org_id {
                Some(org_id) if self.filter.allows_project(&org_id, &project.project_id) => {
                    scopes.push(Scope::project(org_id, project.project_id));
                }
                Some(_) => {}
                None => {
                    debug!(
                        project = %project.project_id,
                        "Skipping project without a resolvable organization"
                    );
                }
            }
        }

        debug!(count = scopes.len(), "Enumerated all scopes");
        scopes
    }

    /// Only (org, project) scopes, walking organizations and listing the
    /// projects of each.
    pub async fn project_scopes_only(&self) -> Vec<Scope> {
        let mut scopes = Vec::new();
        for org_id in self.organizations().await {
            match self.source.projects_in(&org_id).await {
                Ok(projects) => scopes.extend(
                    projects
                        .into_iter()
                        .filter(|project| self.filter.allows_project(&org_id, project))
                        .map(|project| Scope::project(org_id.clone(), project)),
                ),
                Err(e) => {
                    warn!(org = %org_id, error = %e, "Failed to list projects of organization");
                }
            }
        }
        debug!(count = scopes.len(), "Enumerated project scopes");
        scopes
    }

    /// Organization scopes only
    pub async fn organization_scopes(&self) -> Vec<Scope> {
        if !self.filter.allows_org_scopes() {
            return Vec::new();
        }
        self.organizations()
            .await
            .into_iter()
            .map(Scope::organization)
            .collect()
    }

    /// Scopes for a phase with the given applicable levels
    pub async fn scopes_for(&self, levels: &[ScopeLevel]) -> Vec<Scope> {
        match levels {
            [ScopeLevel::Account] if self.filter.allows_account() => vec![Scope::account()],
            [ScopeLevel::Account] => {
                debug!(filter = ?self.filter, "Account scope is outside the filter");
                Vec::new()
            }
            [ScopeLevel::Organization] => self.organization_scopes().await,
            [ScopeLevel::Project] => self.project_scopes_only().await,
            _ => self
                .all_scopes()
                .await
                .into_iter()
                .filter(|scope| levels.contains(&scope.level()))
                .collect(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        !self.filter.is_unrestricted()
    }
}

/// [`ScopeSource`] backed by the platform's organization and project listings
pub struct HttpScopeSource {
    transport: Arc<dyn HttpTransport>,
    throttle: Throttle,
    page_size: usize,
}

impl HttpScopeSource {
    pub fn new(transport: Arc<dyn HttpTransport>, throttle: Throttle, page_size: usize) -> Self {
        Self {
            transport,
            throttle,
            page_size,
        }
    }

    fn organizations_spec(&self) -> PaginationSpec {
        PaginationSpec::page_index_query("/ng/api/organizations")
            .with_page_size(self.page_size)
            .with_unwrap_key("organization")
    }

    fn projects_spec(&self) -> PaginationSpec {
        PaginationSpec::page_index_query("/ng/api/projects")
            .with_page_size(self.page_size)
            .with_unwrap_key("project")
    }

    async fn fetch(&self, spec: &PaginationSpec, scope_params: &[(String, String)]) -> Vec<Value> {
        fetch_all(self.transport.as_ref(), spec, scope_params, &self.throttle).await
    }
}

fn identifier_of(item: &Value) -> Option<String> {
    item.as_object()
        .and_then(|map| str_field(map, "identifier"))
        .map(str::to_string)
}

#[async_trait]
impl ScopeSource for HttpScopeSource {
    async fn organizations(&self) -> MigrateResult<Vec<String>> {
        let items = self.fetch(&self.organizations_spec(), &[]).await;
        Ok(items.iter().filter_map(identifier_of).collect())
    }

    async fn projects_in(&self, org_id: &str) -> MigrateResult<Vec<String>> {
        let items = self
            .fetch(&self.projects_spec(), &Scope::organization(org_id).query_params())
            .await;
        Ok(items.iter().filter_map(identifier_of).collect())
    }

    async fn all_projects(&self) -> MigrateResult<Vec<ProjectRef>> {
        let items = self.fetch(&self.projects_spec(), &[]).await;
        Ok(items
            .iter()
            .filter_map(|item| {
                let map = item.as_object()?;
                Some(ProjectRef {
                    org_id: str_field(map, "orgIdentifier").map(str::to_string),
                    project_id: str_field(map, "identifier")?.to_string(),
                })
            })
            .collect())
    }
}
