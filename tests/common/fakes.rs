//! In-memory stand-ins for the platform API, scope listings, adapters and
//! the export side-channel.

use async_trait::async_trait;
use harness_migrate::adapters::{AdapterRegistry, ResourceAdapter};
use harness_migrate::classification::GitRef;
use harness_migrate::client::{ApiRequest, ApiResponse, HttpTransport, RequestBody};
use harness_migrate::error::{MigrateResult, MigrationError};
use harness_migrate::export::{ExportFormat, ExportSink};
use harness_migrate::resource::{ResourceInstance, ResourceSummary};
use harness_migrate::runner::{MigrationRunner, RunOptions};
use harness_migrate::scheduler::ResourceKind;
use harness_migrate::scopes::{ProjectRef, Scope, ScopeEnumerator, ScopeSource};
use harness_migrate::utils::Throttle;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

type Handler = dyn Fn(&ApiRequest) -> MigrateResult<ApiResponse> + Send + Sync;

/// Transport answering every request from a closure and recording it
pub struct FakeTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> MigrateResult<ApiResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Transport that succeeds with an empty object for everything
    pub fn accepting() -> Arc<Self> {
        Self::new(|_| ok_json(json!({"status": "SUCCESS"})))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> MigrateResult<ApiResponse> {
        let response = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub fn ok_json(value: Value) -> MigrateResult<ApiResponse> {
    Ok(ApiResponse::new(200, value.to_string()))
}

pub fn status(code: u16, body: &str) -> MigrateResult<ApiResponse> {
    Ok(ApiResponse::new(code, body))
}

/// Page `page_index` of `items` in the `data.content` envelope
pub fn paged(items: &[Value], page_index: usize, page_size: usize) -> Value {
    let total_pages = items.len().div_ceil(page_size);
    let start = (page_index * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    json!({
        "data": {
            "content": items[start..end].to_vec(),
            "totalPages": total_pages,
            "pageIndex": page_index,
        }
    })
}

/// Numeric cursor of a request, read from the query string or the JSON body
pub fn cursor(request: &ApiRequest, param: &str) -> usize {
    request
        .query_value(param)
        .and_then(|value| value.parse().ok())
        .or_else(|| {
            request
                .json_body()
                .and_then(|body| body.get(param))
                .and_then(Value::as_u64)
                .map(|value| value as usize)
        })
        .unwrap_or(0)
}

/// `n` listing items with identifiers `item-0`, `item-1`, ...
pub fn items(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({"identifier": format!("item-{i}"), "name": format!("Item {i}")}))
        .collect()
}

pub fn yaml_body(request: &ApiRequest) -> Option<String> {
    match &request.body {
        Some(RequestBody::Yaml(yaml)) => Some(yaml.clone()),
        Some(RequestBody::Json(body)) => body
            .as_object()
            .and_then(|map| map.values().find_map(Value::as_str))
            .map(str::to_string),
        None => None,
    }
}

/// Fixed organization/project hierarchy
#[derive(Default)]
pub struct StaticScopeSource {
    orgs: Vec<(String, Vec<String>)>,
    orphans: Vec<String>,
}

impl StaticScopeSource {
    pub fn new(hierarchy: &[(&str, &[&str])]) -> Self {
        Self {
            orgs: hierarchy
                .iter()
                .map(|(org, projects)| {
                    (
                        org.to_string(),
                        projects.iter().map(|p| p.to_string()).collect(),
                    )
                })
                .collect(),
            orphans: Vec::new(),
        }
    }

    pub fn with_orphans(mut self, orphans: &[&str]) -> Self {
        self.orphans = orphans.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn enumerator(self) -> ScopeEnumerator {
        ScopeEnumerator::new(Arc::new(self))
    }
}

#[async_trait]
impl ScopeSource for StaticScopeSource {
    async fn organizations(&self) -> MigrateResult<Vec<String>> {
        Ok(self.orgs.iter().map(|(org, _)| org.clone()).collect())
    }

    async fn projects_in(&self, org_id: &str) -> MigrateResult<Vec<String>> {
        Ok(self
            .orgs
            .iter()
            .find(|(org, _)| org == org_id)
            .map(|(_, projects)| projects.clone())
            .unwrap_or_default())
    }

    async fn all_projects(&self) -> MigrateResult<Vec<ProjectRef>> {
        let mut projects: Vec<ProjectRef> = self
            .orgs
            .iter()
            .flat_map(|(org, projects)| {
                projects.iter().map(move |project| ProjectRef {
                    org_id: Some(org.clone()),
                    project_id: project.clone(),
                })
            })
            .collect();
        projects.extend(self.orphans.iter().map(|project| ProjectRef {
            org_id: None,
            project_id: project.clone(),
        }));
        Ok(projects)
    }
}

/// What a [`FakeAdapter`] does when an item is fetched
#[derive(Debug, Clone)]
pub enum FetchBehavior {
    /// Return the listing item as the definition
    Listing,
    Found(Value),
    Missing,
    Fails(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Inline,
    Remote { repo_name: String },
}

/// Scriptable adapter recording every write
pub struct FakeAdapter {
    kind: ResourceKind,
    listings: HashMap<Scope, Option<Vec<Value>>>,
    fetches: HashMap<String, FetchBehavior>,
    rejections: HashMap<String, (u16, String)>,
    writes: Mutex<Vec<(Scope, String, WriteMode)>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeAdapter {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            listings: HashMap::new(),
            fetches: HashMap::new(),
            rejections: HashMap::new(),
            writes: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn listing(mut self, scope: Scope, items: Vec<Value>) -> Self {
        self.listings.insert(scope, Some(items));
        self
    }

    pub fn failing_listing(mut self, scope: Scope) -> Self {
        self.listings.insert(scope, None);
        self
    }

    pub fn fetch(mut self, identifier: &str, behavior: FetchBehavior) -> Self {
        self.fetches.insert(identifier.to_string(), behavior);
        self
    }

    pub fn reject_write(mut self, identifier: &str, status: u16, body: &str) -> Self {
        self.rejections
            .insert(identifier.to_string(), (status, body.to_string()));
        self
    }

    pub fn writes(&self) -> Vec<(Scope, String, WriteMode)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn written_identifiers(&self) -> Vec<String> {
        self.writes()
            .into_iter()
            .map(|(_, identifier, _)| identifier)
            .collect()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn record_write(&self, scope: &Scope, identifier: &str, mode: WriteMode) -> MigrateResult<()> {
        self.writes
            .lock()
            .unwrap()
            .push((scope.clone(), identifier.to_string(), mode));
        match self.rejections.get(identifier) {
            Some((status, body)) => Err(MigrationError::api_error(*status, body.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceAdapter for FakeAdapter {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn list(&self, scope: &Scope) -> MigrateResult<Vec<ResourceSummary>> {
        match self.listings.get(scope) {
            Some(Some(items)) => Ok(items
                .iter()
                .cloned()
                .filter_map(|item| ResourceSummary::from_item(item, "identifier"))
                .collect()),
            Some(None) => Err(MigrationError::api_error(503, "listing unavailable")),
            None => Ok(Vec::new()),
        }
    }

    async fn get(
        &self,
        summary: &ResourceSummary,
        _scope: &Scope,
    ) -> MigrateResult<Option<Map<String, Value>>> {
        self.fetched.lock().unwrap().push(summary.identifier.clone());
        match self
            .fetches
            .get(&summary.identifier)
            .unwrap_or(&FetchBehavior::Listing)
        {
            FetchBehavior::Listing => Ok(Some(summary.item.clone())),
            FetchBehavior::Found(value) => Ok(value.as_object().cloned()),
            FetchBehavior::Missing => Ok(None),
            FetchBehavior::Fails(status) => Err(MigrationError::api_error(*status, "fetch failed")),
        }
    }

    async fn create_inline(&self, instance: &ResourceInstance, scope: &Scope) -> MigrateResult<()> {
        self.record_write(scope, &instance.identifier, WriteMode::Inline)
    }

    async fn import_remote(
        &self,
        instance: &ResourceInstance,
        git_ref: &GitRef,
        scope: &Scope,
    ) -> MigrateResult<()> {
        self.record_write(
            scope,
            &instance.identifier,
            WriteMode::Remote {
                repo_name: git_ref.repo_name.clone(),
            },
        )
    }
}

/// Exporter remembering what it was given
#[derive(Default)]
pub struct RecordingExporter {
    exported: Mutex<Vec<(ResourceKind, Scope, String)>>,
}

impl RecordingExporter {
    pub fn exported(&self) -> Vec<(ResourceKind, Scope, String)> {
        self.exported.lock().unwrap().clone()
    }
}

impl ExportSink for RecordingExporter {
    fn export(
        &self,
        kind: ResourceKind,
        scope: &Scope,
        identifier: &str,
        _payload: &Value,
        _format: ExportFormat,
    ) -> MigrateResult<Option<PathBuf>> {
        self.exported
            .lock()
            .unwrap()
            .push((kind, scope.clone(), identifier.to_string()));
        Ok(None)
    }
}

/// Exporter whose every write fails
pub struct FailingExporter;

impl ExportSink for FailingExporter {
    fn export(
        &self,
        _kind: ResourceKind,
        _scope: &Scope,
        _identifier: &str,
        _payload: &Value,
        _format: ExportFormat,
    ) -> MigrateResult<Option<PathBuf>> {
        Err(MigrationError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "export directory is read-only",
        )))
    }
}

/// Runner over fake adapters with throttling disabled
pub fn runner_with(
    enumerator: ScopeEnumerator,
    adapters: Vec<Arc<dyn ResourceAdapter>>,
    exporter: Arc<dyn ExportSink>,
    dry_run: bool,
) -> MigrationRunner {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    MigrationRunner::new(
        enumerator,
        registry,
        exporter,
        RunOptions {
            dry_run,
            throttle: Throttle::disabled(),
        },
    )
}
