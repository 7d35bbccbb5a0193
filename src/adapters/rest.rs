use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::catalog::{AdapterDescriptor, PayloadShape};
use super::ResourceAdapter;
use crate::classification::GitRef;
use crate::client::{ApiRequest, HttpTransport};
use crate::error::{MigrateResult, MigrationError};
use crate::export::ExportFormat;
use crate::pagination::fetch_all;
use crate::resource::{ResourceInstance, ResourceSummary};
use crate::scheduler::ResourceKind;
use crate::scopes::Scope;
use crate::utils::json::{str_field, strip_nulls, walk_path};
use crate::utils::Throttle;

/// Table-driven [`ResourceAdapter`] over the platform REST API
pub struct RestResourceAdapter {
    descriptor: AdapterDescriptor,
    source: Arc<dyn HttpTransport>,
    destination: Option<Arc<dyn HttpTransport>>,
    throttle: Throttle,
}

impl std::fmt::Debug for RestResourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestResourceAdapter")
            .field("kind", &self.descriptor.kind)
            .field("has_destination", &self.destination.is_some())
            .finish()
    }
}

impl RestResourceAdapter {
    pub fn new(
        descriptor: AdapterDescriptor,
        source: Arc<dyn HttpTransport>,
        destination: Option<Arc<dyn HttpTransport>>,
        throttle: Throttle,
    ) -> Self {
        Self {
            descriptor,
            source,
            destination,
            throttle,
        }
    }

    pub fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn destination(&self) -> MigrateResult<&dyn HttpTransport> {
        self.destination
            .as_deref()
            .ok_or(MigrationError::MissingDestination)
    }

    async fn list_items(&self, scope_params: &[(String, String)]) -> Vec<Value> {
        let listing = &self.descriptor.listing;
        let source = self.source.as_ref();

        let Some(parent) = &listing.parent else {
            return fetch_all(source, &listing.pagination, scope_params, &self.throttle).await;
        };

        let mut items = Vec::new();
        for parent_item in fetch_all(source, &parent.pagination, scope_params, &self.throttle).await {
            let Some(parent_id) = parent_item
                .get(parent.identifier_field)
                .and_then(Value::as_str)
                .map(str::to_string)
            else {
                continue;
            };

            let mut params = scope_params.to_vec();
            params.push((parent.param.to_string(), parent_id.clone()));

            for mut child in fetch_all(source, &listing.pagination, &params, &self.throttle).await {
                if let Value::Object(map) = &mut child {
                    map.entry(parent.param)
                        .or_insert_with(|| Value::String(parent_id.clone()));
                }
                items.push(child);
            }
        }
        items
    }

    /// Build the inline create request for a fetched resource
    pub fn create_request(&self, instance: &ResourceInstance, scope: &Scope) -> MigrateResult<ApiRequest> {
        let create = &self.descriptor.create;
        let request = ApiRequest::new(create.method, expand_path(create.path, &instance.identifier))
            .query_pairs(scope.query_params())
            .query_pairs(pairs_from(&instance.raw_data, create.extra_query));

        let entity = || strip_nulls(Value::Object(instance.raw_data.clone()));
        let yaml = || {
            instance
                .yaml()
                .map(str::to_string)
                .ok_or_else(|| MigrationError::malformed_resource(&instance.identifier, "no YAML definition"))
        };

        let body = match create.shape {
            PayloadShape::Entity => entity(),
            PayloadShape::Wrapped(key) => json!({ key: entity() }),
            PayloadShape::YamlField(field) => json!({ field: yaml()? }),
            PayloadShape::SerializedYaml { wrapper, field } => {
                let document = match wrapper {
                    Some(key) => json!({ key: entity() }),
                    None => entity(),
                };
                json!({ field: serde_yaml::to_string(&document)? })
            }
            PayloadShape::RawYaml => return Ok(request.yaml(yaml()?)),
            PayloadShape::SettingsUpdate => json!([{
                "identifier": instance.identifier,
                "value": instance.raw_data.get("value").cloned().unwrap_or(Value::Null),
                "allowOverrides": instance.raw_data.get("allowOverrides").cloned().unwrap_or(Value::Bool(true)),
                "updateType": "UPDATE",
            }]),
            PayloadShape::UserInvite => json!({
                "emails": [instance.identifier],
                "userGroups": [],
                "roleBindings": [],
            }),
        };

        Ok(request.json(with_flags(body, create.body_flags)))
    }

    /// Build the Git import request, or `None` when the type has no import endpoint
    pub fn import_request(
        &self,
        instance: &ResourceInstance,
        git_ref: &GitRef,
        scope: &Scope,
    ) -> Option<ApiRequest> {
        let import = self.descriptor.import?;

        let mut request = ApiRequest::post(expand_path(import.path, &instance.identifier))
            .query_pairs(scope.query_params());
        if let Some(param) = import.identifier_param {
            request = request.query(param, instance.identifier.clone());
        }
        request = request.query_pairs(pairs_from(&instance.raw_data, import.extra_query));
        if let Some(connector_ref) = &git_ref.connector_ref {
            request = request.query("connectorRef", connector_ref.clone());
        }
        request = request
            .query("repoName", git_ref.repo_name.clone())
            .query("branch", git_ref.branch.clone())
            .query("filePath", git_ref.file_path.clone())
            .query("isForceImport", "false");

        let mut body = Map::new();
        if let Some(name_field) = import.name_field {
            body.insert(name_field.to_string(), Value::String(instance.display_name.clone()));
        }
        for (key, value) in pairs_from(&instance.raw_data, import.body_fields) {
            body.insert(key, Value::String(value));
        }

        Some(request.json(Value::Object(body)))
    }

    async fn write(&self, request: ApiRequest) -> MigrateResult<()> {
        let destination = self.destination()?;
        destination.send(request).await?.error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl ResourceAdapter for RestResourceAdapter {
    fn kind(&self) -> ResourceKind {
        self.descriptor.kind
    }

    async fn list(&self, scope: &Scope) -> MigrateResult<Vec<ResourceSummary>> {
        let listing = &self.descriptor.listing;
        let items = self.list_items(&scope.query_params()).await;
        let listed = items.len();

        let mut unidentified = 0usize;
        let summaries: Vec<_> = items
            .into_iter()
            .filter_map(|item| {
                let summary = ResourceSummary::from_item(item, listing.identifier_field);
                if summary.is_none() {
                    unidentified += 1;
                }
                summary
            })
            .filter(|summary| listing.filter.matches(&summary.identifier, &summary.item))
            .collect();

        if unidentified > 0 {
            warn!(
                kind = %self.descriptor.kind,
                scope = %scope,
                field = listing.identifier_field,
                dropped = unidentified,
                "Dropping listing items without an identifier"
            );
        }

        debug!(
            kind = %self.descriptor.kind,
            scope = %scope,
            listed,
            kept = summaries.len(),
            "Listed resources"
        );
        Ok(summaries)
    }

    async fn get(
        &self,
        summary: &ResourceSummary,
        scope: &Scope,
    ) -> MigrateResult<Option<Map<String, Value>>> {
        let Some(get) = self.descriptor.get else {
            return Ok(Some(summary.item.clone()));
        };

        let request = ApiRequest::get(expand_path(get.path, &summary.identifier))
            .query_pairs(scope.query_params())
            .query_pairs(pairs_from(&summary.item, get.extra_query));

        let response = self.source.send(request).await?.error_for_status()?;
        let json = response.json()?;

        let Some(Value::Object(mut data)) = walk_path(&json, get.unwrap_path).cloned() else {
            return Ok(None);
        };

        if let Some(field) = get.yaml_field {
            if !data.contains_key("yaml") {
                if let Some(yaml) = data.get(field).cloned() {
                    data.insert("yaml".to_string(), yaml);
                }
            }
        }

        // Listing context such as a parent identifier is needed again on write.
        for (_, field) in get.extra_query {
            if !data.contains_key(*field) {
                if let Some(value) = summary.item.get(*field) {
                    data.insert((*field).to_string(), value.clone());
                }
            }
        }

        Ok(Some(data))
    }

    async fn create_inline(&self, instance: &ResourceInstance, scope: &Scope) -> MigrateResult<()> {
        let request = self.create_request(instance, scope)?;
        self.write(request).await
    }

    async fn import_remote(
        &self,
        instance: &ResourceInstance,
        git_ref: &GitRef,
        scope: &Scope,
    ) -> MigrateResult<()> {
        match self.import_request(instance, git_ref, scope) {
            Some(request) => self.write(request).await,
            None => {
                debug!(
                    kind = %self.descriptor.kind,
                    identifier = %instance.identifier,
                    "No import endpoint for resource type, creating inline"
                );
                self.create_inline(instance, scope).await
            }
        }
    }

    fn export_format(&self) -> ExportFormat {
        self.descriptor.export_format
    }
}

fn expand_path(template: &str, identifier: &str) -> String {
    template.replace("{id}", identifier)
}

/// `(key, value)` pairs for the string fields of `source` named in `mapping`;
/// missing fields are left out
fn pairs_from(
    source: &Map<String, Value>,
    mapping: &[(&'static str, &'static str)],
) -> Vec<(String, String)> {
    mapping
        .iter()
        .filter_map(|(key, field)| {
            str_field(source, field).map(|value| ((*key).to_string(), value.to_string()))
        })
        .collect()
}

fn with_flags(body: Value, flags: &[(&'static str, bool)]) -> Value {
    match body {
        Value::Object(mut map) => {
            for (key, flag) in flags {
                map.insert((*key).to_string(), Value::Bool(*flag));
            }
            Value::Object(map)
        }
        other => other,
    }
}
