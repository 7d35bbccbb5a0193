//! # Resource Adapters
//!
//! The per-resource-type HTTP glue the runner drives. Every resource type
//! exposes the same four operations through [`ResourceAdapter`]: list the
//! items of a scope, fetch one item's full definition, create it inline at
//! the destination, or import it from its Git location.
//!
//! Resource types differ only in endpoints, payload shapes and pagination
//! conventions, so a single table-driven implementation
//! ([`RestResourceAdapter`]) serves all of them, parameterized by the
//! [`AdapterDescriptor`]s in [`catalog`].

pub mod catalog;
mod rest;

pub use catalog::{
    descriptor_for, AdapterDescriptor, CreateSpec, GetSpec, ImportSpec, ItemFilter, ListingSpec,
    ParentListing, PayloadShape,
};
pub use rest::RestResourceAdapter;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::classification::GitRef;
use crate::client::HttpTransport;
use crate::error::MigrateResult;
use crate::export::ExportFormat;
use crate::resource::{ResourceInstance, ResourceSummary};
use crate::scheduler::{ResourceKind, PHASES};
use crate::scopes::Scope;
use crate::utils::Throttle;

/// Uniform access to one resource type on the source and destination accounts
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Every item of this type in `scope`, in listing order
    async fn list(&self, scope: &Scope) -> MigrateResult<Vec<ResourceSummary>>;

    /// Full definition of one listed item; `None` when the source has nothing usable
    async fn get(
        &self,
        summary: &ResourceSummary,
        scope: &Scope,
    ) -> MigrateResult<Option<Map<String, Value>>>;

    /// Create the resource at the destination from its fetched definition
    async fn create_inline(&self, instance: &ResourceInstance, scope: &Scope) -> MigrateResult<()>;

    /// Register the resource at the destination from its Git location
    async fn import_remote(
        &self,
        instance: &ResourceInstance,
        git_ref: &GitRef,
        scope: &Scope,
    ) -> MigrateResult<()>;

    fn export_format(&self) -> ExportFormat {
        ExportFormat::Json
    }
}

/// Adapters keyed by resource kind
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<ResourceKind, Arc<dyn ResourceAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.adapters.keys().collect();
        kinds.sort();
        f.debug_struct("AdapterRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A REST adapter for every phase.
    ///
    /// `destination` is `None` for dry runs; writes then fail with
    /// [`MigrationError::MissingDestination`](crate::error::MigrationError::MissingDestination).
    pub fn rest(
        source: Arc<dyn HttpTransport>,
        destination: Option<Arc<dyn HttpTransport>>,
        throttle: Throttle,
        page_size: usize,
    ) -> Self {
        let mut registry = Self::new();
        for phase in PHASES {
            registry.register(Arc::new(RestResourceAdapter::new(
                descriptor_for(phase.kind, page_size),
                source.clone(),
                destination.clone(),
                throttle,
            )));
        }
        registry
    }

    /// Add or replace the adapter for its kind
    pub fn register(&mut self, adapter: Arc<dyn ResourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn get(&self, kind: ResourceKind) -> Option<Arc<dyn ResourceAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
