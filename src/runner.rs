//! # Migration Runner
//!
//! Drives the phases of a run. For every phase it enumerates the applicable
//! scopes, lists the phase's resources in each scope, and for every listed
//! item fetches, exports, classifies and writes it.
//!
//! Nothing that happens to a single item stops the run: fetch errors,
//! malformed source data and write failures are counted and logged, and
//! writes rejected because the resource already exists at the destination are
//! counted as skipped. The run always produces a full [`MigrationReport`].

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::adapters::{AdapterRegistry, ResourceAdapter};
use crate::classification::{classify_write_failure, WriteFailureKind};
use crate::client::{ApiSession, HttpTransport};
use crate::config::MigrationConfig;
use crate::error::{MigrateResult, MigrationError};
use crate::export::{ExportSink, FileExporter, NoopExporter};
use crate::logging::{log_phase_operation, log_resource_operation, ResourceOutcome};
use crate::report::{MigrationReport, MigrationResult};
use crate::resource::{ResourceInstance, ResourceSummary};
use crate::scheduler::{ItemOrder, Phase, ResourceKind, template_type_rank};
use crate::scopes::{HttpScopeSource, Scope, ScopeEnumerator, ScopeFilter};
use crate::utils::Throttle;

/// Lifecycle of a phase within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseState {
    NotStarted,
    Running,
    Completed,
}

impl PhaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    fn can_transition_to(self, next: PhaseState) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Running) | (Self::Running, Self::Completed)
        )
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Guarded per-phase state transitions
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    states: HashMap<ResourceKind, PhaseState>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: ResourceKind) -> PhaseState {
        self.states
            .get(&kind)
            .copied()
            .unwrap_or(PhaseState::NotStarted)
    }

    /// Move `kind` to `to`, rejecting anything but the forward steps
    pub fn transition(&mut self, kind: ResourceKind, to: PhaseState) -> MigrateResult<()> {
        let from = self.state(kind);
        if !from.can_transition_to(to) {
            return Err(MigrationError::InvalidPhaseTransition {
                phase: kind.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        debug!(phase = %kind, from = %from, to = %to, "Phase transition");
        self.states.insert(kind, to);
        Ok(())
    }
}

/// Run-wide behavior switches
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// List, fetch and export only; never call a mutating endpoint
    pub dry_run: bool,
    /// Pause after every write
    pub throttle: Throttle,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            throttle: Throttle::default(),
        }
    }
}

/// Executes phases against a source and (unless dry-running) a destination account
pub struct MigrationRunner {
    enumerator: ScopeEnumerator,
    adapters: AdapterRegistry,
    exporter: Arc<dyn ExportSink>,
    options: RunOptions,
    tracker: PhaseTracker,
}

impl fmt::Debug for MigrationRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRunner")
            .field("enumerator", &self.enumerator)
            .field("adapters", &self.adapters)
            .field("options", &self.options)
            .finish()
    }
}

impl MigrationRunner {
    pub fn new(
        enumerator: ScopeEnumerator,
        adapters: AdapterRegistry,
        exporter: Arc<dyn ExportSink>,
        options: RunOptions,
    ) -> Self {
        Self {
            enumerator,
            adapters,
            exporter,
            options,
            tracker: PhaseTracker::new(),
        }
    }

    /// Wire sessions, adapters and the exporter from configuration.
    ///
    /// No destination session is created for a dry run.
    pub fn from_config(config: &MigrationConfig) -> MigrateResult<Self> {
        config.validate()?;

        let run = &config.run;
        let throttle = Throttle::from_millis(run.delay_ms);

        let source: Arc<dyn HttpTransport> = Arc::new(ApiSession::new(&config.source)?);
        let destination: Option<Arc<dyn HttpTransport>> = if run.dry_run {
            None
        } else {
            Some(Arc::new(ApiSession::new(&config.destination)?))
        };

        let enumerator = ScopeEnumerator::new(Arc::new(HttpScopeSource::new(
            source.clone(),
            throttle,
            run.page_size,
        )))
        .with_filter(ScopeFilter {
            org_id: run.org_identifier.clone(),
            project_id: run.project_identifier.clone(),
        });

        let adapters = AdapterRegistry::rest(source, destination, throttle, run.page_size);

        let exporter: Arc<dyn ExportSink> = if run.export_enabled {
            Arc::new(FileExporter::new(&run.export_dir))
        } else {
            Arc::new(NoopExporter)
        };

        Ok(Self::new(
            enumerator,
            adapters,
            exporter,
            RunOptions {
                dry_run: run.dry_run,
                throttle,
            },
        ))
    }

    pub fn tracker(&self) -> &PhaseTracker {
        &self.tracker
    }

    /// Run `phases` in the given order and report every outcome
    pub async fn run(&mut self, phases: &[Phase]) -> MigrationReport {
        let mut report = MigrationReport::new(self.options.dry_run);
        self.tracker = PhaseTracker::new();

        info!(
            run_id = %report.run_id,
            phases = phases.len(),
            dry_run = self.options.dry_run,
            "Starting migration run"
        );

        for phase in phases {
            if let Err(e) = self.run_phase(phase, &mut report).await {
                error!(phase = %phase.kind, error = %e, "Phase could not run");
            }
        }

        report.finish();
        let totals = report.totals();
        info!(
            run_id = %report.run_id,
            success = totals.success(),
            failed = totals.failed(),
            skipped = totals.skipped(),
            "Migration run finished"
        );
        report
    }

    /// Run one phase across all of its scopes
    pub async fn run_phase(&mut self, phase: &Phase, report: &mut MigrationReport) -> MigrateResult<()> {
        self.tracker.transition(phase.kind, PhaseState::Running)?;
        let result = report.phase_mut(phase.kind);

        match self.adapters.get(phase.kind) {
            Some(adapter) => {
                let scopes = self.enumerator.scopes_for(phase.scope_levels).await;
                log_phase_operation(phase.kind, "started", Some(scopes.len()), None);
                for scope in &scopes {
                    self.process_scope(phase, adapter.as_ref(), scope, result).await;
                }
            }
            None => {
                warn!(phase = %phase.kind, "No adapter registered, phase does nothing");
            }
        }

        log_phase_operation(
            phase.kind,
            "completed",
            None,
            Some(&format!(
                "success={} failed={} skipped={}",
                result.success(),
                result.failed(),
                result.skipped()
            )),
        );
        self.tracker.transition(phase.kind, PhaseState::Completed)
    }

    async fn process_scope(
        &self,
        phase: &Phase,
        adapter: &dyn ResourceAdapter,
        scope: &Scope,
        result: &mut MigrationResult,
    ) {
        let mut summaries = match adapter.list(scope).await {
            Ok(summaries) => summaries,
            Err(e) => {
                error!(phase = %phase.kind, scope = %scope, error = %e, "Listing failed, nothing counted for scope");
                return;
            }
        };

        if phase.item_order == ItemOrder::TemplateSubType {
            // Stable: items of the same sub-type keep their listing order.
            summaries.sort_by_key(|summary| {
                template_type_rank(summary.field("templateEntityType").unwrap_or_default())
            });
        }

        debug!(phase = %phase.kind, scope = %scope, count = summaries.len(), "Processing scope");

        for summary in &summaries {
            self.process_item(phase.kind, adapter, scope, summary, result)
                .await;
        }
    }

    async fn process_item(
        &self,
        kind: ResourceKind,
        adapter: &dyn ResourceAdapter,
        scope: &Scope,
        summary: &ResourceSummary,
        result: &mut MigrationResult,
    ) {
        let identifier = summary.identifier.as_str();

        let raw_data = match adapter.get(summary, scope).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                let e = MigrationError::ResourceNotFound {
                    identifier: identifier.to_string(),
                    scope: scope.to_string(),
                };
                result.record_failure();
                log_resource_operation(kind, scope, identifier, ResourceOutcome::Failed, Some(&e.to_string()));
                return;
            }
            Err(e) => {
                result.record_failure();
                log_resource_operation(kind, scope, identifier, ResourceOutcome::Failed, Some(&e.to_string()));
                return;
            }
        };

        let payload = Value::Object(raw_data.clone());
        if let Err(e) = self
            .exporter
            .export(kind, scope, identifier, &payload, adapter.export_format())
        {
            warn!(phase = %kind, scope = %scope, identifier = %identifier, error = %e, "Export failed, continuing");
        }

        let instance = match ResourceInstance::classify(summary, raw_data) {
            Ok(instance) => instance,
            Err(e) => {
                result.record_failure();
                log_resource_operation(kind, scope, identifier, ResourceOutcome::Failed, Some(&e.to_string()));
                return;
            }
        };

        if self.options.dry_run {
            result.record_success();
            log_resource_operation(
                kind,
                scope,
                identifier,
                ResourceOutcome::Exported,
                Some(&format!("storage mode {}", instance.storage_mode)),
            );
            return;
        }

        let written = match &instance.git_ref {
            Some(git_ref) => adapter.import_remote(&instance, git_ref, scope).await,
            None => adapter.create_inline(&instance, scope).await,
        };
        self.options.throttle.pause().await;

        match written {
            Ok(()) => {
                result.record_success();
                log_resource_operation(kind, scope, identifier, ResourceOutcome::Migrated, None);
            }
            Err(e) => match e.api_response() {
                Some((status, body)) => match classify_write_failure(status, body) {
                    WriteFailureKind::AlreadyExists => {
                        result.record_skip();
                        log_resource_operation(
                            kind,
                            scope,
                            identifier,
                            ResourceOutcome::Skipped,
                            Some("already exists at destination"),
                        );
                    }
                    WriteFailureKind::Failed => {
                        result.record_failure();
                        log_resource_operation(
                            kind,
                            scope,
                            identifier,
                            ResourceOutcome::Failed,
                            Some(&format!("status {status}: {body}")),
                        );
                    }
                },
                None => {
                    result.record_failure();
                    log_resource_operation(kind, scope, identifier, ResourceOutcome::Failed, Some(&e.to_string()));
                }
            },
        }
    }
}
