#![allow(clippy::doc_markdown)] // Allow technical terms like GitOps, YAML in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Harness Migrate
//!
//! Account-to-account configuration migration for the Harness platform,
//! driven entirely through its public REST API.
//!
//! ## Overview
//!
//! A run walks a fixed, dependency-respecting sequence of resource-type
//! phases (organizations, projects, secret managers, secrets, connectors,
//! templates, services, environments, pipelines, policies, access control
//! and more). For each phase it discovers the scopes of the source account,
//! lists the phase's resources in every scope, fetches each one, exports it
//! to a local audit directory and recreates it at the destination: inline
//! resources are created from their definition, Git-stored resources are
//! imported from their repository location.
//!
//! Runs are safe to repeat. Writes the destination rejects because the
//! resource already exists are counted as skipped rather than failed.
//!
//! ## Module Organization
//!
//! - [`scopes`] - Scope values and source-account scope discovery
//! - [`pagination`] - Generic driver for the platform's paging conventions
//! - [`classification`] - Storage-mode and "already exists" classifiers
//! - [`scheduler`] - The fixed phase order and phase selection
//! - [`runner`] - Phase execution and per-item outcome accounting
//! - [`adapters`] - Per-resource-type REST surface
//! - [`client`] - HTTP transport and the authenticated API session
//! - [`export`] - Local audit export of fetched payloads
//! - [`report`] - Outcome counters and the summary table
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use harness_migrate::config::MigrationConfig;
//! use harness_migrate::runner::MigrationRunner;
//! use harness_migrate::scheduler::select_phases;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MigrationConfig::load()?;
//! let phases = select_phases(&config.run.resource_types, &config.run.exclude_resource_types)?;
//!
//! let mut runner = MigrationRunner::from_config(&config)?;
//! let report = runner.run(&phases).await;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod classification;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod logging;
pub mod pagination;
pub mod report;
pub mod resource;
pub mod runner;
pub mod scheduler;
pub mod scopes;
pub mod utils;

pub use adapters::{AdapterRegistry, ResourceAdapter, RestResourceAdapter};
pub use classification::{GitRef, StorageMode, WriteFailureKind};
pub use client::{ApiRequest, ApiResponse, ApiSession, HttpTransport};
pub use config::MigrationConfig;
pub use error::{MigrateResult, MigrationError};
pub use export::{ExportFormat, ExportSink, FileExporter, NoopExporter};
pub use pagination::{fetch_all, PaginationSpec};
pub use report::{MigrationReport, MigrationResult};
pub use resource::{ResourceInstance, ResourceSummary};
pub use runner::{MigrationRunner, PhaseState, PhaseTracker, RunOptions};
pub use scheduler::{select_phases, Phase, ResourceKind, PHASES};
pub use scopes::{Scope, ScopeEnumerator, ScopeLevel};
