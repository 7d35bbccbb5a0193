//! # Structured Logging Module
//!
//! Console logging for migration runs. Every per-resource outcome is emitted
//! as one structured event so a run can be audited from its log alone.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::env;
use crate::scheduler::ResourceKind;
use crate::scopes::Scope;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Output format of the console log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var(env::LOG_FORMAT).as_deref() {
            Ok("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Default filter directive for a `-v` count
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize console logging.
///
/// `RUST_LOG` takes precedence over `verbosity`. Safe to call more than once;
/// an already installed global subscriber is left in place.
pub fn init_logging(verbosity: u8) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));
        let format = LogFormat::from_env();

        let layer = match format {
            LogFormat::Pretty => fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .json()
                .with_filter(filter)
                .boxed(),
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::debug!(verbosity, format = ?format, "Logging initialized");
    });
}

/// Outcome of one resource in a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOutcome {
    Migrated,
    Exported,
    Skipped,
    Failed,
}

impl ResourceOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Migrated => "migrated",
            Self::Exported => "exported",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Log structured data for one resource's outcome
pub fn log_resource_operation(
    kind: ResourceKind,
    scope: &Scope,
    identifier: &str,
    outcome: ResourceOutcome,
    details: Option<&str>,
) {
    match outcome {
        ResourceOutcome::Failed => tracing::warn!(
            phase = %kind,
            scope = %scope,
            identifier = %identifier,
            outcome = outcome.as_str(),
            details = details,
            timestamp = %Utc::now().to_rfc3339(),
            "📦 RESOURCE_OPERATION"
        ),
        _ => tracing::info!(
            phase = %kind,
            scope = %scope,
            identifier = %identifier,
            outcome = outcome.as_str(),
            details = details,
            timestamp = %Utc::now().to_rfc3339(),
            "📦 RESOURCE_OPERATION"
        ),
    }
}

/// Log structured data for phase lifecycle events
pub fn log_phase_operation(kind: ResourceKind, status: &str, scopes: Option<usize>, details: Option<&str>) {
    tracing::info!(
        phase = %kind,
        status = %status,
        scopes = scopes,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🔧 PHASE_OPERATION"
    );
}
