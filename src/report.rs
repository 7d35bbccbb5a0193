//! # Migration Report
//!
//! Per-phase outcome counters and the end-of-run summary table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::scheduler::ResourceKind;

/// Outcome counters for one phase.
///
/// Counters only ever grow; every processed item lands in exactly one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationResult {
    success: u64,
    failed: u64,
    skipped: u64,
}

impl MigrationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn success(&self) -> u64 {
        self.success
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn processed(&self) -> u64 {
        self.success + self.failed + self.skipped
    }

    fn absorb(&mut self, other: &MigrationResult) {
        self.success += other.success;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub kind: ResourceKind,
    pub result: MigrationResult,
}

/// Results of one run, phases in execution order
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    phases: Vec<PhaseReport>,
}

impl MigrationReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            phases: Vec::new(),
        }
    }

    /// Counters for `kind`, registering the phase on first use
    pub fn phase_mut(&mut self, kind: ResourceKind) -> &mut MigrationResult {
        let index = match self.phases.iter().position(|phase| phase.kind == kind) {
            Some(index) => index,
            None => {
                self.phases.push(PhaseReport {
                    kind,
                    result: MigrationResult::new(),
                });
                self.phases.len() - 1
            }
        };
        &mut self.phases[index].result
    }

    pub fn phase(&self, kind: ResourceKind) -> Option<&MigrationResult> {
        self.phases
            .iter()
            .find(|phase| phase.kind == kind)
            .map(|phase| &phase.result)
    }

    pub fn phases(&self) -> &[PhaseReport] {
        &self.phases
    }

    pub fn totals(&self) -> MigrationResult {
        let mut totals = MigrationResult::new();
        for phase in &self.phases {
            totals.absorb(&phase.result);
        }
        totals
    }

    pub fn has_failures(&self) -> bool {
        self.phases.iter().any(|phase| phase.result.failed > 0)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    fn success_label(&self) -> &'static str {
        if self.dry_run {
            "Found/Exported"
        } else {
            "Success"
        }
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.dry_run {
            "MIGRATION SUMMARY (DRY RUN)"
        } else {
            "MIGRATION SUMMARY"
        };
        let rule = "=".repeat(72);

        writeln!(f, "{rule}")?;
        writeln!(f, "{title}  run {}", self.run_id)?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<36}{:>16}{:>10}{:>10}",
            "Phase",
            self.success_label(),
            "Failed",
            "Skipped"
        )?;
        writeln!(f, "{}", "-".repeat(72))?;
        for phase in &self.phases {
            writeln!(
                f,
                "{:<36}{:>16}{:>10}{:>10}",
                phase.kind.as_str(),
                phase.result.success,
                phase.result.failed,
                phase.result.skipped
            )?;
        }
        writeln!(f, "{}", "-".repeat(72))?;
        let totals = self.totals();
        writeln!(
            f,
            "{:<36}{:>16}{:>10}{:>10}",
            "TOTAL", totals.success, totals.failed, totals.skipped
        )?;
        write!(f, "{rule}")
    }
}
