//! # Migration Scheduler
//!
//! The fixed, hand-curated execution order of resource-type phases.
//!
//! The order reflects real reference dependencies between resource types: a
//! connector that authenticates with a secret must be created after that
//! secret, a pipeline after the templates, services and environments it
//! references, and so on. Each [`Phase`] names its predecessors so the order
//! can be checked by [`validate_phase_order`]; it is never recomputed at run
//! time. Reordering [`PHASES`] requires re-verifying the dependency graph.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{MigrateResult, MigrationError};
use crate::scopes::ScopeLevel;

/// Every resource type the engine migrates, one per phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Organizations,
    Projects,
    SecretManagerTemplates,
    CustomSecretManagerConnectors,
    HarnessSecretManagerSecrets,
    SecretManagerConnectors,
    Secrets,
    Connectors,
    DeploymentTemplates,
    Environments,
    Infrastructures,
    Services,
    Overrides,
    MonitoredServices,
    UserJourneys,
    Templates,
    Pipelines,
    InputSets,
    Triggers,
    Webhooks,
    Policies,
    PolicySets,
    Roles,
    ResourceGroups,
    Settings,
    IpAllowlists,
    Users,
    ServiceAccounts,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Projects => "projects",
            Self::SecretManagerTemplates => "secret_manager_templates",
            Self::CustomSecretManagerConnectors => "custom_secret_manager_connectors",
            Self::HarnessSecretManagerSecrets => "harness_secret_manager_secrets",
            Self::SecretManagerConnectors => "secret_manager_connectors",
            Self::Secrets => "secrets",
            Self::Connectors => "connectors",
            Self::DeploymentTemplates => "deployment_templates",
            Self::Environments => "environments",
            Self::Infrastructures => "infrastructures",
            Self::Services => "services",
            Self::Overrides => "overrides",
            Self::MonitoredServices => "monitored_services",
            Self::UserJourneys => "user_journeys",
            Self::Templates => "templates",
            Self::Pipelines => "pipelines",
            Self::InputSets => "input_sets",
            Self::Triggers => "triggers",
            Self::Webhooks => "webhooks",
            Self::Policies => "policies",
            Self::PolicySets => "policy_sets",
            Self::Roles => "roles",
            Self::ResourceGroups => "resource_groups",
            Self::Settings => "settings",
            Self::IpAllowlists => "ip_allowlists",
            Self::Users => "users",
            Self::ServiceAccounts => "service_accounts",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        PHASES
            .iter()
            .map(|phase| phase.kind)
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| MigrationError::UnknownResourceType(s.to_string()))
    }
}

/// Order in which a phase processes the items of one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrder {
    /// As returned by the listing
    Listing,
    /// Stable-sorted by template sub-type, see [`template_type_rank`]
    TemplateSubType,
}

/// One resource type's migration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub kind: ResourceKind,
    pub predecessors: &'static [ResourceKind],
    pub scope_levels: &'static [ScopeLevel],
    pub item_order: ItemOrder,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn applies_to(&self, level: ScopeLevel) -> bool {
        self.scope_levels.contains(&level)
    }
}

use ResourceKind as K;
use ScopeLevel::{Account, Organization, Project};

const ACCOUNT_ONLY: &[ScopeLevel] = &[Account];
const ORGANIZATION_ONLY: &[ScopeLevel] = &[Organization];
const PROJECT_ONLY: &[ScopeLevel] = &[Project];
const ALL_LEVELS: &[ScopeLevel] = &[Account, Organization, Project];

const fn phase(
    kind: ResourceKind,
    predecessors: &'static [ResourceKind],
    scope_levels: &'static [ScopeLevel],
) -> Phase {
    Phase {
        kind,
        predecessors,
        scope_levels,
        item_order: ItemOrder::Listing,
    }
}

/// The fixed execution order
pub const PHASES: &[Phase] = &[
    phase(K::Organizations, &[], ACCOUNT_ONLY),
    phase(K::Projects, &[K::Organizations], ORGANIZATION_ONLY),
    phase(K::SecretManagerTemplates, &[K::Projects], ALL_LEVELS),
    phase(
        K::CustomSecretManagerConnectors,
        &[K::SecretManagerTemplates],
        ALL_LEVELS,
    ),
    phase(K::HarnessSecretManagerSecrets, &[K::Projects], ALL_LEVELS),
    phase(
        K::SecretManagerConnectors,
        &[K::HarnessSecretManagerSecrets],
        ALL_LEVELS,
    ),
    phase(
        K::Secrets,
        &[K::CustomSecretManagerConnectors, K::SecretManagerConnectors],
        ALL_LEVELS,
    ),
    phase(K::Connectors, &[K::Secrets], ALL_LEVELS),
    phase(K::DeploymentTemplates, &[K::Connectors], ALL_LEVELS),
    phase(K::Environments, &[K::Connectors], ALL_LEVELS),
    phase(
        K::Infrastructures,
        &[K::Environments, K::DeploymentTemplates],
        ALL_LEVELS,
    ),
    phase(K::Services, &[K::Connectors, K::DeploymentTemplates], ALL_LEVELS),
    phase(
        K::Overrides,
        &[K::Services, K::Environments, K::Infrastructures],
        ALL_LEVELS,
    ),
    phase(
        K::MonitoredServices,
        &[K::Services, K::Environments, K::Connectors],
        PROJECT_ONLY,
    ),
    phase(K::UserJourneys, &[K::MonitoredServices], PROJECT_ONLY),
    Phase {
        kind: K::Templates,
        predecessors: &[K::Connectors, K::DeploymentTemplates, K::MonitoredServices],
        scope_levels: ALL_LEVELS,
        item_order: ItemOrder::TemplateSubType,
    },
    phase(
        K::Pipelines,
        &[K::Templates, K::Services, K::Environments, K::Infrastructures],
        PROJECT_ONLY,
    ),
    phase(K::InputSets, &[K::Pipelines], PROJECT_ONLY),
    phase(K::Triggers, &[K::Pipelines, K::InputSets], PROJECT_ONLY),
    phase(K::Webhooks, &[K::Connectors], ALL_LEVELS),
    phase(K::Policies, &[K::Projects], ALL_LEVELS),
    phase(K::PolicySets, &[K::Policies], ALL_LEVELS),
    phase(K::Roles, &[K::Projects], ALL_LEVELS),
    phase(K::ResourceGroups, &[K::Projects], ALL_LEVELS),
    phase(K::Settings, &[K::Projects], ALL_LEVELS),
    phase(K::IpAllowlists, &[K::Organizations], ACCOUNT_ONLY),
    phase(K::Users, &[K::Roles, K::ResourceGroups], ALL_LEVELS),
    phase(K::ServiceAccounts, &[K::Roles, K::ResourceGroups], ALL_LEVELS),
];

/// Look up the phase for a resource kind
pub fn phase_for(kind: ResourceKind) -> Option<&'static Phase> {
    PHASES.iter().find(|phase| phase.kind == kind)
}

/// Check that every phase's predecessors appear strictly earlier in `phases`
pub fn validate_order(phases: &[Phase]) -> MigrateResult<()> {
    let mut seen: HashSet<ResourceKind> = HashSet::with_capacity(phases.len());
    for phase in phases {
        if let Some(predecessor) = phase.predecessors.iter().find(|p| !seen.contains(p)) {
            return Err(MigrationError::PhaseOrderViolation {
                phase: phase.name().to_string(),
                predecessor: predecessor.to_string(),
            });
        }
        seen.insert(phase.kind);
    }
    Ok(())
}

/// Check the topological invariant of [`PHASES`]
pub fn validate_phase_order() -> MigrateResult<()> {
    validate_order(PHASES)
}

/// Phases to run, in fixed order, after applying include and exclude lists.
///
/// An empty include list means every phase. Exclusion is applied after
/// inclusion. Unknown names are rejected.
pub fn select_phases(include: &[String], exclude: &[String]) -> MigrateResult<Vec<Phase>> {
    let parse = |names: &[String]| -> MigrateResult<HashSet<ResourceKind>> {
        names.iter().map(|name| name.parse()).collect()
    };
    let included = parse(include)?;
    let excluded = parse(exclude)?;

    Ok(PHASES
        .iter()
        .filter(|phase| included.is_empty() || included.contains(&phase.kind))
        .filter(|phase| !excluded.contains(&phase.kind))
        .copied()
        .collect())
}

/// Rank of a template sub-type within the templates phase.
///
/// Step and monitored-service templates first, then step groups, stages,
/// pipelines and everything else, so that templates referencing other
/// templates are created after them.
pub fn template_type_rank(template_entity_type: &str) -> u8 {
    match template_entity_type.to_lowercase().replace(['_', '-'], "").as_str() {
        "step" | "monitoredservice" => 0,
        "stepgroup" => 1,
        "stage" => 2,
        "pipeline" => 3,
        _ => 4,
    }
}
