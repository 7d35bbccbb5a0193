//! # Adapter Catalog
//!
//! Declarative description of every resource type's REST surface. The
//! [`RestResourceAdapter`](super::RestResourceAdapter) interprets these
//! descriptors; adding a resource type is a matter of adding a table entry.
//!
//! Several phases share one endpoint family and split it with an
//! [`ItemFilter`]: connectors, secrets and templates each appear in more than
//! one phase so that secret managers exist before the secrets they store, and
//! so on.

use serde_json::{json, Map, Value};

use crate::client::HttpMethod;
use crate::export::ExportFormat;
use crate::pagination::PaginationSpec;
use crate::scheduler::ResourceKind;
use crate::utils::json::walk_path;

/// Connector types that act as secret managers, other than custom ones
const SECRET_MANAGER_CONNECTOR_TYPES: &[&str] = &[
    "Vault",
    "AwsSecretManager",
    "AzureKeyVault",
    "GcpSecretManager",
    "GcpKms",
    "AwsKms",
];

const CUSTOM_SECRET_MANAGER_CONNECTOR_TYPES: &[&str] = &["CustomSecretManager"];

const ALL_SECRET_MANAGER_CONNECTOR_TYPES: &[&str] = &[
    "CustomSecretManager",
    "Vault",
    "AwsSecretManager",
    "AzureKeyVault",
    "GcpSecretManager",
    "GcpKms",
    "AwsKms",
];

/// Identifiers of the built-in secret manager at each scope level
const HARNESS_SECRET_MANAGER_IDS: &[&str] = &[
    "harnessSecretManager",
    "account.harnessSecretManager",
    "org.harnessSecretManager",
];

const SECRET_MANAGER_TEMPLATE_TYPES: &[&str] = &["SecretManager"];
const DEPLOYMENT_TEMPLATE_TYPES: &[&str] = &["CustomDeployment", "ArtifactSource"];
const EARLY_TEMPLATE_TYPES: &[&str] = &["SecretManager", "CustomDeployment", "ArtifactSource"];

/// Which listed items belong to a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    All,
    /// Keep items whose string field at `path` is one of `values`
    FieldIn {
        path: &'static str,
        values: &'static [&'static str],
    },
    /// Keep items whose string field at `path` is absent or not one of `values`
    FieldNotIn {
        path: &'static str,
        values: &'static [&'static str],
    },
    /// Drop platform-managed entries, whose identifiers start with `_`
    SkipBuiltIn,
}

impl ItemFilter {
    pub fn matches(&self, identifier: &str, item: &Map<String, Value>) -> bool {
        match self {
            Self::All => true,
            Self::FieldIn { path, values } => {
                field_at(item, path).is_some_and(|value| values.contains(&value))
            }
            Self::FieldNotIn { path, values } => {
                !field_at(item, path).is_some_and(|value| values.contains(&value))
            }
            Self::SkipBuiltIn => !identifier.starts_with('_'),
        }
    }
}

fn field_at<'a>(item: &'a Map<String, Value>, path: &str) -> Option<&'a str> {
    let (head, rest) = path.split_once('.').unwrap_or((path, ""));
    item.get(head)
        .and_then(|value| walk_path(value, rest))
        .and_then(Value::as_str)
}

/// Listing whose items are the parents of the resources being listed, e.g.
/// the pipelines that own input sets
#[derive(Debug, Clone, PartialEq)]
pub struct ParentListing {
    pub pagination: PaginationSpec,
    pub identifier_field: &'static str,
    /// Query parameter carrying the parent identifier on the child listing
    pub param: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingSpec {
    pub pagination: PaginationSpec,
    pub identifier_field: &'static str,
    pub filter: ItemFilter,
    pub parent: Option<ParentListing>,
}

impl ListingSpec {
    fn new(pagination: PaginationSpec) -> Self {
        Self {
            pagination,
            identifier_field: "identifier",
            filter: ItemFilter::All,
            parent: None,
        }
    }

    fn filtered(mut self, filter: ItemFilter) -> Self {
        self.filter = filter;
        self
    }

    fn identified_by(mut self, field: &'static str) -> Self {
        self.identifier_field = field;
        self
    }

    fn under(mut self, parent: ParentListing) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Single-item fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetSpec {
    /// Endpoint with an `{id}` placeholder
    pub path: &'static str,
    /// `(query parameter, listing item field)` pairs
    pub extra_query: &'static [(&'static str, &'static str)],
    /// Where the entity sits in the response
    pub unwrap_path: &'static str,
    /// Field holding the YAML document when it is not named `yaml`
    pub yaml_field: Option<&'static str>,
}

/// Body of an inline create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// The fetched entity itself
    Entity,
    /// `{key: entity}`
    Wrapped(&'static str),
    /// `{name: <entity yaml>}`
    YamlField(&'static str),
    /// The entity rendered to YAML (optionally under a wrapper key) and sent as `{field: yaml}`
    SerializedYaml {
        wrapper: Option<&'static str>,
        field: &'static str,
    },
    /// The entity's YAML document as the raw request body
    RawYaml,
    /// Settings update list
    SettingsUpdate,
    /// User invitation by email
    UserInvite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateSpec {
    pub method: HttpMethod,
    pub path: &'static str,
    pub shape: PayloadShape,
    /// `(query parameter, entity field)` pairs
    pub extra_query: &'static [(&'static str, &'static str)],
    pub body_flags: &'static [(&'static str, bool)],
}

impl CreateSpec {
    fn post(path: &'static str, shape: PayloadShape) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
            shape,
            extra_query: &[],
            body_flags: &[],
        }
    }

    fn with_query(mut self, extra_query: &'static [(&'static str, &'static str)]) -> Self {
        self.extra_query = extra_query;
        self
    }
}

/// Registration of a Git-stored resource at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSpec {
    /// Endpoint, optionally with an `{id}` placeholder
    pub path: &'static str,
    /// Query parameter carrying the identifier, when not in the path
    pub identifier_param: Option<&'static str>,
    /// `(query parameter, entity field)` pairs
    pub extra_query: &'static [(&'static str, &'static str)],
    /// Body key for the display name
    pub name_field: Option<&'static str>,
    /// `(body key, entity field)` pairs
    pub body_fields: &'static [(&'static str, &'static str)],
}

impl ImportSpec {
    fn new(path: &'static str) -> Self {
        Self {
            path,
            identifier_param: None,
            extra_query: &[],
            name_field: None,
            body_fields: &[],
        }
    }

    fn identified_by(mut self, param: &'static str) -> Self {
        self.identifier_param = Some(param);
        self
    }

    fn named(mut self, field: &'static str) -> Self {
        self.name_field = Some(field);
        self
    }

    fn with_query(mut self, extra_query: &'static [(&'static str, &'static str)]) -> Self {
        self.extra_query = extra_query;
        self
    }

    fn with_body(mut self, body_fields: &'static [(&'static str, &'static str)]) -> Self {
        self.body_fields = body_fields;
        self
    }
}

/// Complete REST surface of one resource type
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterDescriptor {
    pub kind: ResourceKind,
    pub listing: ListingSpec,
    /// `None` when the listing item already is the full definition
    pub get: Option<GetSpec>,
    pub create: CreateSpec,
    /// `None` when the type has no Git import; Remote items are then created inline
    pub import: Option<ImportSpec>,
    pub export_format: ExportFormat,
}

fn templates_listing(filter: ItemFilter) -> ListingSpec {
    ListingSpec::new(
        PaginationSpec::page_size_query("/template/api/templates/list")
            .with_method(HttpMethod::Post)
            .with_query("templateListType", "LastUpdated")
            .with_body(json!({"filterType": "Template"})),
    )
    .filtered(filter)
}

fn connectors_listing(filter: ItemFilter) -> ListingSpec {
    ListingSpec::new(
        PaginationSpec::page_index_query("/ng/api/connectors").with_unwrap_key("connector"),
    )
    .filtered(filter)
}

fn secrets_listing(filter: ItemFilter) -> ListingSpec {
    ListingSpec::new(
        PaginationSpec::page_index_query("/ng/api/v2/secrets/list/secrets")
            .with_method(HttpMethod::Post)
            .with_body(json!({"filterType": "Secret"}))
            .with_unwrap_key("secret"),
    )
    .filtered(filter)
}

fn pipelines_pagination() -> PaginationSpec {
    PaginationSpec::body(
        "/pipeline/api/pipelines/list",
        json!({"filterType": "PipelineSetup"}),
    )
}

fn template(kind: ResourceKind, filter: ItemFilter) -> AdapterDescriptor {
    AdapterDescriptor {
        kind,
        listing: templates_listing(filter),
        get: Some(GetSpec {
            path: "/template/api/templates/{id}",
            extra_query: &[("versionLabel", "versionLabel")],
            unwrap_path: "data",
            yaml_field: None,
        }),
        create: CreateSpec::post("/template/api/templates", PayloadShape::RawYaml),
        import: Some(
            ImportSpec::new("/template/api/templates/import/{id}")
                .named("templateName")
                .with_body(&[("templateVersion", "versionLabel")]),
        ),
        export_format: ExportFormat::Yaml,
    }
}

fn connector(kind: ResourceKind, filter: ItemFilter) -> AdapterDescriptor {
    AdapterDescriptor {
        kind,
        listing: connectors_listing(filter),
        get: Some(GetSpec {
            path: "/ng/api/connectors/{id}",
            extra_query: &[],
            unwrap_path: "data.connector",
            yaml_field: None,
        }),
        create: CreateSpec::post(
            "/ng/api/connectors/import",
            PayloadShape::SerializedYaml {
                wrapper: Some("connector"),
                field: "yaml",
            },
        ),
        import: None,
        export_format: ExportFormat::Yaml,
    }
}

fn secret(kind: ResourceKind, filter: ItemFilter) -> AdapterDescriptor {
    AdapterDescriptor {
        kind,
        listing: secrets_listing(filter),
        get: Some(GetSpec {
            path: "/ng/api/v2/secrets/{id}",
            extra_query: &[],
            unwrap_path: "data.secret",
            yaml_field: None,
        }),
        create: CreateSpec::post("/ng/api/v2/secrets", PayloadShape::Wrapped("secret")),
        import: None,
        export_format: ExportFormat::Json,
    }
}

/// Listing-only resource created from its listing item
fn simple(
    kind: ResourceKind,
    listing: ListingSpec,
    create: CreateSpec,
    export_format: ExportFormat,
) -> AdapterDescriptor {
    AdapterDescriptor {
        kind,
        listing,
        get: None,
        create,
        import: None,
        export_format,
    }
}

/// Descriptor for a resource kind, listing with `page_size` items per page
pub fn descriptor_for(kind: ResourceKind, page_size: usize) -> AdapterDescriptor {
    use ResourceKind as K;

    let mut descriptor = match kind {
        K::Organizations => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_index_query("/ng/api/organizations")
                    .with_unwrap_key("organization"),
            ),
            CreateSpec::post("/ng/api/organizations", PayloadShape::Wrapped("organization")),
            ExportFormat::Json,
        ),
        K::Projects => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_index_query("/ng/api/projects").with_unwrap_key("project"),
            ),
            CreateSpec::post("/ng/api/projects", PayloadShape::Wrapped("project")),
            ExportFormat::Json,
        ),
        K::SecretManagerTemplates => template(
            kind,
            ItemFilter::FieldIn {
                path: "templateEntityType",
                values: SECRET_MANAGER_TEMPLATE_TYPES,
            },
        ),
        K::CustomSecretManagerConnectors => connector(
            kind,
            ItemFilter::FieldIn {
                path: "type",
                values: CUSTOM_SECRET_MANAGER_CONNECTOR_TYPES,
            },
        ),
        K::HarnessSecretManagerSecrets => secret(
            kind,
            ItemFilter::FieldIn {
                path: "spec.secretManagerIdentifier",
                values: HARNESS_SECRET_MANAGER_IDS,
            },
        ),
        K::SecretManagerConnectors => connector(
            kind,
            ItemFilter::FieldIn {
                path: "type",
                values: SECRET_MANAGER_CONNECTOR_TYPES,
            },
        ),
        K::Secrets => secret(
            kind,
            ItemFilter::FieldNotIn {
                path: "spec.secretManagerIdentifier",
                values: HARNESS_SECRET_MANAGER_IDS,
            },
        ),
        K::Connectors => connector(
            kind,
            ItemFilter::FieldNotIn {
                path: "type",
                values: ALL_SECRET_MANAGER_CONNECTOR_TYPES,
            },
        ),
        K::DeploymentTemplates => template(
            kind,
            ItemFilter::FieldIn {
                path: "templateEntityType",
                values: DEPLOYMENT_TEMPLATE_TYPES,
            },
        ),
        K::Environments => AdapterDescriptor {
            kind,
            listing: ListingSpec::new(PaginationSpec::page_size_query("/ng/api/environmentsV2")),
            get: Some(GetSpec {
                path: "/ng/api/environmentsV2/{id}",
                extra_query: &[],
                unwrap_path: "data",
                yaml_field: None,
            }),
            create: CreateSpec::post("/ng/api/environmentsV2/import", PayloadShape::YamlField("yaml")),
            import: Some(
                ImportSpec::new("/ng/api/environmentsV2/import")
                    .identified_by("environmentIdentifier")
                    .named("environmentName"),
            ),
            export_format: ExportFormat::Yaml,
        },
        K::Infrastructures => AdapterDescriptor {
            kind,
            listing: ListingSpec::new(PaginationSpec::page_size_query("/ng/api/infrastructures")),
            get: Some(GetSpec {
                path: "/ng/api/infrastructures/{id}",
                extra_query: &[("environmentIdentifier", "envIdentifier")],
                unwrap_path: "data",
                yaml_field: None,
            }),
            create: CreateSpec::post("/ng/api/infrastructures/import", PayloadShape::YamlField("yaml")),
            import: Some(
                ImportSpec::new("/ng/api/infrastructures/import")
                    .identified_by("infraIdentifier")
                    .named("infraName")
                    .with_query(&[("environmentIdentifier", "envIdentifier")]),
            ),
            export_format: ExportFormat::Yaml,
        },
        K::Services => AdapterDescriptor {
            kind,
            listing: ListingSpec::new(PaginationSpec::page_size_query("/ng/api/servicesV2")),
            get: Some(GetSpec {
                path: "/ng/api/servicesV2/{id}",
                extra_query: &[],
                unwrap_path: "data",
                yaml_field: None,
            }),
            create: CreateSpec::post("/ng/api/servicesV2/import", PayloadShape::YamlField("yaml")),
            import: Some(
                ImportSpec::new("/ng/api/servicesV2/import")
                    .identified_by("serviceIdentifier")
                    .named("serviceName"),
            ),
            export_format: ExportFormat::Yaml,
        },
        K::Overrides => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_size_query("/ng/api/serviceOverrides/v2/list")
                    .with_method(HttpMethod::Post),
            ),
            CreateSpec::post("/ng/api/serviceOverrides/v2", PayloadShape::Entity),
            ExportFormat::Json,
        ),
        K::MonitoredServices => AdapterDescriptor {
            kind,
            listing: ListingSpec::new(PaginationSpec::offset_query("/cv/api/monitored-service")),
            get: Some(GetSpec {
                path: "/cv/api/monitored-service/{id}",
                extra_query: &[],
                unwrap_path: "data.monitoredService",
                yaml_field: None,
            }),
            create: CreateSpec::post("/cv/api/monitored-service", PayloadShape::Entity),
            import: None,
            export_format: ExportFormat::Json,
        },
        K::UserJourneys => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::offset_query("/cv/api/user-journey").with_unwrap_key("userJourney"),
            ),
            CreateSpec::post("/cv/api/user-journey/create", PayloadShape::Entity),
            ExportFormat::Json,
        ),
        K::Templates => template(
            kind,
            ItemFilter::FieldNotIn {
                path: "templateEntityType",
                values: EARLY_TEMPLATE_TYPES,
            },
        ),
        K::Pipelines => AdapterDescriptor {
            kind,
            listing: ListingSpec::new(pipelines_pagination()),
            get: Some(GetSpec {
                path: "/pipeline/api/pipelines/{id}",
                extra_query: &[],
                unwrap_path: "data",
                yaml_field: Some("yamlPipeline"),
            }),
            create: CreateSpec {
                body_flags: &[("isForceImport", false)],
                ..CreateSpec::post(
                    "/pipeline/api/pipelines/import-pipeline",
                    PayloadShape::YamlField("pipelineYaml"),
                )
            },
            import: Some(
                ImportSpec::new("/pipeline/api/pipelines/import")
                    .identified_by("pipelineIdentifier")
                    .named("pipelineName"),
            ),
            export_format: ExportFormat::Yaml,
        },
        K::InputSets => AdapterDescriptor {
            kind,
            listing: ListingSpec::new(PaginationSpec::page_index_query("/pipeline/api/inputSets"))
                .under(ParentListing {
                    pagination: pipelines_pagination(),
                    identifier_field: "identifier",
                    param: "pipelineIdentifier",
                }),
            get: Some(GetSpec {
                path: "/pipeline/api/inputSets/{id}",
                extra_query: &[("pipelineIdentifier", "pipelineIdentifier")],
                unwrap_path: "data",
                yaml_field: Some("inputSetYaml"),
            }),
            create: CreateSpec::post("/pipeline/api/inputSets", PayloadShape::RawYaml)
                .with_query(&[("pipelineIdentifier", "pipelineIdentifier")]),
            import: Some(
                ImportSpec::new("/pipeline/api/inputSets/import/{id}")
                    .named("inputSetName")
                    .with_query(&[("pipelineIdentifier", "pipelineIdentifier")]),
            ),
            export_format: ExportFormat::Yaml,
        },
        K::Triggers => AdapterDescriptor {
            kind,
            listing: ListingSpec::new(PaginationSpec::page_size_query("/pipeline/api/triggers"))
                .under(ParentListing {
                    pagination: pipelines_pagination(),
                    identifier_field: "identifier",
                    param: "targetIdentifier",
                }),
            get: Some(GetSpec {
                path: "/pipeline/api/triggers/{id}",
                extra_query: &[("targetIdentifier", "targetIdentifier")],
                unwrap_path: "data",
                yaml_field: None,
            }),
            create: CreateSpec::post("/pipeline/api/triggers", PayloadShape::RawYaml)
                .with_query(&[("targetIdentifier", "targetIdentifier")]),
            import: None,
            export_format: ExportFormat::Yaml,
        },
        K::Webhooks => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_size_query("/ng/api/gitx-webhooks")
                    .with_params("page", "limit")
                    .with_content_path("data")
                    .with_total_pages_path(None),
            )
            .identified_by("webhook_identifier"),
            CreateSpec::post("/ng/api/gitx-webhooks", PayloadShape::Entity),
            ExportFormat::Json,
        ),
        K::Policies => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_size_query("/pm/api/v1/policies")
                    .with_params("page", "per_page")
                    .with_content_path("")
                    .with_total_pages_path(None),
            ),
            CreateSpec::post("/pm/api/v1/policies", PayloadShape::Entity),
            ExportFormat::Json,
        ),
        K::PolicySets => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_size_query("/pm/api/v1/policysets")
                    .with_params("page", "per_page")
                    .with_content_path("")
                    .with_total_pages_path(None),
            ),
            CreateSpec::post("/pm/api/v1/policysets", PayloadShape::Entity),
            ExportFormat::Json,
        ),
        K::Roles => simple(
            kind,
            ListingSpec::new(PaginationSpec::page_index_query("/authz/api/roles").with_unwrap_key("role"))
                .filtered(ItemFilter::SkipBuiltIn),
            CreateSpec::post("/authz/api/roles", PayloadShape::Entity),
            ExportFormat::Json,
        ),
        K::ResourceGroups => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_index_query("/resourcegroup/api/v2/resourcegroup")
                    .with_unwrap_key("resourceGroup"),
            )
            .filtered(ItemFilter::SkipBuiltIn),
            CreateSpec::post(
                "/resourcegroup/api/v2/resourcegroup",
                PayloadShape::Wrapped("resourceGroup"),
            ),
            ExportFormat::Json,
        ),
        K::Settings => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_index_query("/ng/api/settings")
                    .with_content_path("data")
                    .with_total_pages_path(None)
                    .with_unwrap_key("setting"),
            )
            .filtered(ItemFilter::FieldNotIn {
                path: "settingSource",
                values: &["DEFAULT"],
            }),
            CreateSpec {
                method: HttpMethod::Put,
                ..CreateSpec::post("/ng/api/settings", PayloadShape::SettingsUpdate)
            },
            ExportFormat::Json,
        ),
        K::IpAllowlists => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_size_query("/v1/ip-allowlist")
                    .with_params("page", "limit")
                    .with_content_path("")
                    .with_total_pages_path(None)
                    .with_unwrap_key("ip_allowlist_config"),
            ),
            CreateSpec::post("/v1/ip-allowlist", PayloadShape::Wrapped("ip_allowlist_config")),
            ExportFormat::Json,
        ),
        K::Users => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_index_query("/ng/api/user/aggregate")
                    .with_method(HttpMethod::Post)
                    .with_unwrap_key("user"),
            )
            .identified_by("email"),
            CreateSpec::post("/ng/api/user/users", PayloadShape::UserInvite),
            ExportFormat::Json,
        ),
        K::ServiceAccounts => simple(
            kind,
            ListingSpec::new(
                PaginationSpec::page_index_query("/ng/api/serviceaccount/aggregate")
                    .with_unwrap_key("serviceAccount"),
            ),
            CreateSpec::post("/ng/api/serviceaccount", PayloadShape::Entity),
            ExportFormat::Json,
        ),
    };

    descriptor.listing.pagination = descriptor.listing.pagination.with_page_size(page_size);
    if let Some(parent) = descriptor.listing.parent.as_mut() {
        parent.pagination = parent.pagination.clone().with_page_size(page_size);
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::PHASES;

    fn item(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_every_phase_has_a_descriptor() {
        for phase in PHASES {
            let descriptor = descriptor_for(phase.kind, 50);
            assert_eq!(descriptor.kind, phase.kind);
            assert_eq!(descriptor.listing.pagination.page_size, 50);
        }
    }

    #[test]
    fn test_connector_phases_partition_types() {
        let vault = item(json!({"identifier": "vault", "type": "Vault"}));
        let custom = item(json!({"identifier": "csm", "type": "CustomSecretManager"}));
        let github = item(json!({"identifier": "gh", "type": "Github"}));

        let kinds = [
            ResourceKind::CustomSecretManagerConnectors,
            ResourceKind::SecretManagerConnectors,
            ResourceKind::Connectors,
        ];
        for connector in [&vault, &custom, &github] {
            let claimed = kinds
                .iter()
                .filter(|kind| {
                    descriptor_for(**kind, 10)
                        .listing
                        .filter
                        .matches("x", connector)
                })
                .count();
            assert_eq!(claimed, 1, "connector {connector:?} must belong to exactly one phase");
        }
    }

    #[test]
    fn test_secret_filter_reads_nested_field() {
        let builtin = item(json!({"spec": {"secretManagerIdentifier": "harnessSecretManager"}}));
        let vaulted = item(json!({"spec": {"secretManagerIdentifier": "vault"}}));
        let bare = item(json!({"identifier": "s"}));

        let early = descriptor_for(ResourceKind::HarnessSecretManagerSecrets, 10).listing.filter;
        let late = descriptor_for(ResourceKind::Secrets, 10).listing.filter;

        assert!(early.matches("s", &builtin));
        assert!(!late.matches("s", &builtin));
        assert!(!early.matches("s", &vaulted));
        assert!(late.matches("s", &vaulted));
        assert!(late.matches("s", &bare));
    }

    #[test]
    fn test_skip_built_in() {
        let filter = ItemFilter::SkipBuiltIn;
        assert!(!filter.matches("_account_viewer", &Map::new()));
        assert!(filter.matches("deployers", &Map::new()));
    }

    #[test]
    fn test_pipelines_use_body_pagination() {
        let descriptor = descriptor_for(ResourceKind::Pipelines, 25);
        let request = descriptor.listing.pagination.request_for_page(0, &[]);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.json_body(),
            Some(&json!({"filterType": "PipelineSetup", "page": 0, "size": 25}))
        );
    }

    #[test]
    fn test_child_listings_page_their_parents_too() {
        let descriptor = descriptor_for(ResourceKind::InputSets, 7);
        let parent = descriptor.listing.parent.unwrap();
        assert_eq!(parent.pagination.page_size, 7);
        assert_eq!(parent.param, "pipelineIdentifier");
    }
}
