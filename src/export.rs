//! # Audit Export Side-Channel
//!
//! Before every write (and in place of it during a dry run) the runner hands
//! the fetched payload to an [`ExportSink`]. The file-backed sink writes one
//! file per resource under `<export_dir>/<resource_type>/`. Export problems
//! are reported to the caller, which logs them; they never fail a migration
//! step.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::MigrateResult;
use crate::scheduler::ResourceKind;
use crate::scopes::Scope;
use crate::utils::json::str_field;

/// Serialization used for a resource type's export files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Yaml,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

/// Destination for exported payloads
pub trait ExportSink: Send + Sync {
    /// Persist one payload, returning where it went
    fn export(
        &self,
        kind: ResourceKind,
        scope: &Scope,
        identifier: &str,
        payload: &Value,
        format: ExportFormat,
    ) -> MigrateResult<Option<PathBuf>>;
}

/// Discards every payload
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExporter;

impl ExportSink for NoopExporter {
    fn export(
        &self,
        _kind: ResourceKind,
        _scope: &Scope,
        _identifier: &str,
        _payload: &Value,
        _format: ExportFormat,
    ) -> MigrateResult<Option<PathBuf>> {
        Ok(None)
    }
}

/// Writes payloads below a local directory
#[derive(Debug, Clone)]
pub struct FileExporter {
    root: PathBuf,
}

impl FileExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<resource_type>/<identifier>[__<org>[__<project>]].<ext>`
    pub fn path_for(
        &self,
        kind: ResourceKind,
        scope: &Scope,
        identifier: &str,
        format: ExportFormat,
    ) -> PathBuf {
        let file_name = format!(
            "{}{}.{}",
            sanitize(identifier),
            sanitize(&scope.file_suffix()),
            format.extension()
        );
        self.root.join(kind.as_str()).join(file_name)
    }
}

impl ExportSink for FileExporter {
    fn export(
        &self,
        kind: ResourceKind,
        scope: &Scope,
        identifier: &str,
        payload: &Value,
        format: ExportFormat,
    ) -> MigrateResult<Option<PathBuf>> {
        let path = self.path_for(kind, scope, identifier, format);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = match format {
            ExportFormat::Json => serde_json::to_string_pretty(payload)?,
            // Resources fetched as YAML documents are exported verbatim.
            ExportFormat::Yaml => match payload.as_object().and_then(|map| str_field(map, "yaml")) {
                Some(yaml) => yaml.to_string(),
                None => serde_yaml::to_string(payload)?,
            },
        };

        std::fs::write(&path, content)?;
        debug!(path = %path.display(), "Exported resource payload");
        Ok(Some(path))
    }
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_path_layout() {
        let exporter = FileExporter::new("exports");
        assert_eq!(
            exporter.path_for(
                ResourceKind::Pipelines,
                &Scope::project("eng", "web"),
                "deploy",
                ExportFormat::Yaml
            ),
            PathBuf::from("exports/pipelines/deploy__eng__web.yaml")
        );
        assert_eq!(
            exporter.path_for(
                ResourceKind::Secrets,
                &Scope::account(),
                "a/b",
                ExportFormat::Json
            ),
            PathBuf::from("exports/secrets/a_b.json")
        );
    }

    #[test]
    fn test_yaml_field_exported_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = FileExporter::new(temp_dir.path());
        let path = exporter
            .export(
                ResourceKind::Services,
                &Scope::organization("eng"),
                "api",
                &json!({"identifier": "api", "yaml": "service:\n  name: api\n"}),
                ExportFormat::Yaml,
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "service:\n  name: api\n"
        );
    }

    #[test]
    fn test_json_export() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = FileExporter::new(temp_dir.path());
        let path = exporter
            .export(
                ResourceKind::Roles,
                &Scope::account(),
                "viewer",
                &json!({"identifier": "viewer"}),
                ExportFormat::Json,
            )
            .unwrap()
            .unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, json!({"identifier": "viewer"}));
    }

    #[test]
    fn test_export_into_unwritable_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let exporter = FileExporter::new(&blocker);
        let result = exporter.export(
            ResourceKind::Roles,
            &Scope::account(),
            "viewer",
            &json!({}),
            ExportFormat::Json,
        );
        assert!(result.is_err());
    }
}
