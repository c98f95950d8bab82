//! Pipeline catalog: which path prefixes trigger which pipelines.
//!
//! The catalog is built once per invocation from the configured
//! [`PipelineEntry`] list and a [`NamingConvention`], and is read-only after that.

use crate::ids::PipelineIdentifier;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One configured pipeline, as written in the `PIPELINES` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntry {
    /// Base name, before the naming convention is applied.
    pub name: String,
    /// Literal path prefix that triggers this pipeline.
    pub path: String,
    /// Pipeline kind (`backend`, `frontend`, ...). Carried, never matched on.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl PipelineEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Maps a base pipeline name to the fully-qualified identifier to trigger:
/// `<prefix><name><suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

/// Marker separating the environment prefix from the rest of the handler's own name.
pub const DEFAULT_HANDLER_MARKER: &str = "pipeline-handler";

fn default_suffix() -> String {
    "-pipeline".to_string()
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: default_suffix(),
        }
    }
}

impl NamingConvention {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Derive the environment prefix from the running handler's own name.
    ///
    /// `dev-app-pipeline-handler` with marker `pipeline-handler` gives prefix
    /// `dev-app-`. A name without the marker is used whole; no name gives an
    /// empty prefix.
    pub fn from_handler_name(handler_name: Option<&str>, marker: &str) -> Self {
        let prefix = match handler_name {
            Some(name) if !marker.is_empty() => {
                name.split_once(marker).map_or(name, |(head, _)| head)
            }
            Some(name) => name,
            None => "",
        };
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn apply(&self, base_name: &str) -> PipelineIdentifier {
        PipelineIdentifier::new(format!("{}{}{}", self.prefix, base_name, self.suffix))
    }
}

/// A resolved catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRule {
    pub id: PipelineIdentifier,
    pub prefix: String,
    pub kind: Option<String>,
}

/// Ordered, read-only list of pipeline rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineCatalog {
    rules: Vec<PipelineRule>,
}

impl PipelineCatalog {
    /// Build a catalog, applying `naming` to every entry.
    pub fn load(entries: &[PipelineEntry], naming: &NamingConvention) -> Result<Self> {
        let mut rules = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(Error::ConfigurationInvalid(format!(
                    "pipeline entry {} has an empty name",
                    index
                )));
            }
            if entry.path.is_empty() {
                return Err(Error::ConfigurationInvalid(format!(
                    "pipeline \"{}\" has an empty path prefix",
                    entry.name
                )));
            }
            rules.push(PipelineRule {
                id: naming.apply(&entry.name),
                prefix: entry.path.clone(),
                kind: entry.kind.clone(),
            });
        }
        Ok(Self { rules })
    }

    /// Parse the JSON array form of the configuration and build a catalog.
    pub fn from_json(raw: &str, naming: &NamingConvention) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::ConfigurationInvalid(
                "pipeline configuration is missing".to_string(),
            ));
        }
        let entries: Vec<PipelineEntry> = serde_json::from_str(raw).map_err(|e| {
            Error::ConfigurationInvalid(format!("cannot parse pipeline configuration: {}", e))
        })?;
        Self::load(&entries, naming)
    }

    /// Build from already-qualified rules, bypassing the naming convention.
    pub fn from_rules(rules: Vec<PipelineRule>) -> Result<Self> {
        if let Some(rule) = rules.iter().find(|r| r.prefix.is_empty()) {
            return Err(Error::ConfigurationInvalid(format!(
                "pipeline \"{}\" has an empty path prefix",
                rule.id
            )));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PipelineRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prefix_from_handler_name() {
        let naming = NamingConvention::from_handler_name(
            Some("dev-shop-pipeline-handler"),
            DEFAULT_HANDLER_MARKER,
        );
        assert_eq!(naming.prefix, "dev-shop-");
        assert_eq!(naming.apply("api").as_str(), "dev-shop-api-pipeline");
    }

    #[test]
    fn test_prefix_without_marker_uses_whole_name() {
        let naming = NamingConvention::from_handler_name(Some("standalone"), DEFAULT_HANDLER_MARKER);
        assert_eq!(naming.apply("api").as_str(), "standaloneapi-pipeline");
    }

    #[test]
    fn test_prefix_without_handler_name() {
        let naming = NamingConvention::from_handler_name(None, DEFAULT_HANDLER_MARKER);
        assert_eq!(naming.apply("api").as_str(), "api-pipeline");
    }

    #[test]
    fn test_load_from_json_keeps_order_and_kind() {
        let raw = r#"[
            {"name": "item1", "path": "backend/item1/", "type": "backend"},
            {"name": "frontend", "path": "frontend/", "type": "frontend"}
        ]"#;
        let catalog = PipelineCatalog::from_json(raw, &NamingConvention::new("prod-", "-pipeline")).unwrap();

        let ids: Vec<_> = catalog.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["prod-item1-pipeline", "prod-frontend-pipeline"]);
        assert_eq!(catalog.rules()[0].kind.as_deref(), Some("backend"));
    }

    #[test]
    fn test_kind_is_optional() {
        let raw = r#"[{"name": "api", "path": "services/api/"}]"#;
        let catalog = PipelineCatalog::from_json(raw, &NamingConvention::default()).unwrap();
        assert_eq!(catalog.rules()[0].kind, None);
    }

    #[test]
    fn test_missing_configuration_is_invalid() {
        let err = PipelineCatalog::from_json("  ", &NamingConvention::default()).unwrap_err();
        assert!(matches!(err, Error::ConfigurationInvalid(_)));
    }

    #[test]
    fn test_malformed_configuration_is_invalid() {
        let err = PipelineCatalog::from_json("{not json", &NamingConvention::default()).unwrap_err();
        assert!(matches!(err, Error::ConfigurationInvalid(_)));
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let err = PipelineCatalog::load(&[PipelineEntry::new("api", "")], &NamingConvention::default())
            .unwrap_err();
        assert!(err.to_string().contains("empty path prefix"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = PipelineCatalog::load(&[PipelineEntry::new(" ", "x/")], &NamingConvention::default())
            .unwrap_err();
        assert!(matches!(err, Error::ConfigurationInvalid(_)));
    }

    #[test]
    fn test_duplicate_identifiers_are_legal() {
        let catalog = PipelineCatalog::load(
            &[
                PipelineEntry::new("shared", "libs/a/"),
                PipelineEntry::new("shared", "libs/b/"),
            ],
            &NamingConvention::default(),
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
    }
}
