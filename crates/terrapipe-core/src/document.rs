//! Configuration document loading and merging
//!
//! A document arrives as YAML or JSON, decodes into a
//! `serde_json::Value` mapping, is merged over the embedded defaults,
//! and has the environment override layer applied before the
//! validation engine sees it.

use crate::defaults;
use crate::env::{self, EnvOverrides, RuntimeSettings};
use crate::error::{ConfigError, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Supported document encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension, defaulting to JSON
    pub fn detect(path: &Path) -> Self {
        let is_yaml = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        if is_yaml {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Json
        }
    }
}

/// A decoded, merged, environment-adjusted configuration document
///
/// Construction guarantees the root is a mapping; the validation
/// engine can rely on that and on the defaults layer being present.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Map<String, Value>,
    settings: RuntimeSettings,
}

impl ConfigDocument {
    /// Load a document from a file, detecting the format by extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            message: format!("cannot read configuration file {}", path.display()),
            source: e,
        })?;
        Self::from_str(&content, DocumentFormat::detect(path))
    }

    /// Decode a document from text in the given format
    pub fn from_str(content: &str, format: DocumentFormat) -> Result<Self> {
        let value: Value = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(content)?,
            DocumentFormat::Json => serde_json::from_str(content)?,
        };
        Self::from_value(value)
    }

    /// Build a document from an already-decoded value, reading the
    /// override layer from the process environment
    pub fn from_value(value: Value) -> Result<Self> {
        Self::from_value_with_env(value, &EnvOverrides::from_process())
    }

    /// Build a document from a value with an explicit override layer
    pub fn from_value_with_env(value: Value, overrides: &EnvOverrides) -> Result<Self> {
        let user = match value {
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::structural(
                    "(root)",
                    format!("expected a mapping of sections, got {other}"),
                ));
            }
        };
        let mut root = defaults::merge_over_defaults(user);
        let settings = env::apply(&mut root, overrides)?;
        Ok(Self { root, settings })
    }

    /// The merged top-level mapping
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Runtime settings derived during construction
    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    /// Consume the document for validation
    pub fn into_parts(self) -> (Map<String, Value>, RuntimeSettings) {
        (self.root, self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::detect(Path::new("pipeline.yaml")),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::detect(Path::new("pipeline.YML")),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::detect(Path::new("pipeline.json")),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::detect(Path::new("pipeline")),
            DocumentFormat::Json
        );
    }

    #[test]
    fn test_yaml_and_json_decode_to_same_document() {
        let yaml = "readers:\n  hdf:\n    load: a.b:c\n";
        let json = r#"{"readers": {"hdf": {"load": "a.b:c"}}}"#;
        let a = ConfigDocument::from_str(yaml, DocumentFormat::Yaml).unwrap();
        let b = ConfigDocument::from_str(json, DocumentFormat::Json).unwrap();
        assert_eq!(a.root().get("readers"), b.root().get("readers"));
    }

    #[test]
    fn test_non_mapping_root_rejected() {
        let err = ConfigDocument::from_value(json!(["not", "a", "mapping"])).unwrap_err();
        assert!(err.to_string().contains("(root)"));
    }

    #[test]
    fn test_defaults_present_after_merge() {
        let doc = ConfigDocument::from_value_with_env(json!({}), &EnvOverrides::none()).unwrap();
        assert!(doc.root().contains_key("sampler_defaults"));
        assert_eq!(doc.settings().executor, "SERIAL");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ConfigDocument::from_path(Path::new("/no/such/pipeline.yaml")).unwrap_err();
        assert!(err.to_string().contains("/no/such/pipeline.yaml"));
    }

    #[test]
    fn test_from_path_reads_yaml() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "polys:\n  basin: {{}}").unwrap();

        let doc = ConfigDocument::from_path(&path).unwrap();
        assert!(doc.root()["polys"].as_object().unwrap().contains_key("basin"));
    }
}
