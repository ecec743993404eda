//! Core validation engine
//!
//! The engine walks an explicit ordered table of section validators.
//! Each validator reads its raw section from the merged document,
//! normalizes it, and stores a typed result into the partial
//! [`ValidatedConfig`] for later sections to consult. A section may
//! read sections validated earlier in the order but never later ones.
//! The first error aborts the run.
//!
//! Copyright (c) 2026 Terrapipe Team
//! Licensed under the Apache-2.0 license

use crate::document::ConfigDocument;
use crate::env::RuntimeSettings;
use crate::error::{ConfigError, Result};
use crate::registry::SymbolRegistry;
use crate::types::{PipelineConfig, ValidatedConfig};
use crate::validation::{pipeline, samplers, sections, train};
use serde_json::{Map, Value};
use tracing::debug;

/// Expected container kind of a validated section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Mapping,
    Sequence,
}

type SectionFn = fn(&mut ConfigValidator<'_>) -> Result<()>;

/// Ordered section table: the order IS the dependency order.
///
/// `polys` validates before `samplers` because sampler selection
/// filters cross-reference poly names; `train` validates after both
/// because it cross-references samplers and data sources; `pipeline`
/// validates last because its steps reference everything else.
const SECTION_VALIDATORS: &[(&str, SectionKind, SectionFn)] = &[
    ("readers", SectionKind::Mapping, sections::validate_readers),
    ("downloads", SectionKind::Mapping, sections::validate_downloads),
    ("data_sources", SectionKind::Mapping, sections::validate_data_sources),
    ("file_generators", SectionKind::Mapping, sections::validate_file_generators),
    ("file_lists", SectionKind::Mapping, sections::validate_file_lists),
    ("polys", SectionKind::Mapping, sections::validate_polys),
    ("samplers", SectionKind::Mapping, samplers::validate_samplers),
    ("resamplers", SectionKind::Mapping, sections::validate_resamplers),
    ("aggregations", SectionKind::Mapping, sections::validate_aggregations),
    ("masks", SectionKind::Mapping, sections::validate_masks),
    ("add_features", SectionKind::Mapping, sections::validate_add_features),
    ("train", SectionKind::Mapping, train::validate_train),
    ("predict", SectionKind::Mapping, sections::validate_predict),
    ("pipeline", SectionKind::Sequence, pipeline::validate_pipeline),
];

/// The configuration validation engine
///
/// Owns the merged document for the duration of a run and accumulates
/// the typed sections. Consumed by [`ConfigValidator::run`]; a
/// document is validated by exactly one engine instance.
pub struct ConfigValidator<'r> {
    registry: &'r SymbolRegistry,
    pub(crate) document: Map<String, Value>,
    pub(crate) validated: ValidatedConfig,
    settings: RuntimeSettings,
}

impl<'r> ConfigValidator<'r> {
    /// Create an engine over a prepared document
    pub fn new(document: ConfigDocument, registry: &'r SymbolRegistry) -> Self {
        let (document, settings) = document.into_parts();
        Self {
            registry,
            document,
            validated: ValidatedConfig::default(),
            settings,
        }
    }

    /// Run every section validator in order, fail-fast
    pub fn run(mut self) -> Result<PipelineConfig> {
        for (name, kind, validate) in SECTION_VALIDATORS {
            debug!(section = name, "validating section");
            validate(&mut self)?;
            debug_assert!(
                self.section_kind_matches(name, *kind),
                "section {name} normalized to the wrong container kind"
            );
        }
        Ok(PipelineConfig {
            document: Value::Object(self.document),
            sections: self.validated,
            settings: self.settings,
        })
    }

    pub(crate) fn registry(&self) -> &SymbolRegistry {
        self.registry
    }

    /// Read a mapping-shaped section, defaulting to empty when absent
    pub(crate) fn mapping_section(
        &self,
        name: &str,
        require_non_empty: bool,
    ) -> Result<Map<String, Value>> {
        let map = match self.document.get(name) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(ConfigError::structural(
                    name,
                    format!("expected a mapping, got {}", json_kind(other)),
                ));
            }
        };
        if require_non_empty && map.is_empty() {
            return Err(ConfigError::structural(
                name,
                "expected a non-empty mapping in the configuration",
            ));
        }
        Ok(map)
    }

    /// Read a sequence-shaped section, defaulting to empty when absent
    pub(crate) fn sequence_section(
        &self,
        name: &str,
        require_non_empty: bool,
    ) -> Result<Vec<Value>> {
        let list = match self.document.get(name) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(list)) => list.clone(),
            Some(other) => {
                return Err(ConfigError::structural(
                    name,
                    format!("expected a list, got {}", json_kind(other)),
                ));
            }
        };
        if require_non_empty && list.is_empty() {
            return Err(ConfigError::structural(
                name,
                "expected a non-empty list in the configuration",
            ));
        }
        Ok(list)
    }

    /// Write a normalized mapping section back into the document
    pub(crate) fn store_mapping(&mut self, name: &str, map: Map<String, Value>) {
        self.document.insert(name.to_string(), Value::Object(map));
    }

    /// Write a normalized sequence section back into the document
    pub(crate) fn store_sequence(&mut self, name: &str, list: Vec<Value>) {
        self.document.insert(name.to_string(), Value::Array(list));
    }

    fn section_kind_matches(&self, name: &str, kind: SectionKind) -> bool {
        match (self.document.get(name), kind) {
            (Some(Value::Object(_)), SectionKind::Mapping) => true,
            (Some(Value::Array(_)), SectionKind::Sequence) => true,
            _ => false,
        }
    }
}

/// Human-readable JSON container/scalar kind for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
