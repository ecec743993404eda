//! Typed configuration model
//!
//! The validation engine threads a [`ValidatedConfig`] through its
//! ordered steps, one typed field per top-level section. Later sections
//! consult the fields earlier sections populated; nothing here is
//! mutated after validation completes.

use crate::env::RuntimeSettings;
use crate::registry::{Resolved, Symbol};
use serde_json::Value;
use std::collections::BTreeMap;

/// One band within a data source: where to find it and what to call it
///
/// The three components are, in order, the metadata key search phrase,
/// the metadata value search phrase, and the band name used for
/// feature output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSpec {
    pub search_key: String,
    pub search_value: String,
    pub band_name: String,
}

/// A named reader: load a file and report its bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSpec {
    pub load: Symbol,
    pub bounds: Symbol,
}

/// A named data source tying a reader, an optional download, and the
/// bands it exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub reader: String,
    pub download: Option<String>,
    pub band_specs: Vec<BandSpec>,
}

impl DataSource {
    /// Band names in band-spec order; the only place feature output
    /// ordering is established.
    pub fn band_names(&self) -> Vec<String> {
        self.band_specs.iter().map(|b| b.band_name.clone()).collect()
    }
}

/// A file generator: either a registered callable or a literal file
/// list folded in from the `file_lists` section
#[derive(Debug, Clone, PartialEq)]
pub enum FileGenerator {
    Callable(Symbol),
    Literal(Vec<Value>),
}

/// Polygon include/exclude lists inside a sampler's selection filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoFilter {
    pub include_polys: Vec<String>,
    pub exclude_polys: Vec<String>,
}

/// Validated selection filtering for a sampler
///
/// Absent named filters are dropped from the normalized document; here
/// they are simply `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionKwargs {
    pub geo_filter: GeoFilter,
    pub data_filter: Option<Symbol>,
    pub metadata_filter: Option<Symbol>,
    pub filename_filter: Option<Symbol>,
}

/// A validated sampler entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sampler {
    pub callable: Symbol,
    pub n_rows_per_sample: u64,
    pub files_per_sample: u64,
    /// Key into the merged file generators
    pub file_generator: String,
    pub selection: Option<SelectionKwargs>,
}

/// A validated training entry
#[derive(Debug, Clone, PartialEq)]
pub struct TrainEntry {
    pub model_init_func: Symbol,
    pub fit_func: Symbol,
    pub model_selector_func: Resolved,
    pub post_fit_func: Resolved,
    pub model_init_kwargs: serde_json::Map<String, Value>,
    pub ensemble_kwargs: serde_json::Map<String, Value>,
    pub fit_kwargs: serde_json::Map<String, Value>,
    pub sampler: String,
    pub data_source: String,
    pub output_tag: String,
    /// Derived from the referenced data source's band specs, positional
    pub band_names: Vec<String>,
    pub ml_features: Vec<Value>,
}

/// The four recognized pipeline actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineAction {
    DownloadDataSources,
    Train,
    Predict,
    ChangeDetection,
}

impl PipelineAction {
    pub const ALL: [PipelineAction; 4] = [
        PipelineAction::DownloadDataSources,
        PipelineAction::Train,
        PipelineAction::Predict,
        PipelineAction::ChangeDetection,
    ];

    /// The document key this action is spelled as
    pub fn key(&self) -> &'static str {
        match self {
            PipelineAction::DownloadDataSources => "download_data_sources",
            PipelineAction::Train => "train",
            PipelineAction::Predict => "predict",
            PipelineAction::ChangeDetection => "change_detection",
        }
    }

    /// The allowed key set, for error messages
    pub fn allowed_keys() -> String {
        Self::ALL
            .iter()
            .map(|a| a.key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for PipelineAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One validated pipeline step: exactly one action plus its payload
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub action: PipelineAction,
    /// The value under the action key; a section key name for
    /// train/predict steps, arbitrary well-typed input for the
    /// placeholder actions
    pub payload: Value,
    /// Per-sample post-processing hooks, passed through unvalidated
    pub on_each_sample: Vec<Value>,
}

impl PipelineStep {
    /// The referenced train/predict entry name, when the action has one
    pub fn target(&self) -> Option<&str> {
        match self.action {
            PipelineAction::Train | PipelineAction::Predict => self.payload.as_str(),
            _ => None,
        }
    }
}

/// Typed output of the validation engine, one field per section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedConfig {
    pub readers: BTreeMap<String, ReaderSpec>,
    pub downloads: BTreeMap<String, Symbol>,
    pub data_sources: BTreeMap<String, DataSource>,
    /// File lists appear here as literal-backed generators
    pub file_generators: BTreeMap<String, FileGenerator>,
    pub file_lists: BTreeMap<String, Vec<Value>>,
    pub samplers: BTreeMap<String, Sampler>,
    pub polys: BTreeMap<String, Value>,
    pub resamplers: BTreeMap<String, Value>,
    pub aggregations: BTreeMap<String, Value>,
    pub masks: BTreeMap<String, Value>,
    pub add_features: BTreeMap<String, Value>,
    pub train: BTreeMap<String, TrainEntry>,
    pub predict: BTreeMap<String, Value>,
    pub pipeline: Vec<PipelineStep>,
}

/// A fully validated pipeline configuration
///
/// `document` is the normalized form of the input mapping (defaults
/// filled in, file lists folded, empty filter keys removed); `sections`
/// is the typed view the pipeline runners consume.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub document: Value,
    pub sections: ValidatedConfig,
    pub settings: RuntimeSettings,
}
