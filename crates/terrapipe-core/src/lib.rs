//! Terrapipe Core - Validation engine for declarative geospatial ML
//! pipeline configurations
//!
//! This crate proves that a pipeline configuration document (data
//! sources, sampling strategy, training and prediction entries, and an
//! ordered action pipeline) is well-formed enough to attempt
//! execution. It does not execute anything itself.
//!
//! # Main Components
//!
//! - **Error Handling**: one [`ConfigError`] kind using `thiserror`
//! - **Document Loading**: YAML/JSON decode, defaults merge, and the
//!   environment override layer
//! - **Symbol Registry**: static name → symbol resolution for every
//!   callable-reference field
//! - **Validation Engine**: ordered, cross-referential, fail-fast
//!   section validation producing a typed [`PipelineConfig`]
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use terrapipe_core::{validate_file, Result, SymbolRegistry};
//!
//! fn example() -> Result<()> {
//!     let registry = SymbolRegistry::with_builtins();
//!     let config = validate_file(Path::new("pipeline.yaml"), &registry)?;
//!     for step in &config.sections.pipeline {
//!         println!("step: {}", step.action);
//!     }
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod document;
pub mod env;
pub mod error;
pub mod registry;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use document::{ConfigDocument, DocumentFormat};
pub use env::{EnvOverrides, RuntimeSettings};
pub use error::{ConfigError, Result};
pub use registry::{Resolved, Symbol, SymbolRegistry};
pub use types::{
    // Section entries
    BandSpec, DataSource, FileGenerator, GeoFilter, ReaderSpec, Sampler, SelectionKwargs,
    TrainEntry,
    // Pipeline types
    PipelineAction, PipelineStep,
    // Validation output
    PipelineConfig, ValidatedConfig,
};
pub use validation::{ConfigValidator, ValidationContext};

use std::path::Path;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load a configuration file and run the full validation engine
pub fn validate_file(path: &Path, registry: &SymbolRegistry) -> Result<PipelineConfig> {
    let document = ConfigDocument::from_path(path)?;
    ConfigValidator::new(document, registry).run()
}

/// Validate configuration text in the given format
pub fn validate_str(
    content: &str,
    format: DocumentFormat,
    registry: &SymbolRegistry,
) -> Result<PipelineConfig> {
    let document = ConfigDocument::from_str(content, format)?;
    ConfigValidator::new(document, registry).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_validate_str_surfaces_decode_errors() {
        let registry = SymbolRegistry::with_builtins();
        let err = validate_str("{not json", DocumentFormat::Json, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }
}
