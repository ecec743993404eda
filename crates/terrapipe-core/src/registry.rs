//! Symbol registry and callable-reference resolution
//!
//! Configuration documents name their extension points (readers,
//! model constructors, filters, fit functions) as `module:attribute`
//! reference strings. Resolution is a static lookup against a
//! pre-registered name table rather than runtime reflection: callers
//! register every legal reference name up front, and validation is the
//! single chokepoint through which all references pass.

use crate::error::{ConfigError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Reference names exported by the built-in execution crates.
///
/// Pre-registering these lets a human-authored document that only uses
/// built-ins validate without a user-supplied name table.
pub const BUILTIN_SYMBOLS: &[&str] = &[
    // Readers
    "terrapipe.readers:geotiff_load",
    "terrapipe.readers:geotiff_bounds",
    "terrapipe.readers:hdf4_load",
    "terrapipe.readers:hdf4_bounds",
    "terrapipe.readers:netcdf_load",
    "terrapipe.readers:netcdf_bounds",
    // Downloads
    "terrapipe.downloads:http_fetch",
    "terrapipe.downloads:ftp_fetch",
    // File generators
    "terrapipe.generators:glob_files",
    "terrapipe.generators:walk_directory",
    // Samplers
    "terrapipe.samplers:random_rows",
    "terrapipe.samplers:stratified_rows",
    // Selection filters
    "terrapipe.filters:cloud_mask",
    "terrapipe.filters:nodata_filter",
    "terrapipe.filters:filename_regex",
    // Incremental-fit model constructors
    "terrapipe.models:sgd_classifier",
    "terrapipe.models:sgd_regressor",
    "terrapipe.models:perceptron",
    "terrapipe.models:passive_aggressive_classifier",
    "terrapipe.models:passive_aggressive_regressor",
    "terrapipe.models:multinomial_nb",
    "terrapipe.models:bernoulli_nb",
    "terrapipe.models:minibatch_kmeans",
    "terrapipe.models:incremental_pca",
    "terrapipe.models:minibatch_dictionary_learning",
    // Fit/selector functions
    "terrapipe.fitting:partial_fit",
    "terrapipe.fitting:fit",
    "terrapipe.fitting:best_score_selector",
    "terrapipe.fitting:serialize_model",
];

fn reference_format() -> &'static Regex {
    static FORMAT: OnceLock<Regex> = OnceLock::new();
    FORMAT.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*:[A-Za-z_][A-Za-z0-9_]*$")
            .expect("reference format regex is valid")
    })
}

/// Opaque handle to a registered symbol
///
/// Validation never invokes a symbol; the handle exists so downstream
/// pipeline runners receive something they can dispatch on by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: String,
}

impl Symbol {
    /// The `module:attribute` reference this symbol was registered under
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Outcome of resolving a callable-reference field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The reference named a registered symbol
    Symbol(Symbol),
    /// The field was absent/empty and not required
    NoOp,
}

impl Resolved {
    pub fn is_noop(&self) -> bool {
        matches!(self, Resolved::NoOp)
    }

    /// The resolved reference name, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            Resolved::Symbol(symbol) => Some(symbol.name()),
            Resolved::NoOp => None,
        }
    }
}

/// Statically registered name → symbol table
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with [`BUILTIN_SYMBOLS`]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_SYMBOLS {
            registry
                .register(name)
                .expect("builtin symbol names are well-formed");
        }
        registry
    }

    /// Build a registry from an explicit list of reference names
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Register a legal reference name
    ///
    /// Rejects names that do not use the `module:attribute` form so a
    /// registry can never contain a reference no document could spell.
    pub fn register(&mut self, reference: &str) -> Result<()> {
        if !reference_format().is_match(reference) {
            return Err(ConfigError::Resolution {
                context: "registry".to_string(),
                reference: format!("{reference:?}"),
                message: "references must use the module:attribute form".to_string(),
            });
        }
        self.symbols.insert(
            reference.to_string(),
            Symbol {
                name: reference.to_string(),
            },
        );
        Ok(())
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.symbols.contains_key(reference)
    }

    /// Resolve a callable-reference field
    ///
    /// `value` is the raw field straight out of the document. Absent,
    /// null, and empty-string fields resolve to [`Resolved::NoOp`] when
    /// not required and fail otherwise. Every failure names the
    /// `section:key` context where resolution was requested.
    pub fn resolve(&self, value: Option<&Value>, required: bool, context: &str) -> Result<Resolved> {
        let reference = match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                return Err(ConfigError::Resolution {
                    context: context.to_string(),
                    reference: other.to_string(),
                    message: "expected a string reference".to_string(),
                });
            }
        };

        let reference = match reference {
            Some(r) => r,
            None if required => {
                return Err(ConfigError::Resolution {
                    context: context.to_string(),
                    reference: "(none)".to_string(),
                    message: "a callable reference is required".to_string(),
                });
            }
            None => return Ok(Resolved::NoOp),
        };

        if !reference_format().is_match(reference) {
            return Err(ConfigError::Resolution {
                context: context.to_string(),
                reference: format!("{reference:?}"),
                message: "references must use the module:attribute form".to_string(),
            });
        }
        match self.symbols.get(reference) {
            Some(symbol) => Ok(Resolved::Symbol(symbol.clone())),
            None => Err(ConfigError::Resolution {
                context: context.to_string(),
                reference: format!("{reference:?}"),
                message: "no symbol registered under this name".to_string(),
            }),
        }
    }

    /// Resolve a field that must name a symbol
    pub fn resolve_required(&self, value: Option<&Value>, context: &str) -> Result<Symbol> {
        match self.resolve(value, true, context)? {
            Resolved::Symbol(symbol) => Ok(symbol),
            Resolved::NoOp => unreachable!("required resolution never yields NoOp"),
        }
    }
}
