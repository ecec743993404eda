//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI
//! subcommand, plus the shared helpers for building symbol registries
//! from the built-in table and user-supplied name files.

mod completions;
mod inspect;
mod validate;

pub use completions::handle_completions;
pub use inspect::handle_inspect;
pub use validate::handle_validate;

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use terrapipe_core::SymbolRegistry;
use tracing::debug;

/// Build the symbol registry for a validation run
///
/// Starts from the built-in name table and extends it with the name
/// list from `--symbols`, falling back to the `symbols_file` in the
/// CLI configuration.
pub(crate) fn build_registry(
    symbols_arg: Option<&Path>,
    config: &Config,
) -> Result<SymbolRegistry> {
    let mut registry = SymbolRegistry::with_builtins();

    let symbols_file: Option<PathBuf> = symbols_arg
        .map(Path::to_path_buf)
        .or_else(|| config.symbols_file.clone());
    if let Some(path) = symbols_file {
        if !path.exists() {
            return Err(Error::FileNotFound { path });
        }
        let content = std::fs::read_to_string(&path)?;
        let names: Vec<String> = serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.clone(),
            expected: "YAML list of reference names".to_string(),
        })?;
        debug!(count = names.len(), file = %path.display(), "registering user symbols");
        for name in names {
            registry.register(&name)?;
        }
    }

    Ok(registry)
}
