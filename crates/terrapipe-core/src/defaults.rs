//! Built-in default configuration layer
//!
//! The defaults document is embedded at compile time and carries the
//! runtime-settings defaults, the global sampler numeric defaults, and
//! empty bodies for every optional section. User documents are merged
//! over it at the top level; a user section replaces the default
//! section wholesale.

use serde_json::{Map, Value};

// Embed the defaults document at compile time for reliability
const DEFAULTS_YAML: &str = include_str!("defaults.yaml");

/// Fallback when the `sampler_defaults` table is absent from the
/// merged document.
pub const DEFAULT_N_ROWS_PER_SAMPLE: u64 = 500_000;
pub const DEFAULT_FILES_PER_SAMPLE: u64 = 10;

/// Key of the global sampler defaults table in the merged document
pub const SAMPLER_DEFAULTS_KEY: &str = "sampler_defaults";

/// Parse the embedded defaults document into a top-level mapping.
///
/// The embedded document is part of the crate and is expected to be
/// well-formed; decoding it cannot fail for user-supplied reasons.
pub fn default_config() -> Map<String, Value> {
    let value: Value =
        serde_yaml::from_str(DEFAULTS_YAML).expect("embedded defaults.yaml is well-formed");
    match value {
        Value::Object(map) => map,
        _ => unreachable!("embedded defaults.yaml has a mapping root"),
    }
}

/// Merge a user document over the defaults, top-level key by top-level
/// key. A user-supplied section replaces the default one; there is no
/// deep merge.
pub fn merge_over_defaults(user: Map<String, Value>) -> Map<String, Value> {
    let mut merged = default_config();
    for (key, value) in user {
        merged.insert(key, value);
    }
    merged
}
