//! Environment-derived runtime settings
//!
//! A fixed table of scalar settings can be supplied either as top-level
//! configuration keys or as `TERRAPIPE_*` environment variables, with
//! the environment taking precedence. String fields may carry an
//! allowed-choices set; an out-of-range value is a validation error,
//! never a warning. The resolved values are exposed as
//! [`RuntimeSettings`] for downstream pipeline runners.

use crate::error::{ConfigError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Prefix for all recognized environment variables
pub const ENV_PREFIX: &str = "TERRAPIPE_";

/// Spec for a string-valued runtime setting
pub struct StrFieldSpec {
    pub name: &'static str,
    /// Allowed values; empty means any string is accepted
    pub choices: &'static [&'static str],
}

/// Spec for an integer-valued runtime setting
pub struct IntFieldSpec {
    pub name: &'static str,
}

/// String fields recognized as config keys or environment variables
pub const STR_FIELD_SPECS: &[StrFieldSpec] = &[
    StrFieldSpec {
        name: "EXECUTOR",
        choices: &["SERIAL", "THREADS", "PROCESSES"],
    },
    StrFieldSpec {
        name: "OUTPUT_DIR",
        choices: &[],
    },
    StrFieldSpec {
        name: "DATA_CACHE_DIR",
        choices: &[],
    },
];

/// Integer fields recognized as config keys or environment variables
pub const INT_FIELD_SPECS: &[IntFieldSpec] = &[
    IntFieldSpec { name: "MAX_WORKERS" },
    IntFieldSpec { name: "RANDOM_SEED" },
];

/// Captured environment override layer
///
/// Holding the overrides as plain data keeps the settings logic pure
/// and testable; [`EnvOverrides::from_process`] is the only place the
/// process environment is read.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    values: BTreeMap<String, String>,
}

impl EnvOverrides {
    /// An empty override layer
    pub fn none() -> Self {
        Self::default()
    }

    /// Capture all `TERRAPIPE_*` variables from the process environment
    pub fn from_process() -> Self {
        Self::from_iter(std::env::vars())
    }

    /// Build an override layer from explicit name/value pairs
    pub fn from_iter<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let values = vars
            .into_iter()
            .filter(|(name, _)| name.starts_with(ENV_PREFIX))
            .collect();
        Self { values }
    }

    fn get(&self, setting: &str) -> Option<&str> {
        self.values
            .get(&format!("{ENV_PREFIX}{setting}"))
            .map(String::as_str)
    }
}

/// Resolved runtime settings derived from the merged document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeSettings {
    /// Execution backend choice
    pub executor: String,
    /// Directory written by prediction/training runners
    pub output_dir: Option<String>,
    /// Local cache for downloaded source files
    pub data_cache_dir: Option<String>,
    /// Worker cap for the non-serial executors
    pub max_workers: Option<u64>,
    /// Seed threaded through samplers when set
    pub random_seed: Option<u64>,
    /// True when the executor runs every step in-process
    pub serial_eval: bool,
}

/// Apply the override layer to the merged document and derive
/// [`RuntimeSettings`] from the result.
///
/// Overrides are written into the document first so that the same
/// values are visible both to the settings and to any section that
/// reads the top-level keys. Choice checks run against the final value
/// regardless of whether it came from the document or the environment.
pub fn apply(document: &mut Map<String, Value>, overrides: &EnvOverrides) -> Result<RuntimeSettings> {
    for spec in STR_FIELD_SPECS {
        if let Some(value) = overrides.get(spec.name) {
            document.insert(spec.name.to_string(), Value::String(value.to_string()));
        }
        if spec.choices.is_empty() {
            continue;
        }
        let value = document.get(spec.name).and_then(Value::as_str);
        match value {
            Some(v) if spec.choices.contains(&v) => {}
            other => {
                return Err(ConfigError::Environment {
                    variable: spec.name.to_string(),
                    message: format!(
                        "expected config key or {ENV_PREFIX}{} to be one of {:?}, got {:?}",
                        spec.name,
                        spec.choices,
                        other.unwrap_or("(unset)")
                    ),
                });
            }
        }
    }

    for spec in INT_FIELD_SPECS {
        if let Some(value) = overrides.get(spec.name) {
            let parsed: u64 = value.parse().map_err(|_| ConfigError::Environment {
                variable: spec.name.to_string(),
                message: format!(
                    "{ENV_PREFIX}{} must be a non-negative integer, got {value:?}",
                    spec.name
                ),
            })?;
            document.insert(spec.name.to_string(), Value::from(parsed));
        }
        if let Some(value) = document.get(spec.name) {
            if !value.is_null() && value.as_u64().is_none() {
                return Err(ConfigError::Environment {
                    variable: spec.name.to_string(),
                    message: format!("expected a non-negative integer, got {value}"),
                });
            }
        }
    }

    let executor = document
        .get("EXECUTOR")
        .and_then(Value::as_str)
        .unwrap_or("SERIAL")
        .to_string();
    let serial_eval = executor == "SERIAL";
    Ok(RuntimeSettings {
        serial_eval,
        executor,
        output_dir: string_setting(document, "OUTPUT_DIR"),
        data_cache_dir: string_setting(document, "DATA_CACHE_DIR"),
        max_workers: document.get("MAX_WORKERS").and_then(Value::as_u64),
        random_seed: document.get("RANDOM_SEED").and_then(Value::as_u64),
    })
}

fn string_setting(document: &Map<String, Value>, name: &str) -> Option<String> {
    document.get(name).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_env_override_wins_over_document() {
        let mut doc = document(json!({"EXECUTOR": "SERIAL"}));
        let overrides = EnvOverrides::from_iter([(
            "TERRAPIPE_EXECUTOR".to_string(),
            "THREADS".to_string(),
        )]);
        let settings = apply(&mut doc, &overrides).unwrap();
        assert_eq!(settings.executor, "THREADS");
        assert!(!settings.serial_eval);
        assert_eq!(doc.get("EXECUTOR").and_then(Value::as_str), Some("THREADS"));
    }

    #[test]
    fn test_out_of_range_choice_is_an_error() {
        let mut doc = document(json!({"EXECUTOR": "GPU"}));
        let err = apply(&mut doc, &EnvOverrides::none()).unwrap_err();
        assert!(matches!(err, ConfigError::Environment { ref variable, .. } if variable == "EXECUTOR"));
        assert!(err.to_string().contains("SERIAL"));
    }

    #[test]
    fn test_serial_executor_sets_serial_eval() {
        let mut doc = document(json!({"EXECUTOR": "SERIAL", "MAX_WORKERS": 8}));
        let settings = apply(&mut doc, &EnvOverrides::none()).unwrap();
        assert!(settings.serial_eval);
        assert_eq!(settings.max_workers, Some(8));
    }

    #[test]
    fn test_non_integer_override_rejected() {
        let mut doc = document(json!({"EXECUTOR": "SERIAL"}));
        let overrides = EnvOverrides::from_iter([(
            "TERRAPIPE_MAX_WORKERS".to_string(),
            "many".to_string(),
        )]);
        let err = apply(&mut doc, &overrides).unwrap_err();
        assert!(err.to_string().contains("MAX_WORKERS"));
    }

    #[test]
    fn test_unprefixed_vars_are_ignored() {
        let overrides = EnvOverrides::from_iter([("PATH".to_string(), "/usr/bin".to_string())]);
        let mut doc = document(json!({"EXECUTOR": "SERIAL"}));
        let settings = apply(&mut doc, &overrides).unwrap();
        assert_eq!(settings.executor, "SERIAL");
    }
}
