//! Training-entry validation
//!
//! Copyright (c) 2026 Terrapipe Team
//! Licensed under the Apache-2.0 license

use crate::error::{ConfigError, Result};
use crate::types::TrainEntry;
use crate::validation::core::{json_kind, ConfigValidator};
use crate::validation::sections::{non_negative_int, required_string};
use crate::validation::ValidationContext;
use serde_json::{Map, Value};

/// Kwargs fields that default to an empty mapping
const KWARGS_FIELDS: [&str; 3] = ["model_init_kwargs", "ensemble_kwargs", "fit_kwargs"];

/// train: name → model/fit callables, kwargs, sampler and data-source
/// references, output tag, and the derived band-name order
pub(crate) fn validate_train(v: &mut ConfigValidator<'_>) -> Result<()> {
    let mut raw = v.mapping_section("train", false)?;
    let context = ValidationContext::section("train");

    let mut validated = Vec::with_capacity(raw.len());
    for (name, entry) in raw.iter_mut() {
        let entry_ctx = context.entry(name);
        let entry = match entry.as_object_mut() {
            Some(map) => map,
            None => {
                return Err(ConfigError::constraint(
                    entry_ctx.as_str(),
                    "expected a mapping describing the training entry",
                ));
            }
        };
        validated.push((name.clone(), validate_one_entry(entry, v, &entry_ctx)?));
    }
    for (name, entry) in validated {
        v.validated.train.insert(name, entry);
    }
    v.store_mapping("train", raw);
    Ok(())
}

fn validate_one_entry(
    entry: &mut Map<String, Value>,
    v: &ConfigValidator<'_>,
    entry_ctx: &ValidationContext,
) -> Result<TrainEntry> {
    let registry = v.registry();
    let model_selector_func = registry.resolve(
        entry.get("model_selector_func"),
        false,
        entry_ctx.field("model_selector_func").as_str(),
    )?;
    let model_init_func = registry.resolve_required(
        entry.get("model_init_func"),
        entry_ctx.field("model_init_func").as_str(),
    )?;
    let post_fit_func = registry.resolve(
        entry.get("post_fit_func"),
        false,
        entry_ctx.field("post_fit_func").as_str(),
    )?;
    let fit_func = registry.resolve_required(
        entry.get("fit_func"),
        entry_ctx.field("fit_func").as_str(),
    )?;

    let [model_init_kwargs, ensemble_kwargs, fit_kwargs] =
        KWARGS_FIELDS.map(|field| kwargs_mapping(entry, field, entry_ctx));
    let (model_init_kwargs, ensemble_kwargs, fit_kwargs) =
        (model_init_kwargs?, ensemble_kwargs?, fit_kwargs?);

    for field in ["no_shuffle", "n_generations"] {
        non_negative_int(
            ensemble_kwargs.get(field),
            &entry_ctx.field("ensemble_kwargs").field(field),
        )?;
    }

    let sampler = required_string(entry.get("sampler"), &entry_ctx.field("sampler"))?;
    if !v.validated.samplers.contains_key(&sampler) {
        return Err(ConfigError::reference(entry_ctx.as_str(), "samplers", sampler));
    }
    let data_source = required_string(entry.get("data_source"), &entry_ctx.field("data_source"))?;
    let source = match v.validated.data_sources.get(&data_source) {
        Some(source) => source,
        None => {
            return Err(ConfigError::reference(
                entry_ctx.as_str(),
                "data_sources",
                data_source,
            ));
        }
    };

    let output_tag = required_string(entry.get("output_tag"), &entry_ctx.field("output_tag"))?;

    // The derived band order: positional, straight from the band specs
    let band_names = source.band_names();
    entry.insert(
        "band_names".to_string(),
        Value::Array(band_names.iter().cloned().map(Value::String).collect()),
    );

    let ml_features = match entry.get("ml_features") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(ConfigError::constraint(
                entry_ctx.field("ml_features").as_str(),
                format!("expected a list, got {}", json_kind(other)),
            ));
        }
    };
    entry.insert("ml_features".to_string(), Value::Array(ml_features.clone()));

    Ok(TrainEntry {
        model_init_func,
        fit_func,
        model_selector_func,
        post_fit_func,
        model_init_kwargs,
        ensemble_kwargs,
        fit_kwargs,
        sampler,
        data_source,
        output_tag,
        band_names,
        ml_features,
    })
}

/// A kwargs field defaults to an empty mapping and must be a mapping;
/// the normalized form is written back into the entry
fn kwargs_mapping(
    entry: &mut Map<String, Value>,
    field: &str,
    entry_ctx: &ValidationContext,
) -> Result<Map<String, Value>> {
    let map = match entry.get(field) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(ConfigError::constraint(
                entry_ctx.field(field).as_str(),
                format!("expected a mapping, got {}", json_kind(other)),
            ));
        }
    };
    entry.insert(field.to_string(), Value::Object(map.clone()));
    Ok(map)
}
