//! Sampler and selection-filter validation
//!
//! Samplers are the most constrained section: numeric defaults come
//! from the global defaults table, exactly one of the two file-source
//! fields must be set, and selection filters cross-reference the polys
//! section and the symbol registry.
//!
//! Copyright (c) 2026 Terrapipe Team
//! Licensed under the Apache-2.0 license

use crate::defaults::{
    DEFAULT_FILES_PER_SAMPLE, DEFAULT_N_ROWS_PER_SAMPLE, SAMPLER_DEFAULTS_KEY,
};
use crate::error::{ConfigError, Result};
use crate::registry::Symbol;
use crate::types::{GeoFilter, Sampler, SelectionKwargs};
use crate::validation::core::{json_kind, ConfigValidator};
use crate::validation::sections::{non_negative_int, optional_string};
use crate::validation::ValidationContext;
use serde_json::{Map, Value};

const FILTER_FIELDS: [&str; 3] = ["data_filter", "metadata_filter", "filename_filter"];
const POLY_FIELDS: [&str; 2] = ["include_polys", "exclude_polys"];

/// samplers: name → {callable, n_rows_per_sample, files_per_sample,
/// file_generator | file_list, selection_kwargs?}
pub(crate) fn validate_samplers(v: &mut ConfigValidator<'_>) -> Result<()> {
    let mut raw = v.mapping_section("samplers", true)?;
    let (default_rows, default_files) = sampler_defaults(v)?;
    let context = ValidationContext::section("samplers");

    let mut validated = Vec::with_capacity(raw.len());
    for (name, entry) in raw.iter_mut() {
        let entry_ctx = context.entry(name);
        let entry = match entry.as_object_mut() {
            Some(map) => map,
            None => {
                return Err(ConfigError::constraint(
                    entry_ctx.as_str(),
                    "expected a mapping describing the sampler",
                ));
            }
        };

        let callable = v
            .registry()
            .resolve_required(entry.get("callable"), entry_ctx.as_str())?;

        // Fill numeric defaults into the document, then check them
        let n_rows = non_negative_int(
            entry.get("n_rows_per_sample"),
            &entry_ctx.field("n_rows_per_sample"),
        )?
        .unwrap_or(default_rows);
        let files = non_negative_int(
            entry.get("files_per_sample"),
            &entry_ctx.field("files_per_sample"),
        )?
        .unwrap_or(default_files);
        entry.insert("n_rows_per_sample".to_string(), Value::from(n_rows));
        entry.insert("files_per_sample".to_string(), Value::from(files));

        let file_generator = file_source(entry, v, &entry_ctx)?;
        let selection = validate_selection_kwargs(entry, v, &entry_ctx)?;

        validated.push((
            name.clone(),
            Sampler {
                callable,
                n_rows_per_sample: n_rows,
                files_per_sample: files,
                file_generator,
                selection,
            },
        ));
    }
    for (name, sampler) in validated {
        v.validated.samplers.insert(name, sampler);
    }
    v.store_mapping("samplers", raw);
    Ok(())
}

/// Numeric defaults from the merged document's global table
fn sampler_defaults(v: &ConfigValidator<'_>) -> Result<(u64, u64)> {
    let context = ValidationContext::section(SAMPLER_DEFAULTS_KEY);
    let table = match v.document.get(SAMPLER_DEFAULTS_KEY) {
        None | Some(Value::Null) => return Ok((DEFAULT_N_ROWS_PER_SAMPLE, DEFAULT_FILES_PER_SAMPLE)),
        Some(Value::Object(table)) => table,
        Some(other) => {
            return Err(ConfigError::structural(
                SAMPLER_DEFAULTS_KEY,
                format!("expected a mapping, got {}", json_kind(other)),
            ));
        }
    };
    let rows = non_negative_int(
        table.get("n_rows_per_sample"),
        &context.field("n_rows_per_sample"),
    )?
    .unwrap_or(DEFAULT_N_ROWS_PER_SAMPLE);
    let files = non_negative_int(
        table.get("files_per_sample"),
        &context.field("files_per_sample"),
    )?
    .unwrap_or(DEFAULT_FILES_PER_SAMPLE);
    Ok((rows, files))
}

/// Exactly one of file_generator/file_list, naming a merged generator
fn file_source(
    entry: &Map<String, Value>,
    v: &ConfigValidator<'_>,
    entry_ctx: &ValidationContext,
) -> Result<String> {
    let file_gen = optional_string(entry.get("file_generator"), &entry_ctx.field("file_generator"))?;
    let file_list = optional_string(entry.get("file_list"), &entry_ctx.field("file_list"))?;
    let name = match (file_gen, file_list) {
        (Some(name), None) | (None, Some(name)) => name,
        _ => {
            return Err(ConfigError::constraint(
                entry_ctx.as_str(),
                "expected either (and not both of) \"file_generator\": \"some_name\" \
                 or \"file_list\": \"some_name\"",
            ));
        }
    };
    if !v.validated.file_generators.contains_key(&name) {
        return Err(ConfigError::reference(
            entry_ctx.as_str(),
            "file_generators",
            name,
        ));
    }
    Ok(name)
}

/// selection_kwargs: geo-filter poly references plus optional named
/// filter callables; absent filters are removed from the document so
/// no empty-filter entries persist
fn validate_selection_kwargs(
    entry: &mut Map<String, Value>,
    v: &ConfigValidator<'_>,
    entry_ctx: &ValidationContext,
) -> Result<Option<SelectionKwargs>> {
    let mut selection = match entry.get("selection_kwargs") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(map)) if map.is_empty() => return Ok(None),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(ConfigError::constraint(
                entry_ctx.field("selection_kwargs").as_str(),
                format!("expected a mapping, got {}", json_kind(other)),
            ));
        }
    };
    let context = ValidationContext::section("selection_kwargs").entry(entry_ctx.as_str());

    let geo_filter = validate_geo_filter(&mut selection, v, &context)?;

    let mut filters: [Option<Symbol>; 3] = [None, None, None];
    for (slot, field) in filters.iter_mut().zip(FILTER_FIELDS) {
        let is_set = selection
            .get(field)
            .map(|f| !f.is_null() && f.as_str() != Some(""))
            .unwrap_or(false);
        if is_set {
            let symbol = v
                .registry()
                .resolve_required(selection.get(field), context.field(field).as_str())?;
            *slot = Some(symbol);
        } else {
            selection.remove(field);
        }
    }
    let [data_filter, metadata_filter, filename_filter] = filters;

    entry.insert("selection_kwargs".to_string(), Value::Object(selection));
    Ok(Some(SelectionKwargs {
        geo_filter,
        data_filter,
        metadata_filter,
        filename_filter,
    }))
}

/// include_polys/exclude_polys must reference keys of the polys section
fn validate_geo_filter(
    selection: &mut Map<String, Value>,
    v: &ConfigValidator<'_>,
    context: &ValidationContext,
) -> Result<GeoFilter> {
    let geo = match selection.get("geo_filter") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(ConfigError::constraint(
                context.field("geo_filter").as_str(),
                format!("expected a mapping, got {}", json_kind(other)),
            ));
        }
    };

    let mut lists: [Vec<String>; 2] = [Vec::new(), Vec::new()];
    for (list, field) in lists.iter_mut().zip(POLY_FIELDS) {
        let field_ctx = context.field(field);
        let names = match geo.get(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                return Err(ConfigError::constraint(
                    field_ctx.as_str(),
                    format!("expected a list of poly names, got {}", json_kind(other)),
                ));
            }
        };
        for name in names {
            let name = match name.as_str() {
                Some(s) => s.to_string(),
                None => {
                    return Err(ConfigError::constraint(
                        field_ctx.as_str(),
                        format!("expected a poly name string, got {}", json_kind(&name)),
                    ));
                }
            };
            if !v.validated.polys.contains_key(&name) {
                return Err(ConfigError::reference(field_ctx.as_str(), "polys", name));
            }
            list.push(name);
        }
    }
    let [include_polys, exclude_polys] = lists;

    selection.insert("geo_filter".to_string(), Value::Object(geo));
    Ok(GeoFilter {
        include_polys,
        exclude_polys,
    })
}
