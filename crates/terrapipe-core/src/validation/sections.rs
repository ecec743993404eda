//! Section validators for the simpler top-level sections
//!
//! Each function validates one section: structural checks first, then
//! per-entry rules, then the normalized section is stored both back
//! into the document and as a typed field on the partial result.
//!
//! Copyright (c) 2026 Terrapipe Team
//! Licensed under the Apache-2.0 license

use crate::error::{ConfigError, Result};
use crate::types::{BandSpec, DataSource, FileGenerator, ReaderSpec};
use crate::validation::core::{json_kind, ConfigValidator};
use crate::validation::ValidationContext;
use serde_json::{Map, Value};

/// readers: name → {load, bounds}, both required callables
pub(crate) fn validate_readers(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.mapping_section("readers", true)?;
    let context = ValidationContext::section("readers");
    for (name, entry) in &raw {
        let entry_ctx = context.entry(name);
        let entry = entry_mapping(entry, &entry_ctx)?;
        let load = v
            .registry()
            .resolve_required(entry.get("load"), entry_ctx.field("load").as_str())?;
        let bounds = v
            .registry()
            .resolve_required(entry.get("bounds"), entry_ctx.field("bounds").as_str())?;
        v.validated
            .readers
            .insert(name.clone(), ReaderSpec { load, bounds });
    }
    v.store_mapping("readers", raw);
    Ok(())
}

/// downloads: name → callable reference; the section may be empty when
/// every source file already exists locally
pub(crate) fn validate_downloads(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.mapping_section("downloads", false)?;
    let context = ValidationContext::section("downloads");
    for (name, reference) in &raw {
        let symbol = v
            .registry()
            .resolve_required(Some(reference), context.entry(name).as_str())?;
        v.validated.downloads.insert(name.clone(), symbol);
    }
    v.store_mapping("downloads", raw);
    Ok(())
}

/// data_sources: name → {reader, download, band_specs}
pub(crate) fn validate_data_sources(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.mapping_section("data_sources", true)?;
    let context = ValidationContext::section("data_sources");
    for (name, entry) in &raw {
        let entry_ctx = context.entry(name);
        let entry = entry_mapping(entry, &entry_ctx)?;

        let reader = required_string(entry.get("reader"), &entry_ctx.field("reader"))?;
        if !v.validated.readers.contains_key(&reader) {
            return Err(ConfigError::reference(entry_ctx.as_str(), "readers", reader));
        }

        let download = optional_string(entry.get("download"), &entry_ctx.field("download"))?;
        if let Some(download) = &download {
            if !v.validated.downloads.contains_key(download) {
                return Err(ConfigError::reference(
                    entry_ctx.as_str(),
                    "downloads",
                    download.clone(),
                ));
            }
        }

        let band_specs = validate_band_specs(entry.get("band_specs"), &entry_ctx)?;
        v.validated.data_sources.insert(
            name.clone(),
            DataSource {
                reader,
                download,
                band_specs,
            },
        );
    }
    v.store_mapping("data_sources", raw);
    Ok(())
}

/// band_specs: a non-empty list of 3-string tuples
fn validate_band_specs(value: Option<&Value>, entry_ctx: &ValidationContext) -> Result<Vec<BandSpec>> {
    let context = entry_ctx.field("band_specs");
    let specs = match value {
        Some(Value::Array(list)) if !list.is_empty() => list,
        other => {
            return Err(ConfigError::constraint(
                context.as_str(),
                format!(
                    "expected a non-empty list of band specs, got {}",
                    other.map(json_kind).unwrap_or("nothing")
                ),
            ));
        }
    };
    let mut out = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let strings: Option<Vec<&str>> = spec
            .as_array()
            .filter(|parts| parts.len() == 3)
            .and_then(|parts| parts.iter().map(Value::as_str).collect::<Option<Vec<_>>>());
        let strings = strings.ok_or_else(|| {
            ConfigError::constraint(
                context.index(i).as_str(),
                "each band spec needs 3 strings: metadata key search phrase, \
                 metadata value search phrase, band name",
            )
        })?;
        out.push(BandSpec {
            search_key: strings[0].to_string(),
            search_value: strings[1].to_string(),
            band_name: strings[2].to_string(),
        });
    }
    Ok(out)
}

/// file_generators: name → callable reference
pub(crate) fn validate_file_generators(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.mapping_section("file_generators", false)?;
    let context = ValidationContext::section("file_generators");
    for (name, reference) in &raw {
        let symbol = v
            .registry()
            .resolve_required(Some(reference), context.entry(name).as_str())?;
        v.validated
            .file_generators
            .insert(name.clone(), FileGenerator::Callable(symbol));
    }
    v.store_mapping("file_generators", raw);
    Ok(())
}

/// file_lists: name → literal list, folded into the file generators so
/// samplers can reference either kind by one name set
pub(crate) fn validate_file_lists(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.mapping_section("file_lists", false)?;
    let context = ValidationContext::section("file_lists");
    for (name, entry) in &raw {
        let items = match entry {
            Value::Array(items) => items.clone(),
            other => {
                return Err(ConfigError::constraint(
                    context.entry(name).as_str(),
                    format!("expected a list of files, got {}", json_kind(other)),
                ));
            }
        };
        v.validated
            .file_generators
            .insert(name.clone(), FileGenerator::Literal(items.clone()));
        v.validated.file_lists.insert(name.clone(), items);
    }
    v.store_mapping("file_lists", raw);
    Ok(())
}

/// polys: entries accepted as-is; how a poly is loaded is a concern of
/// the execution layer
pub(crate) fn validate_polys(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.mapping_section("polys", false)?;
    for (name, poly) in &raw {
        v.validated.polys.insert(name.clone(), poly.clone());
    }
    v.store_mapping("polys", raw);
    Ok(())
}

/// predict: entries accepted as-is, exposed for pipeline
/// cross-referencing
pub(crate) fn validate_predict(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.mapping_section("predict", false)?;
    for (name, entry) in &raw {
        v.validated.predict.insert(name.clone(), entry.clone());
    }
    v.store_mapping("predict", raw);
    Ok(())
}

pub(crate) fn validate_resamplers(v: &mut ConfigValidator<'_>) -> Result<()> {
    placeholder_section(v, "resamplers")
}

pub(crate) fn validate_aggregations(v: &mut ConfigValidator<'_>) -> Result<()> {
    placeholder_section(v, "aggregations")
}

pub(crate) fn validate_masks(v: &mut ConfigValidator<'_>) -> Result<()> {
    placeholder_section(v, "masks")
}

pub(crate) fn validate_add_features(v: &mut ConfigValidator<'_>) -> Result<()> {
    placeholder_section(v, "add_features")
}

/// Placeholder sections are accepted only while empty; a non-empty
/// body must not silently succeed.
fn placeholder_section(v: &mut ConfigValidator<'_>, name: &str) -> Result<()> {
    let raw = v.mapping_section(name, false)?;
    if !raw.is_empty() {
        return Err(ConfigError::Unimplemented {
            section: name.to_string(),
        });
    }
    v.store_mapping(name, raw);
    Ok(())
}

// Shared field helpers

/// An entry that must itself be a mapping
pub(crate) fn entry_mapping<'a>(
    value: &'a Value,
    context: &ValidationContext,
) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        ConfigError::constraint(
            context.as_str(),
            format!("expected a mapping, got {}", json_kind(value)),
        )
    })
}

/// A field that must be a non-empty string
pub(crate) fn required_string(value: Option<&Value>, context: &ValidationContext) -> Result<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        other => Err(ConfigError::constraint(
            context.as_str(),
            format!(
                "expected a non-empty string, got {}",
                other.map(json_kind).unwrap_or("nothing")
            ),
        )),
    }
}

/// A field that may be absent, null, or an empty string, all treated
/// as unset
pub(crate) fn optional_string(
    value: Option<&Value>,
    context: &ValidationContext,
) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ConfigError::constraint(
            context.as_str(),
            format!("expected a string, got {}", json_kind(other)),
        )),
    }
}

/// A numeric field that must be a non-negative integer when present
pub(crate) fn non_negative_int(
    value: Option<&Value>,
    context: &ValidationContext,
) -> Result<Option<u64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ConfigError::constraint(
                context.as_str(),
                format!("expected a non-negative integer, got {value}"),
            )
        }),
    }
}
