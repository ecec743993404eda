//! Pipeline step validation
//!
//! The pipeline is an ordered list of action mappings. Each step must
//! carry exactly one of the four recognized action keys; the step then
//! dispatches to its action-specific sub-validator.
//!
//! Copyright (c) 2026 Terrapipe Team
//! Licensed under the Apache-2.0 license

use crate::error::{ConfigError, Result};
use crate::types::{PipelineAction, PipelineStep};
use crate::validation::core::{json_kind, ConfigValidator};
use crate::validation::ValidationContext;
use serde_json::Value;

/// pipeline: a non-empty list of single-action steps
pub(crate) fn validate_pipeline(v: &mut ConfigValidator<'_>) -> Result<()> {
    let raw = v.sequence_section("pipeline", true)?;
    let context = ValidationContext::section("pipeline");

    let mut steps = Vec::with_capacity(raw.len());
    for (i, step) in raw.iter().enumerate() {
        let step_ctx = context.index(i);
        let step = step.as_object().ok_or_else(|| {
            ConfigError::constraint(
                step_ctx.as_str(),
                format!("expected an action mapping, got {}", json_kind(step)),
            )
        })?;

        let mut found = PipelineAction::ALL
            .into_iter()
            .filter(|action| step.contains_key(action.key()));
        let action = match (found.next(), found.next()) {
            (Some(action), None) => action,
            _ => {
                return Err(ConfigError::constraint(
                    step_ctx.as_str(),
                    format!(
                        "expected exactly one of the following keys in each \
                         pipeline action mapping: {}",
                        PipelineAction::allowed_keys()
                    ),
                ));
            }
        };

        let payload = step.get(action.key()).cloned().unwrap_or(Value::Null);
        let on_each_sample = match action {
            PipelineAction::Train => {
                validate_step_target(v, &payload, "train", &step_ctx)?;
                validate_on_each_sample(step.get("on_each_sample"), &step_ctx)?
            }
            PipelineAction::Predict => {
                validate_step_target(v, &payload, "predict", &step_ctx)?;
                validate_on_each_sample(step.get("on_each_sample"), &step_ctx)?
            }
            // Placeholder actions accept any well-typed input
            PipelineAction::DownloadDataSources | PipelineAction::ChangeDetection => Vec::new(),
        };

        steps.push(PipelineStep {
            action,
            payload,
            on_each_sample,
        });
    }

    v.validated.pipeline = steps;
    v.store_sequence("pipeline", raw);
    Ok(())
}

/// A train/predict step references a key of the corresponding section
fn validate_step_target(
    v: &ConfigValidator<'_>,
    payload: &Value,
    section: &str,
    step_ctx: &ValidationContext,
) -> Result<()> {
    let name = payload.as_str().ok_or_else(|| {
        ConfigError::constraint(
            step_ctx.field(section).as_str(),
            format!("expected a {section} entry name, got {}", json_kind(payload)),
        )
    })?;
    let defined = match section {
        "train" => v.validated.train.contains_key(name),
        _ => v.validated.predict.contains_key(name),
    };
    if !defined {
        return Err(ConfigError::reference(step_ctx.as_str(), section, name));
    }
    Ok(())
}

/// Per-sample post-processing hooks: any list is accepted and passed
/// through; resampling/aggregation semantics live with the (not yet
/// implemented) execution stages
fn validate_on_each_sample(
    value: Option<&Value>,
    step_ctx: &ValidationContext,
) -> Result<Vec<Value>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(ConfigError::constraint(
            step_ctx.field("on_each_sample").as_str(),
            format!("expected a list of per-sample operations, got {}", json_kind(other)),
        )),
    }
}
