//! Inspect command handler: validate, then summarize

use crate::cli::InspectArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::build_registry;
use crate::output::OutputWriter;
use terrapipe_core::{FileGenerator, PipelineConfig};
use tracing::{info, instrument};

/// Handle the inspect command
#[instrument(skip(config, output), fields(file = %args.config_file.display()))]
pub fn handle_inspect(
    args: InspectArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    if !args.config_file.exists() {
        return Err(Error::FileNotFound {
            path: args.config_file.clone(),
        });
    }

    let registry = build_registry(args.symbols.as_deref(), config)?;
    let validated = terrapipe_core::validate_file(&args.config_file, &registry)?;
    info!("Configuration validated, rendering summary");

    if args.full {
        output.data(&validated.document)?;
        return Ok(());
    }

    summarize(&validated, output)
}

fn summarize(validated: &PipelineConfig, output: &mut OutputWriter) -> Result<()> {
    let sections = &validated.sections;

    output.section("Sections")?;
    output.summary_line("readers", &entry_names(sections.readers.keys()))?;
    output.summary_line("downloads", &entry_names(sections.downloads.keys()))?;
    output.summary_line("data_sources", &entry_names(sections.data_sources.keys()))?;
    let literal_lists = sections
        .file_generators
        .values()
        .filter(|g| matches!(g, FileGenerator::Literal(_)))
        .count();
    output.summary_line(
        "file_generators",
        &format!(
            "{} ({} from literal file lists)",
            sections.file_generators.len(),
            literal_lists
        ),
    )?;
    output.summary_line("polys", &entry_names(sections.polys.keys()))?;
    output.summary_line("samplers", &entry_names(sections.samplers.keys()))?;
    output.summary_line("train", &entry_names(sections.train.keys()))?;
    output.summary_line("predict", &entry_names(sections.predict.keys()))?;

    output.section("Pipeline")?;
    for (i, step) in sections.pipeline.iter().enumerate() {
        let detail = match step.target() {
            Some(target) => format!("{} → {}", step.action, target),
            None => step.action.to_string(),
        };
        output.summary_line(&format!("step {i}"), &detail)?;
    }

    output.section("Runtime")?;
    output.summary_line("executor", &validated.settings.executor)?;
    if let Some(workers) = validated.settings.max_workers {
        output.summary_line("max_workers", &workers.to_string())?;
    }

    Ok(())
}

fn entry_names<'a>(keys: impl ExactSizeIterator<Item = &'a String>) -> String {
    let count = keys.len();
    let names: Vec<&str> = keys.map(String::as_str).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        format!("{} ({})", count, names.join(", "))
    }
}
