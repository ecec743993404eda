//! Validation command handler

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::build_registry;
use crate::output::OutputWriter;
use tracing::{debug, error, info, instrument};

/// Handle the validate command
#[instrument(skip(config, output), fields(file = %args.config_file.display()))]
pub fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    info!("Starting validation");
    output.info(&format!(
        "Validating pipeline configuration: {}",
        args.config_file.display()
    ))?;

    if !args.config_file.exists() {
        error!("File not found: {}", args.config_file.display());
        return Err(Error::FileNotFound {
            path: args.config_file.clone(),
        });
    }

    let registry = build_registry(args.symbols.as_deref(), config)?;
    debug!(symbols = registry.len(), "symbol registry ready");

    match terrapipe_core::validate_file(&args.config_file, &registry) {
        Ok(validated) => {
            info!("Validation completed successfully");
            output.success("✓ Configuration is valid")?;
            output.info(&format!(
                "{} data source(s), {} sampler(s), {} train entr(ies), {} pipeline step(s)",
                validated.sections.data_sources.len(),
                validated.sections.samplers.len(),
                validated.sections.train.len(),
                validated.sections.pipeline.len(),
            ))?;

            if args.detailed {
                output.section("Normalized Configuration")?;
                output.data(&validated.document)?;
            }
            Ok(())
        }
        Err(config_error) => {
            error!("Validation failed: {}", config_error);
            output.error("✗ Configuration validation failed")?;
            output.error(&format!("  {}", config_error))?;
            Err(config_error.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::Write;
    use std::path::PathBuf;

    const VALID_PIPELINE: &str = r#"
readers:
  hdf:
    load: terrapipe.readers:hdf4_load
    bounds: terrapipe.readers:hdf4_bounds
data_sources:
  vegetation:
    reader: hdf
    band_specs:
      - [long_name, Band 1 Reflectance, band_1]
file_lists:
  scenes: [a.hdf]
samplers:
  random:
    callable: terrapipe.samplers:random_rows
    file_list: scenes
train:
  model:
    model_init_func: terrapipe.models:minibatch_kmeans
    fit_func: terrapipe.fitting:partial_fit
    sampler: random
    data_source: vegetation
    output_tag: veg
pipeline:
  - train: model
"#;

    fn sink_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(std::io::sink()))
    }

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("pipeline.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_valid_document_passes() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            config_file: write_config(&dir, VALID_PIPELINE),
            symbols: None,
            detailed: false,
        };
        handle_validate(args, &Config::default(), &mut sink_output()).unwrap();
    }

    #[test]
    fn test_invalid_document_surfaces_core_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = VALID_PIPELINE.replace("sampler: random", "sampler: nope");
        let args = ValidateArgs {
            config_file: write_config(&dir, &broken),
            symbols: None,
            detailed: false,
        };
        let err = handle_validate(args, &Config::default(), &mut sink_output()).unwrap_err();
        assert!(matches!(err, Error::Core(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_missing_file_reported() {
        let args = ValidateArgs {
            config_file: PathBuf::from("/no/such/pipeline.yaml"),
            symbols: None,
            detailed: false,
        };
        let err = handle_validate(args, &Config::default(), &mut sink_output()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
