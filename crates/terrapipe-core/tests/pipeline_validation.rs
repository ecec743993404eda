//! End-to-end validation scenarios over complete YAML documents

use terrapipe_core::{
    validate_str, ConfigDocument, ConfigError, ConfigValidator, DocumentFormat, EnvOverrides,
    PipelineAction, SymbolRegistry,
};

const PIPELINE_YAML: &str = r#"
readers:
  hdf:
    load: terrapipe.readers:hdf4_load
    bounds: terrapipe.readers:hdf4_bounds
downloads:
  nasa_http: terrapipe.downloads:http_fetch
data_sources:
  vegetation:
    reader: hdf
    download: nasa_http
    band_specs:
      - [long_name, Band 1 Reflectance, band_1]
      - [long_name, Band 2 Reflectance, band_2]
file_lists:
  march_scenes:
    - a.hdf
    - b.hdf
samplers:
  random:
    callable: terrapipe.samplers:random_rows
    file_list: march_scenes
train:
  veg_kmeans:
    model_init_func: terrapipe.models:minibatch_kmeans
    fit_func: terrapipe.fitting:partial_fit
    sampler: random
    data_source: vegetation
    output_tag: veg
pipeline:
  - train: veg_kmeans
"#;

#[test]
fn full_document_validates_end_to_end() {
    let registry = SymbolRegistry::with_builtins();
    let config = validate_str(PIPELINE_YAML, DocumentFormat::Yaml, &registry).unwrap();

    assert_eq!(config.sections.pipeline.len(), 1);
    let step = &config.sections.pipeline[0];
    assert_eq!(step.action, PipelineAction::Train);
    assert_eq!(step.target(), Some("veg_kmeans"));

    let train = &config.sections.train["veg_kmeans"];
    assert_eq!(train.band_names, vec!["band_1", "band_2"]);
    assert_eq!(train.output_tag, "veg");
    assert_eq!(train.sampler, "random");
}

#[test]
fn dangling_train_sampler_fails_with_referential_error() {
    let document = PIPELINE_YAML.replace("sampler: random", "sampler: missing_sampler");
    let registry = SymbolRegistry::with_builtins();
    let err = validate_str(&document, DocumentFormat::Yaml, &registry).unwrap_err();

    assert!(matches!(err, ConfigError::Reference { .. }));
    let message = err.to_string();
    assert!(message.contains("train:veg_kmeans"), "{message}");
    assert!(message.contains("missing_sampler"), "{message}");
}

#[test]
fn step_with_two_actions_lists_the_allowed_keys() {
    let document = PIPELINE_YAML.replace(
        "  - train: veg_kmeans",
        "  - train: veg_kmeans\n    predict: veg_kmeans",
    );
    let registry = SymbolRegistry::with_builtins();
    let err = validate_str(&document, DocumentFormat::Yaml, &registry).unwrap_err();

    let message = err.to_string();
    for key in ["download_data_sources", "train", "predict", "change_detection"] {
        assert!(message.contains(key), "{message}");
    }
}

#[test]
fn environment_override_out_of_range_is_rejected() {
    let value: serde_json::Value = serde_yaml::from_str(PIPELINE_YAML).unwrap();
    let overrides = EnvOverrides::from_iter([(
        "TERRAPIPE_EXECUTOR".to_string(),
        "QUANTUM".to_string(),
    )]);
    let err = ConfigDocument::from_value_with_env(value, &overrides).unwrap_err();
    assert!(matches!(err, ConfigError::Environment { .. }));
    assert!(err.to_string().contains("EXECUTOR"));
}

#[test]
fn environment_override_reaches_runtime_settings() {
    let value: serde_json::Value = serde_yaml::from_str(PIPELINE_YAML).unwrap();
    let overrides = EnvOverrides::from_iter([
        ("TERRAPIPE_EXECUTOR".to_string(), "THREADS".to_string()),
        ("TERRAPIPE_MAX_WORKERS".to_string(), "16".to_string()),
    ]);
    let document = ConfigDocument::from_value_with_env(value, &overrides).unwrap();
    let registry = SymbolRegistry::with_builtins();
    let config = ConfigValidator::new(document, &registry).run().unwrap();

    assert_eq!(config.settings.executor, "THREADS");
    assert_eq!(config.settings.max_workers, Some(16));
    assert!(!config.settings.serial_eval);
}

#[test]
fn revalidating_a_normalized_document_is_stable() {
    let registry = SymbolRegistry::with_builtins();
    let first = validate_str(PIPELINE_YAML, DocumentFormat::Yaml, &registry).unwrap();

    let document =
        ConfigDocument::from_value_with_env(first.document.clone(), &EnvOverrides::none()).unwrap();
    let second = ConfigValidator::new(document, &registry).run().unwrap();

    assert_eq!(first.document, second.document);
    assert_eq!(first.sections, second.sections);
}

#[test]
fn user_symbol_table_extends_the_registry() {
    let document = PIPELINE_YAML.replace(
        "terrapipe.models:minibatch_kmeans",
        "my_models:streaming_forest",
    );
    let builtin_only = SymbolRegistry::with_builtins();
    assert!(validate_str(&document, DocumentFormat::Yaml, &builtin_only).is_err());

    let mut registry = SymbolRegistry::with_builtins();
    registry.register("my_models:streaming_forest").unwrap();
    assert!(validate_str(&document, DocumentFormat::Yaml, &registry).is_ok());
}
