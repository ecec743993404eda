//! Tests for the validation engine
//!
//! Copyright (c) 2026 Terrapipe Team
//! Licensed under the Apache-2.0 license

#[cfg(test)]
mod tests {
    use crate::document::ConfigDocument;
    use crate::env::EnvOverrides;
    use crate::error::ConfigError;
    use crate::registry::SymbolRegistry;
    use crate::types::{FileGenerator, PipelineAction, PipelineConfig};
    use crate::validation::ConfigValidator;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn registry() -> SymbolRegistry {
        SymbolRegistry::with_builtins()
    }

    /// A complete minimal configuration exercising every cross-reference
    fn base_config() -> Value {
        json!({
            "readers": {
                "hdf": {
                    "load": "terrapipe.readers:hdf4_load",
                    "bounds": "terrapipe.readers:hdf4_bounds"
                }
            },
            "downloads": {
                "nasa_http": "terrapipe.downloads:http_fetch"
            },
            "data_sources": {
                "vegetation": {
                    "reader": "hdf",
                    "download": "nasa_http",
                    "band_specs": [
                        ["long_name", "Band 1 Reflectance", "band_1"],
                        ["long_name", "Band 2 Reflectance", "band_2"],
                        ["long_name", "Band 3 Reflectance", "band_3"]
                    ]
                }
            },
            "file_lists": {
                "march_scenes": ["a.hdf", "b.hdf"]
            },
            "polys": {
                "basin": {"path": "basin.geojson"}
            },
            "samplers": {
                "random": {
                    "callable": "terrapipe.samplers:random_rows",
                    "file_list": "march_scenes"
                }
            },
            "train": {
                "veg_kmeans": {
                    "model_init_func": "terrapipe.models:minibatch_kmeans",
                    "fit_func": "terrapipe.fitting:partial_fit",
                    "sampler": "random",
                    "data_source": "vegetation",
                    "output_tag": "veg"
                }
            },
            "pipeline": [
                {"train": "veg_kmeans"}
            ]
        })
    }

    fn validate(value: Value) -> Result<PipelineConfig, ConfigError> {
        let registry = registry();
        let document = ConfigDocument::from_value_with_env(value, &EnvOverrides::none())?;
        ConfigValidator::new(document, &registry).run()
    }

    fn edit(mut value: Value, f: impl FnOnce(&mut Value)) -> Value {
        f(&mut value);
        value
    }

    #[test]
    fn test_base_config_validates() {
        let config = validate(base_config()).unwrap();
        assert_eq!(config.sections.readers.len(), 1);
        assert_eq!(config.sections.train.len(), 1);
        assert_eq!(config.sections.pipeline.len(), 1);
        assert_eq!(config.sections.pipeline[0].action, PipelineAction::Train);
        assert_eq!(config.sections.pipeline[0].target(), Some("veg_kmeans"));
    }

    #[test]
    fn test_missing_readers_names_section() {
        let config = edit(base_config(), |c| {
            c.as_object_mut().unwrap().remove("readers");
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("readers"), "{err}");
    }

    #[test]
    fn test_missing_samplers_names_section() {
        let config = edit(base_config(), |c| {
            c.as_object_mut().unwrap().remove("samplers");
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("samplers"), "{err}");
    }

    #[test]
    fn test_missing_pipeline_names_section() {
        let config = edit(base_config(), |c| {
            c.as_object_mut().unwrap().remove("pipeline");
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("pipeline"), "{err}");
    }

    #[test]
    fn test_wrong_container_type_rejected() {
        let config = edit(base_config(), |c| {
            c["data_sources"] = json!(["not", "a", "mapping"]);
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Structural { ref section, .. } if section == "data_sources"));
    }

    #[test]
    fn test_dangling_reader_reference() {
        let config = edit(base_config(), |c| {
            c["data_sources"]["vegetation"]["reader"] = json!("netcdf");
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Reference { .. }));
        assert!(err.to_string().contains("netcdf"));
    }

    #[test]
    fn test_empty_download_is_allowed() {
        let config = edit(base_config(), |c| {
            c["data_sources"]["vegetation"]["download"] = json!("");
        });
        let validated = validate(config).unwrap();
        assert!(validated.sections.data_sources["vegetation"].download.is_none());
    }

    #[test]
    fn test_band_spec_with_two_strings_rejected() {
        let config = edit(base_config(), |c| {
            c["data_sources"]["vegetation"]["band_specs"] = json!([["long_name", "Band 1"]]);
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("3 strings"), "{err}");
    }

    #[test]
    fn test_unresolved_callable_fails_with_context() {
        let config = edit(base_config(), |c| {
            c["readers"]["hdf"]["load"] = json!("terrapipe.readers:does_not_exist");
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Resolution { .. }));
        assert!(err.to_string().contains("readers:hdf - load"), "{err}");
    }

    #[test]
    fn test_file_list_becomes_generator() {
        let config = validate(base_config()).unwrap();
        match &config.sections.file_generators["march_scenes"] {
            FileGenerator::Literal(items) => assert_eq!(items.len(), 2),
            other => panic!("expected a literal generator, got {other:?}"),
        }
    }

    #[test]
    fn test_sampler_with_both_file_sources_rejected() {
        let config = edit(base_config(), |c| {
            c["samplers"]["random"]["file_generator"] = json!("march_scenes");
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("not both"), "{err}");
    }

    #[test]
    fn test_sampler_with_neither_file_source_rejected() {
        let config = edit(base_config(), |c| {
            c["samplers"]["random"].as_object_mut().unwrap().remove("file_list");
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Constraint { .. }));
    }

    #[test]
    fn test_sampler_with_dangling_generator_rejected() {
        let config = edit(base_config(), |c| {
            c["samplers"]["random"]["file_list"] = json!("april_scenes");
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Reference { .. }));
        assert!(err.to_string().contains("april_scenes"));
    }

    #[test]
    fn test_sampler_numeric_defaults_filled_in() {
        let config = validate(base_config()).unwrap();
        let sampler = &config.sections.samplers["random"];
        assert_eq!(sampler.n_rows_per_sample, 500_000);
        assert_eq!(sampler.files_per_sample, 10);
        // The normalized document carries them too
        assert_eq!(
            config.document["samplers"]["random"]["n_rows_per_sample"],
            json!(500_000)
        );
    }

    #[test]
    fn test_sampler_negative_rows_rejected() {
        let config = edit(base_config(), |c| {
            c["samplers"]["random"]["n_rows_per_sample"] = json!(-5);
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("non-negative"), "{err}");
    }

    #[test]
    fn test_geo_filter_poly_references_checked() {
        let config = edit(base_config(), |c| {
            c["samplers"]["random"]["selection_kwargs"] = json!({
                "geo_filter": {"include_polys": ["not_a_poly"]}
            });
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Reference { ref section, .. } if section == "polys"));
    }

    #[test]
    fn test_geo_filter_with_known_polys_passes() {
        let config = edit(base_config(), |c| {
            c["samplers"]["random"]["selection_kwargs"] = json!({
                "geo_filter": {"include_polys": ["basin"], "exclude_polys": []},
                "data_filter": "terrapipe.filters:nodata_filter"
            });
        });
        let validated = validate(config).unwrap();
        let selection = config_selection(&validated);
        assert_eq!(selection.geo_filter.include_polys, vec!["basin"]);
        assert!(selection.data_filter.is_some());
    }

    #[test]
    fn test_absent_filters_removed_from_document() {
        let config = edit(base_config(), |c| {
            c["samplers"]["random"]["selection_kwargs"] = json!({
                "geo_filter": {"include_polys": ["basin"]},
                "data_filter": null,
                "metadata_filter": ""
            });
        });
        let validated = validate(config).unwrap();
        let kwargs = validated.document["samplers"]["random"]["selection_kwargs"]
            .as_object()
            .unwrap();
        assert!(!kwargs.contains_key("data_filter"));
        assert!(!kwargs.contains_key("metadata_filter"));
        assert!(!kwargs.contains_key("filename_filter"));
        let selection = config_selection(&validated);
        assert!(selection.data_filter.is_none());
    }

    fn config_selection(config: &PipelineConfig) -> &crate::types::SelectionKwargs {
        config.sections.samplers["random"]
            .selection
            .as_ref()
            .expect("selection kwargs validated")
    }

    #[test]
    fn test_non_empty_placeholder_section_rejected() {
        for section in ["resamplers", "aggregations", "masks", "add_features"] {
            let config = edit(base_config(), |c| {
                c[section] = json!({"anything": {}});
            });
            let err = validate(config).unwrap_err();
            assert!(
                matches!(err, ConfigError::Unimplemented { section: ref s } if s == section),
                "{section}: {err}"
            );
        }
    }

    #[test]
    fn test_train_derives_band_names_in_spec_order() {
        let config = validate(base_config()).unwrap();
        let entry = &config.sections.train["veg_kmeans"];
        assert_eq!(entry.band_names, vec!["band_1", "band_2", "band_3"]);
        assert_eq!(
            config.document["train"]["veg_kmeans"]["band_names"],
            json!(["band_1", "band_2", "band_3"])
        );
    }

    #[test]
    fn test_train_dangling_sampler_names_entry_and_sampler() {
        let config = edit(base_config(), |c| {
            c["train"]["veg_kmeans"]["sampler"] = json!("no_such_sampler");
        });
        let err = validate(config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("train:veg_kmeans"), "{message}");
        assert!(message.contains("no_such_sampler"), "{message}");
    }

    #[test]
    fn test_train_dangling_data_source_rejected() {
        let config = edit(base_config(), |c| {
            c["train"]["veg_kmeans"]["data_source"] = json!("soil");
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Reference { ref section, .. } if section == "data_sources"));
    }

    #[test]
    fn test_train_missing_output_tag_rejected() {
        let config = edit(base_config(), |c| {
            c["train"]["veg_kmeans"].as_object_mut().unwrap().remove("output_tag");
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("output_tag"), "{err}");
    }

    #[test]
    fn test_train_ensemble_kwargs_checked() {
        let config = edit(base_config(), |c| {
            c["train"]["veg_kmeans"]["ensemble_kwargs"] = json!({"n_generations": "three"});
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("n_generations"), "{err}");
    }

    #[test]
    fn test_train_kwargs_default_to_empty_mappings() {
        let config = validate(base_config()).unwrap();
        let entry = &config.document["train"]["veg_kmeans"];
        assert_eq!(entry["model_init_kwargs"], json!({}));
        assert_eq!(entry["ensemble_kwargs"], json!({}));
        assert_eq!(entry["fit_kwargs"], json!({}));
    }

    #[test]
    fn test_pipeline_step_with_two_actions_lists_allowed_keys() {
        let config = edit(base_config(), |c| {
            c["pipeline"] = json!([{"train": "veg_kmeans", "predict": "veg_kmeans"}]);
        });
        let err = validate(config).unwrap_err();
        let message = err.to_string();
        for key in ["download_data_sources", "train", "predict", "change_detection"] {
            assert!(message.contains(key), "{message}");
        }
    }

    #[test]
    fn test_pipeline_step_with_no_action_rejected() {
        let config = edit(base_config(), |c| {
            c["pipeline"] = json!([{"on_each_sample": []}]);
        });
        let err = validate(config).unwrap_err();
        assert!(err.to_string().contains("exactly one"), "{err}");
    }

    #[test]
    fn test_pipeline_undefined_train_target_rejected() {
        let config = edit(base_config(), |c| {
            c["pipeline"] = json!([{"train": "nope"}]);
        });
        let err = validate(config).unwrap_err();
        assert!(matches!(err, ConfigError::Reference { ref section, .. } if section == "train"));
    }

    #[test]
    fn test_pipeline_predict_target_checked_against_predict_section() {
        let config = edit(base_config(), |c| {
            c["predict"] = json!({"veg_map": {"data_source": "vegetation"}});
            c["pipeline"] = json!([{"train": "veg_kmeans"}, {"predict": "veg_map"}]);
        });
        let validated = validate(config).unwrap();
        assert_eq!(validated.sections.pipeline[1].target(), Some("veg_map"));

        let config = edit(base_config(), |c| {
            c["pipeline"] = json!([{"predict": "veg_map"}]);
        });
        assert!(validate(config).is_err());
    }

    #[test]
    fn test_placeholder_pipeline_actions_accept_any_payload() {
        let config = edit(base_config(), |c| {
            c["pipeline"] = json!([
                {"download_data_sources": ["vegetation"]},
                {"train": "veg_kmeans"},
                {"change_detection": {"window": 3}}
            ]);
        });
        let validated = validate(config).unwrap();
        assert_eq!(validated.sections.pipeline.len(), 3);
        assert_eq!(
            validated.sections.pipeline[0].action,
            PipelineAction::DownloadDataSources
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let first = validate(base_config()).unwrap();
        let second = validate(first.document.clone()).unwrap();
        assert_eq!(first.document, second.document);
        assert_eq!(first.sections, second.sections);
    }
}
