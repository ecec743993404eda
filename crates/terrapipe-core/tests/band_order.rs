//! Property test: derived band names preserve band-spec order

use proptest::prelude::*;
use serde_json::json;
use terrapipe_core::{ConfigDocument, ConfigValidator, EnvOverrides, SymbolRegistry};

fn config_with_band_specs(band_names: &[String]) -> serde_json::Value {
    let band_specs: Vec<_> = band_names
        .iter()
        .map(|name| json!(["long_name", format!("Band {name}"), name]))
        .collect();
    json!({
        "readers": {
            "hdf": {
                "load": "terrapipe.readers:hdf4_load",
                "bounds": "terrapipe.readers:hdf4_bounds"
            }
        },
        "data_sources": {
            "source": {
                "reader": "hdf",
                "band_specs": band_specs
            }
        },
        "file_lists": {"files": ["a.hdf"]},
        "samplers": {
            "random": {
                "callable": "terrapipe.samplers:random_rows",
                "file_list": "files"
            }
        },
        "train": {
            "model": {
                "model_init_func": "terrapipe.models:sgd_classifier",
                "fit_func": "terrapipe.fitting:partial_fit",
                "sampler": "random",
                "data_source": "source",
                "output_tag": "out"
            }
        },
        "pipeline": [{"train": "model"}]
    })
}

proptest! {
    #[test]
    fn band_names_round_trip_in_order(
        names in proptest::collection::vec("[a-z][a-z0-9_]{0,11}", 1..12)
    ) {
        let registry = SymbolRegistry::with_builtins();
        let document = ConfigDocument::from_value_with_env(
            config_with_band_specs(&names),
            &EnvOverrides::none(),
        ).unwrap();
        let config = ConfigValidator::new(document, &registry).run().unwrap();

        prop_assert_eq!(&config.sections.train["model"].band_names, &names);
        prop_assert_eq!(
            &config.sections.data_sources["source"].band_names(),
            &names
        );
    }
}
