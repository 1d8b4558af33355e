//! Tests for architecture files and network assembly
//!
//! This file tests the architecture module including:
//! - Loading JSON architecture files
//! - Building networks with shape inference
//! - Programmatic fields filled in during assembly
//! - Handling invalid JSON and missing files
//! - Per-layer error reporting

use std::io::Write;
use tempfile::NamedTempFile;
use weka_dl4j_layers::architecture::{
    build_model, load_architecture, InputType, NetworkBuilder, OptionTokens,
};
use weka_dl4j_layers::config::NetworkConfiguration;
use weka_dl4j_layers::layers::choices::{ConvolutionMode, Updater};
use weka_dl4j_layers::layers::{
    BaseLayerOptions, ConvolutionLayer, DenseLayer, OutputLayer, SubsamplingLayer,
};
use weka_dl4j_layers::options::{ObjectState, Value};
use weka_dl4j_layers::ConfigError;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

const LENET: &str = r#"{
  "network": "-seed 42 -updater NESTEROVS -learningRate 0.01",
  "input": { "type": "convolutional", "height": 28, "width": 28, "channels": 1 },
  "num_classes": 10,
  "layers": [
    { "layer_type": "convolution", "options": "-nFilters 20 -name conv1" },
    { "layer_type": "subsampling" },
    { "layer_type": "convolution", "options": ["-nFilters", "50"] },
    { "layer_type": "subsampling", "options": "-poolingType MAX" },
    { "layer_type": "dense", "options": "-nOut 500 -activation RELU" },
    { "layer_type": "output", "options": "-lossFn NEGATIVELOGLIKELIHOOD" }
  ]
}"#;

// ============================================================================
// Valid Architecture Loading Tests
// ============================================================================

mod valid_architecture_tests {
    use super::*;

    #[test]
    fn test_load_lenet() {
        let temp_file = write_temp_config(LENET);
        let config = load_architecture(temp_file.path()).unwrap();

        assert_eq!(config.layers.len(), 6);
        assert_eq!(config.num_classes, Some(10));
        assert_eq!(config.layers[0].layer_type, "convolution");
        assert_eq!(
            config.layers[2].options,
            OptionTokens::Tokens(vec!["-nFilters".to_string(), "50".to_string()])
        );
        assert_eq!(config.layers[1].options, OptionTokens::default());
        assert_eq!(
            config.input,
            InputType::Convolutional {
                height: 28,
                width: 28,
                channels: 1
            }
        );
    }

    #[test]
    fn test_build_lenet_infers_shapes() {
        let temp_file = write_temp_config(LENET);
        let config = load_architecture(temp_file.path()).unwrap();
        let network = build_model(&config).unwrap();

        let layers = network.layers();
        let kinds: Vec<&str> = layers.iter().map(|spec| spec.kind()).collect();
        assert_eq!(
            kinds,
            vec!["convolution", "subsampling", "convolution", "subsampling", "dense", "output"]
        );

        let n_in: Vec<Value> = [0, 2, 4, 5]
            .iter()
            .map(|&i| layers[i].get("nIn").unwrap())
            .collect();
        assert_eq!(
            n_in,
            vec![Value::Int(1), Value::Int(20), Value::Int(800), Value::Int(500)]
        );
        assert_eq!(layers[5].get("nOut").unwrap(), Value::Int(10));
        assert_eq!(layers[0].name(), "conv1");
        assert_eq!(network.output_type(), InputType::FeedForward { size: 10 });
    }

    #[test]
    fn test_build_applies_network_settings() {
        let temp_file = write_temp_config(LENET);
        let network = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap();

        let settings = network.settings().params();
        assert_eq!(settings.int("seed").unwrap(), 42);
        assert_eq!(settings.choice("updater").unwrap(), "NESTEROVS");
        assert_eq!(settings.state(), ObjectState::Finalized);
    }

    #[test]
    fn test_network_json() {
        let temp_file = write_temp_config(LENET);
        let network = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&network.to_json().unwrap()).unwrap();
        assert_eq!(json["layers"].as_array().unwrap().len(), 6);
        assert_eq!(json["layers"][4]["params"]["activation"], "RELU");
        assert_eq!(json["output_type"]["type"], "feed_forward");
        assert_eq!(json["settings"]["params"]["learningRate"], 0.01);
    }

    #[test]
    fn test_feed_forward_network_without_settings() {
        let config_json = r#"{
  "input": { "type": "feed_forward", "size": 784 },
  "num_classes": 3,
  "layers": [
    { "layer_type": "Dense", "options": "-nOut 64" },
    { "layer_type": "OUTPUT" }
  ]
}"#;
        let temp_file = write_temp_config(config_json);
        let network = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap();

        assert_eq!(network.layers()[0].get("nIn").unwrap(), Value::Int(784));
        assert_eq!(network.settings().params().int("seed").unwrap(), 1);
    }
}

// ============================================================================
// Builder Tests
// ============================================================================

mod builder_tests {
    use super::*;

    #[test]
    fn test_builder_with_typed_layers() {
        let mut conv = ConvolutionLayer::new();
        conv.set_n_out(8).unwrap();
        conv.set_kernel_size([3, 3]).unwrap();
        conv.set_padding([1, 1]).unwrap();

        let mut settings = NetworkConfiguration::new();
        settings.set_updater(Updater::Adam).unwrap();

        let network = NetworkBuilder::new(InputType::Convolutional {
            height: 32,
            width: 32,
            channels: 3,
        })
        .settings(settings)
        .num_classes(10)
        .layer(conv)
        .layer(SubsamplingLayer::new())
        .layer(OutputLayer::new())
        .build()
        .unwrap();

        // 32x32 -> same-size conv -> 16x16x8 pooled -> 2048 inputs
        assert_eq!(network.layers()[2].get("nIn").unwrap(), Value::Int(2048));
        assert_eq!(network.settings().params().choice("updater").unwrap(), "ADAM");
    }

    #[test]
    fn test_rectangular_input_uses_x_for_width() {
        let mut conv = ConvolutionLayer::new();
        conv.set_n_out(1).unwrap();
        conv.set_kernel_size_x(5).unwrap();
        conv.set_kernel_size_y(1).unwrap();

        let mut dense = DenseLayer::new();
        dense.set_n_out(2).unwrap();

        let network = NetworkBuilder::new(InputType::Convolutional {
            height: 10,
            width: 20,
            channels: 1,
        })
        .layer(conv)
        .layer(dense)
        .build()
        .unwrap();

        // output 10 rows x 16 columns x 1 channel
        assert_eq!(network.layers()[1].get("nIn").unwrap(), Value::Int(160));
    }

    #[test]
    fn test_strict_mode_rejects_uneven_tiling() {
        let mut pool = SubsamplingLayer::new();
        pool.set_convolution_mode(ConvolutionMode::Strict).unwrap();

        let result = NetworkBuilder::new(InputType::Convolutional {
            height: 7,
            width: 7,
            channels: 1,
        })
        .layer(pool)
        .build();

        match result {
            Err(ConfigError::Layer { index, source }) => {
                assert_eq!(index, 0);
                assert!(matches!(*source, ConfigError::ShapeMismatch(_)));
            }
            other => panic!("expected Layer error, got {:?}", other),
        }
    }

    #[test]
    fn test_class_count_overrides_output_n_out() {
        let mut output = OutputLayer::new();
        output.set_n_out(4).unwrap();

        let network = NetworkBuilder::new(InputType::FeedForward { size: 8 })
            .num_classes(6)
            .layer(output)
            .build()
            .unwrap();

        assert_eq!(network.layers()[0].get("nOut").unwrap(), Value::Int(6));
    }

    #[test]
    fn test_output_without_class_count_uses_explicit_n_out() {
        let mut output = OutputLayer::new();
        output.set_n_out(4).unwrap();

        let network = NetworkBuilder::new(InputType::FeedForward { size: 8 })
            .layer(output)
            .build()
            .unwrap();

        assert_eq!(network.output_type(), InputType::FeedForward { size: 4 });
    }
}

// ============================================================================
// Invalid Architecture Tests
// ============================================================================

mod invalid_architecture_tests {
    use super::*;
    use weka_dl4j_layers::options::OptionHandler;

    #[test]
    fn test_missing_file() {
        let result = load_architecture("/nonexistent/path/architecture.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_json() {
        let temp_file = write_temp_config("{ \"layers\": [ ");
        assert!(matches!(
            load_architecture(temp_file.path()),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_empty_layers() {
        let temp_file = write_temp_config(
            r#"{ "input": { "type": "feed_forward", "size": 4 }, "layers": [] }"#,
        );
        assert!(matches!(
            load_architecture(temp_file.path()),
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_bad_layer_options_report_index_and_issues() {
        let config_json = r#"{
  "input": { "type": "feed_forward", "size": 4 },
  "num_classes": 2,
  "layers": [
    { "layer_type": "dense", "options": "-nOut 3" },
    { "layer_type": "dense", "options": "-nOut abc -bogusFlag 1" },
    { "layer_type": "output" }
  ]
}"#;
        let temp_file = write_temp_config(config_json);
        let config = load_architecture(temp_file.path()).unwrap();
        let err = build_model(&config).unwrap_err();

        assert!(matches!(err, ConfigError::Layer { index: 1, .. }));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_unknown_layer_type() {
        let config_json = r#"{
  "input": { "type": "feed_forward", "size": 4 },
  "layers": [ { "layer_type": "lstm" } ]
}"#;
        let temp_file = write_temp_config(config_json);
        let err = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap_err();

        match err {
            ConfigError::Layer { index, source } => {
                assert_eq!(index, 0);
                assert!(matches!(*source, ConfigError::UnknownSchema(_)));
            }
            other => panic!("expected Layer error, got {:?}", other),
        }
    }

    #[test]
    fn test_convolution_after_dense_is_shape_mismatch() {
        let config_json = r#"{
  "input": { "type": "feed_forward", "size": 16 },
  "layers": [
    { "layer_type": "dense", "options": "-nOut 8" },
    { "layer_type": "convolution", "options": "-nFilters 2" }
  ]
}"#;
        let temp_file = write_temp_config(config_json);
        let err = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap_err();

        match err {
            ConfigError::Layer { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, ConfigError::ShapeMismatch(_)));
            }
            other => panic!("expected Layer error, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_padding_is_shape_mismatch() {
        let mut conv = ConvolutionLayer::new();
        conv.set_options(&["-nFilters", "4", "-paddingX", "9223372036854775807"])
            .unwrap();

        let result = NetworkBuilder::new(InputType::Convolutional {
            height: 28,
            width: 28,
            channels: 1,
        })
        .layer(conv)
        .build();

        match result {
            Err(ConfigError::Layer { index, source }) => {
                assert_eq!(index, 0);
                assert!(matches!(*source, ConfigError::ShapeMismatch(_)));
            }
            other => panic!("expected Layer error, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_stride_in_same_mode_builds() {
        let mut pool = SubsamplingLayer::new();
        pool.set_options(&["-mode", "Same", "-strideX", "9223372036854775807"])
            .unwrap();

        let network = NetworkBuilder::new(InputType::Convolutional {
            height: 4,
            width: 4,
            channels: 3,
        })
        .layer(pool)
        .build()
        .unwrap();

        assert_eq!(
            network.output_type(),
            InputType::Convolutional {
                height: 2,
                width: 1,
                channels: 3
            }
        );
    }

    #[test]
    fn test_input_too_large_to_flatten() {
        let config_json = r#"{
  "input": { "type": "convolutional", "height": 18446744073709551615, "width": 2, "channels": 1 },
  "layers": [
    { "layer_type": "dense", "options": "-nOut 8" }
  ]
}"#;
        let temp_file = write_temp_config(config_json);
        let err = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap_err();

        match err {
            ConfigError::Layer { index, source } => {
                assert_eq!(index, 0);
                assert!(matches!(*source, ConfigError::ShapeMismatch(_)));
            }
            other => panic!("expected Layer error, got {:?}", other),
        }
    }

    #[test]
    fn test_class_count_too_large() {
        let result = NetworkBuilder::new(InputType::FeedForward { size: 8 })
            .num_classes(usize::MAX)
            .layer(OutputLayer::new())
            .build();

        match result {
            Err(ConfigError::Layer { index, source }) => {
                assert_eq!(index, 0);
                assert!(matches!(*source, ConfigError::ShapeMismatch(_)));
            }
            other => panic!("expected Layer error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_network_settings() {
        let config_json = r#"{
  "network": "-learningRate 0",
  "input": { "type": "feed_forward", "size": 4 },
  "layers": [ { "layer_type": "dense", "options": "-nOut 2" } ]
}"#;
        let temp_file = write_temp_config(config_json);
        let err = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap_err();

        match err {
            ConfigError::InvalidConfiguration { schema, problems } => {
                assert_eq!(schema, "network");
                assert_eq!(problems, vec!["learningRate must be positive, got 0".to_string()]);
            }
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_layer_in_file() {
        let config_json = r#"{
  "input": { "type": "convolutional", "height": 8, "width": 8, "channels": 1 },
  "layers": [ { "layer_type": "convolution", "options": "-kernelSizeX 3" } ]
}"#;
        let temp_file = write_temp_config(config_json);
        let err = build_model(&load_architecture(temp_file.path()).unwrap()).unwrap_err();

        match err {
            ConfigError::Layer { index: 0, source } => match *source {
                ConfigError::IncompleteConfiguration { fields, .. } => {
                    assert_eq!(fields, vec!["nOut".to_string()])
                }
                other => panic!("expected IncompleteConfiguration, got {:?}", other),
            },
            other => panic!("expected Layer error, got {:?}", other),
        }
    }
}
