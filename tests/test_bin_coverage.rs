use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

#[allow(dead_code)]
mod layer_options_bin {
    include!("../layer_options.rs");

    #[cfg(test)]
    mod coverage_tests {
        use super::*;

        #[test]
        fn test_list_prints_help() {
            let output = run(&Commands::List {
                kind: "convolution".to_string(),
            })
            .unwrap();

            assert!(output.starts_with("A convolution layer from DeepLearning4J."));
            assert!(output.contains("-nFilters <int>"));
            assert!(output.contains("One of: Strict, Truncate, Same"));
        }

        #[test]
        fn test_list_distribution() {
            let output = run(&Commands::List {
                kind: "UniformDistribution".to_string(),
            })
            .unwrap();
            assert!(output.contains("-lower <double>"));
        }

        #[test]
        fn test_parse_prints_line_and_spec() {
            let output = run(&Commands::Parse {
                kind: "dense".to_string(),
                options: vec!["-nOut".to_string(), "7".to_string()],
            })
            .unwrap();

            let (line, json) = output.split_once('\n').unwrap();
            assert!(line.starts_with("-name \"Dense layer\" -nOut 7"));
            let spec: serde_json::Value = serde_json::from_str(json).unwrap();
            assert_eq!(spec["kind"], "dense");
            assert_eq!(spec["params"]["nOut"], 7);
        }

        #[test]
        fn test_parse_failure_lists_issues() {
            let err = run(&Commands::Parse {
                kind: "convolution".to_string(),
                options: vec![
                    "-nFilters".to_string(),
                    "abc".to_string(),
                    "-bogusFlag".to_string(),
                    "1".to_string(),
                ],
            })
            .unwrap_err();

            let text = report(&err);
            assert!(text.starts_with("Error: Invalid options for convolution"));
            assert!(text.contains("\n  malformed value 'abc' for -nFilters"));
            assert!(text.contains("\n  unrecognized option '-bogusFlag'"));
        }

        #[test]
        fn test_parse_incomplete() {
            let err = run(&Commands::Parse {
                kind: "convolution".to_string(),
                options: Vec::new(),
            })
            .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::IncompleteConfiguration { .. }
            ));
        }

        #[test]
        fn test_unknown_kind() {
            let err = run(&Commands::List {
                kind: "lstm".to_string(),
            })
            .unwrap_err();
            assert_eq!(report(&err), "Error: Unknown configuration type 'lstm'");
        }

        #[test]
        fn test_build_architecture_file() {
            let temp = crate::write_temp_config(
                r#"{
  "input": { "type": "feed_forward", "size": 20 },
  "num_classes": 2,
  "layers": [
    { "layer_type": "dense", "options": "-nOut 5" },
    { "layer_type": "output" }
  ]
}"#,
            );
            let output = run(&Commands::Build {
                file: temp.path().to_path_buf(),
            })
            .unwrap();

            let network: serde_json::Value = serde_json::from_str(&output).unwrap();
            assert_eq!(network["layers"][1]["params"]["nIn"], 5);
            assert_eq!(network["layers"][1]["params"]["nOut"], 2);
        }

        #[test]
        fn test_cli_accepts_hyphenated_option_values() {
            let cli = Cli::try_parse_from(["layer_options", "parse", "dense", "-nOut", "3"]).unwrap();

            match cli.command {
                Commands::Parse { kind, options } => {
                    assert_eq!(kind, "dense");
                    assert_eq!(options, vec!["-nOut", "3"]);
                }
                _ => panic!("expected parse subcommand"),
            }
        }
    }
}
