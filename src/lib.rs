//! DeepLearning4J layer configurations with Weka-style options
//!
//! Every layer type declares its configurable fields as static plain data.
//! A stateless codec converts between command-line tokens and configuration
//! objects, and the layer factory turns validated objects into immutable
//! specifications for an external numerical engine.
//!
//! # Modules
//!
//! - `options`: field descriptors, schemas, configuration objects and the option codec
//! - `layers`: layer configuration traits and the typed layer wrappers
//! - `config`: network-wide training settings
//! - `architecture`: finalization, network assembly and JSON architecture files
//! - `error`: the crate's error type

pub mod architecture;
pub mod config;
pub mod error;
pub mod layers;
pub mod options;

pub use error::{ConfigError, DecodeIssue, Result};
