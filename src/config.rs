//! Network-wide training settings
//!
//! This module provides the settings object shared by all layers of a
//! network: random seed, optimization algorithm, updater and its
//! hyperparameters. Like the layers, it is a schema-backed configuration
//! object and is set through command-line options.

use crate::error::Result;
use crate::layers::choices::{OptimizationAlgorithm, Updater};
use crate::options::{ConfigObject, FieldDescriptor, OptionHandler, Schema};

const SEED: &str = "seed";
const OPTIMIZATION_ALGO: &str = "optimizationAlgo";
const UPDATER: &str = "updater";
const LEARNING_RATE: &str = "learningRate";
const MOMENTUM: &str = "momentum";

pub static NETWORK: Schema = Schema {
    name: "network",
    global_info: "Network-wide settings for a DeepLearning4J multi-layer network.",
    fields: &NETWORK_FIELDS,
    validate: validate_network,
};

static NETWORK_FIELDS: [FieldDescriptor; 5] = [
    FieldDescriptor::int(SEED, 1)
        .flag("seed")
        .order(0)
        .display("random seed")
        .help("The random number seed (default = 1)."),
    FieldDescriptor::choice(
        OPTIMIZATION_ALGO,
        OptimizationAlgorithm::VALUES,
        OptimizationAlgorithm::StochasticGradientDescent.as_str(),
    )
    .flag("optimizationAlgo")
    .order(1)
    .display("optimization algorithm")
    .help("The optimization algorithm (default = STOCHASTIC_GRADIENT_DESCENT)."),
    FieldDescriptor::choice(UPDATER, Updater::VALUES, Updater::Sgd.as_str())
        .flag("updater")
        .order(2)
        .display("updater")
        .help("The updater for the parameters (default = SGD)."),
    FieldDescriptor::double(LEARNING_RATE, 0.1)
        .flag("learningRate")
        .order(3)
        .display("learning rate")
        .help("The learning rate (default = 0.1)."),
    FieldDescriptor::double(MOMENTUM, 0.9)
        .flag("momentum")
        .order(4)
        .display("momentum")
        .help("The momentum used by momentum-based updaters (default = 0.9)."),
];

fn validate_network(object: &ConfigObject, problems: &mut Vec<String>) {
    if let Ok(rate) = object.double(LEARNING_RATE) {
        if rate <= 0.0 {
            problems.push(format!("learningRate must be positive, got {}", rate));
        }
    }
    if let Ok(momentum) = object.double(MOMENTUM) {
        if momentum < 0.0 {
            problems.push(format!("momentum must be non-negative, got {}", momentum));
        }
    }
}

/// Settings shared by every layer of a network.
///
/// # Example
///
/// ```
/// use weka_dl4j_layers::config::NetworkConfiguration;
/// use weka_dl4j_layers::layers::choices::Updater;
/// use weka_dl4j_layers::options::OptionHandler;
///
/// let mut settings = NetworkConfiguration::new();
/// settings.set_options(&["-updater", "ADAM", "-learningRate", "0.001"]).unwrap();
/// assert_eq!(settings.updater().unwrap(), Updater::Adam);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfiguration {
    config: ConfigObject,
}

impl Default for NetworkConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkConfiguration {
    pub fn new() -> Self {
        Self {
            config: ConfigObject::new(&NETWORK),
        }
    }

    pub fn seed(&self) -> Result<i64> {
        self.config.int(SEED)
    }

    pub fn set_seed(&mut self, seed: i64) -> Result<()> {
        self.config.set_int(SEED, seed)
    }

    pub fn optimization_algo(&self) -> Result<OptimizationAlgorithm> {
        self.config.choice(OPTIMIZATION_ALGO)?.parse()
    }

    pub fn set_optimization_algo(&mut self, algorithm: OptimizationAlgorithm) -> Result<()> {
        self.config.set_choice(OPTIMIZATION_ALGO, algorithm.as_str())
    }

    pub fn updater(&self) -> Result<Updater> {
        self.config.choice(UPDATER)?.parse()
    }

    pub fn set_updater(&mut self, updater: Updater) -> Result<()> {
        self.config.set_choice(UPDATER, updater.as_str())
    }

    pub fn learning_rate(&self) -> Result<f64> {
        self.config.double(LEARNING_RATE)
    }

    pub fn set_learning_rate(&mut self, rate: f64) -> Result<()> {
        self.config.set_double(LEARNING_RATE, rate)
    }

    pub fn momentum(&self) -> Result<f64> {
        self.config.double(MOMENTUM)
    }

    pub fn set_momentum(&mut self, momentum: f64) -> Result<()> {
        self.config.set_double(MOMENTUM, momentum)
    }

    pub(crate) fn into_config(self) -> ConfigObject {
        self.config
    }
}

impl OptionHandler for NetworkConfiguration {
    fn config(&self) -> &ConfigObject {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ConfigObject {
        &mut self.config
    }
}
