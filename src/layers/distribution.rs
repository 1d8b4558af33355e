//! Weight distributions
//!
//! Distributions are nested configuration objects: a layer's `dist` field
//! holds one of these, and on the command line it is written as a quoted
//! specification such as `-dist "UniformDistribution -lower -0.5 -upper 0.5"`.

use crate::error::{ConfigError, Result};
use crate::options::{ConfigObject, FieldDescriptor, Schema};

pub static NORMAL: Schema = Schema {
    name: "NormalDistribution",
    global_info: "A normal (Gaussian) distribution.",
    fields: &NORMAL_FIELDS,
    validate: validate_normal,
};

static NORMAL_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::double("mean", 1e-3)
        .flag("mean")
        .order(0)
        .display("mean")
        .help("The mean (default = 1e-3)."),
    FieldDescriptor::double("std", 1.0)
        .flag("std")
        .order(1)
        .display("standard deviation")
        .help("The standard deviation (default = 1)."),
];

pub static UNIFORM: Schema = Schema {
    name: "UniformDistribution",
    global_info: "A uniform distribution over [lower, upper].",
    fields: &UNIFORM_FIELDS,
    validate: validate_uniform,
};

static UNIFORM_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::double("lower", -1.0)
        .flag("lower")
        .order(0)
        .display("lower bound")
        .help("The lower bound (default = -1)."),
    FieldDescriptor::double("upper", 1.0)
        .flag("upper")
        .order(1)
        .display("upper bound")
        .help("The upper bound (default = 1)."),
];

pub static BINOMIAL: Schema = Schema {
    name: "BinomialDistribution",
    global_info: "A binomial distribution.",
    fields: &BINOMIAL_FIELDS,
    validate: validate_binomial,
};

static BINOMIAL_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::int("trials", 1)
        .flag("trials")
        .order(0)
        .display("number of trials")
        .help("The number of trials (default = 1).")
        .required(),
    FieldDescriptor::double("probabilityOfSuccess", 0.5)
        .flag("probabilityOfSuccess")
        .order(1)
        .display("probability of success")
        .help("The probability of success (default = 0.5)."),
];

/// Every distribution type a `dist` field accepts.
pub static DISTRIBUTIONS: [&Schema; 3] = [&NORMAL, &UNIFORM, &BINOMIAL];

fn validate_normal(object: &ConfigObject, problems: &mut Vec<String>) {
    if let Ok(std) = object.double("std") {
        if std <= 0.0 {
            problems.push(format!("std must be positive, got {}", std));
        }
    }
}

fn validate_uniform(object: &ConfigObject, problems: &mut Vec<String>) {
    if let (Ok(lower), Ok(upper)) = (object.double("lower"), object.double("upper")) {
        if lower >= upper {
            problems.push(format!(
                "lower ({}) must be smaller than upper ({})",
                lower, upper
            ));
        }
    }
}

fn validate_binomial(object: &ConfigObject, problems: &mut Vec<String>) {
    if let Ok(p) = object.double("probabilityOfSuccess") {
        if !(0.0..=1.0).contains(&p) {
            problems.push(format!(
                "probabilityOfSuccess must be in range [0.0, 1.0], got {}",
                p
            ));
        }
    }
}

/// Typed view of a distribution object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    Normal { mean: f64, std: f64 },
    Uniform { lower: f64, upper: f64 },
    Binomial { trials: i64, probability_of_success: f64 },
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::Normal {
            mean: 1e-3,
            std: 1.0,
        }
    }
}

impl Distribution {
    /// Builds the configuration object for this distribution.
    pub fn to_config(&self) -> Result<ConfigObject> {
        let object = match *self {
            Distribution::Normal { mean, std } => {
                let mut object = ConfigObject::new(&NORMAL);
                object.set_double("mean", mean)?;
                object.set_double("std", std)?;
                object
            }
            Distribution::Uniform { lower, upper } => {
                let mut object = ConfigObject::new(&UNIFORM);
                object.set_double("lower", lower)?;
                object.set_double("upper", upper)?;
                object
            }
            Distribution::Binomial {
                trials,
                probability_of_success,
            } => {
                let mut object = ConfigObject::new(&BINOMIAL);
                object.set_int("trials", trials)?;
                object.set_double("probabilityOfSuccess", probability_of_success)?;
                object
            }
        };
        Ok(object)
    }

    /// Reads a distribution back from its configuration object.
    pub fn from_config(object: &ConfigObject) -> Result<Self> {
        match object.schema().name {
            "NormalDistribution" => Ok(Distribution::Normal {
                mean: object.double("mean")?,
                std: object.double("std")?,
            }),
            "UniformDistribution" => Ok(Distribution::Uniform {
                lower: object.double("lower")?,
                upper: object.double("upper")?,
            }),
            "BinomialDistribution" => Ok(Distribution::Binomial {
                trials: object.int("trials")?,
                probability_of_success: object.double("probabilityOfSuccess")?,
            }),
            other => Err(ConfigError::UnknownSchema(other.to_string())),
        }
    }
}
