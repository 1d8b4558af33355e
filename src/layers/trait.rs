//! Layer configuration traits and the fields shared by layer types
//!
//! `LayerConfiguration` is what the layer factory works with: option
//! handling plus the programmatic hooks used while a network is assembled.
//! `BaseLayerOptions` adds typed accessors for the settings every
//! parameterised layer (convolution, dense, output) carries.

use crate::architecture::InputType;
use crate::error::{ConfigError, Result};
use crate::layers::choices::{Activation, GradientNormalization, WeightInit};
use crate::layers::distribution::Distribution;
use crate::options::{ConfigObject, FieldDescriptor, OptionHandler, Schema};

pub const LAYER_NAME: &str = "name";
pub const N_IN: &str = "nIn";
pub const N_OUT: &str = "nOut";
pub const ACTIVATION: &str = "activation";
pub const WEIGHT_INIT: &str = "weightInit";
pub const BIAS_INIT: &str = "biasInit";
pub const DIST: &str = "dist";
pub const L1: &str = "l1";
pub const L2: &str = "l2";
pub const L1_BIAS: &str = "l1Bias";
pub const L2_BIAS: &str = "l2Bias";
pub const DROPOUT: &str = "dropout";
pub const GRADIENT_NORMALIZATION: &str = "gradientNormalization";
pub const GRAD_NORM_THRESHOLD: &str = "gradNormThreshold";
pub const KERNEL_SIZE: &str = "kernelSize";
pub const STRIDE: &str = "stride";
pub const PADDING: &str = "padding";

pub(crate) const fn layer_name_field(default: &'static str) -> FieldDescriptor {
    FieldDescriptor::string(LAYER_NAME, default)
        .flag("name")
        .order(0)
        .display("layer name")
        .help("The name of the layer.")
}

pub(crate) const fn activation_field(default: Activation) -> FieldDescriptor {
    FieldDescriptor::choice(ACTIVATION, Activation::VALUES, default.as_str())
        .flag("activation")
        .order(10)
        .display("activation function")
        .help("The activation function to use.")
}

pub(crate) const fn dist_field(
    schemas: &'static [&'static Schema],
    default: &'static Schema,
) -> FieldDescriptor {
    FieldDescriptor::object(DIST, schemas, default)
        .flag("dist")
        .order(13)
        .display("distribution")
        .help("The distribution (default = NormalDistribution(1e-3, 1)).")
}

pub(crate) const N_IN_FIELD: FieldDescriptor = FieldDescriptor::int(N_IN, 0)
    .display("number of inputs")
    .help("Set automatically from the previous layer or the input shape.");

pub(crate) const WEIGHT_INIT_FIELD: FieldDescriptor =
    FieldDescriptor::choice(WEIGHT_INIT, WeightInit::VALUES, WeightInit::Xavier.as_str())
        .flag("weightInit")
        .order(11)
        .display("weight initialization method")
        .help("The method for weight initialization (default = XAVIER).");

pub(crate) const BIAS_INIT_FIELD: FieldDescriptor = FieldDescriptor::double(BIAS_INIT, 1.0)
    .flag("biasInit")
    .order(12)
    .display("bias initialization")
    .help("The bias initialization (default = 1.0).");

pub(crate) const L1_FIELD: FieldDescriptor = FieldDescriptor::double(L1, 0.0)
    .flag("L1")
    .order(19)
    .display("L1")
    .help("The L1 parameter (default = 0).");

pub(crate) const L2_FIELD: FieldDescriptor = FieldDescriptor::double(L2, 0.0)
    .flag("L2")
    .order(20)
    .display("L2")
    .help("The L2 parameter (default = 0).");

pub(crate) const L1_BIAS_FIELD: FieldDescriptor = FieldDescriptor::double(L1_BIAS, 0.0)
    .flag("l1Bias")
    .order(21)
    .display("L1 bias")
    .help("The L1 bias parameter (default = 0).");

pub(crate) const L2_BIAS_FIELD: FieldDescriptor = FieldDescriptor::double(L2_BIAS, 0.0)
    .flag("l2Bias")
    .order(22)
    .display("L2 bias")
    .help("The L2 bias parameter (default = 0).");

pub(crate) const DROPOUT_FIELD: FieldDescriptor = FieldDescriptor::double(DROPOUT, 0.0)
    .flag("dropout")
    .order(23)
    .display("dropout parameter")
    .help("The dropout parameter (default = 0).");

pub(crate) const GRADIENT_NORMALIZATION_FIELD: FieldDescriptor = FieldDescriptor::choice(
    GRADIENT_NORMALIZATION,
    GradientNormalization::VALUES,
    GradientNormalization::None.as_str(),
)
.flag("gradientNormalization")
.order(30)
.display("gradient normalization method")
.help("The gradient normalization method (default = None).");

pub(crate) const GRAD_NORM_THRESHOLD_FIELD: FieldDescriptor =
    FieldDescriptor::double(GRAD_NORM_THRESHOLD, 1.0)
        .flag("gradNormThreshold")
        .order(31)
        .display("gradient normalization threshold")
        .help("The gradient normalization threshold (default = 1).");

/// Range checks shared by every parameterised layer.
pub(crate) fn validate_base(object: &ConfigObject, problems: &mut Vec<String>) {
    if let Ok(dropout) = object.double(DROPOUT) {
        if !(0.0..1.0).contains(&dropout) {
            problems.push(format!("dropout must be in range [0.0, 1.0), got {}", dropout));
        }
    }
    for name in [L1, L2, L1_BIAS, L2_BIAS, GRAD_NORM_THRESHOLD] {
        if let Ok(value) = object.double(name) {
            if value < 0.0 {
                problems.push(format!("{} must be non-negative, got {}", name, value));
            }
        }
    }
    if let Ok(n_in) = object.int(N_IN) {
        if n_in < 0 {
            problems.push(format!("nIn must be non-negative, got {}", n_in));
        }
    }
}

/// Kernel, stride and padding checks shared by convolution and pooling.
pub(crate) fn validate_window(object: &ConfigObject, problems: &mut Vec<String>) {
    let checks: [(&str, i64); 3] = [(KERNEL_SIZE, 1), (STRIDE, 1), (PADDING, 0)];
    for (name, minimum) in checks {
        if let Ok(values) = object.int_array(name) {
            if values.iter().any(|value| *value < minimum) {
                let bound = if minimum > 0 { "positive" } else { "non-negative" };
                problems.push(format!("{} must be {}, got {:?}", name, bound, values));
            }
        }
    }
}

/// Reads a two-slot composite attribute.
pub(crate) fn pair(config: &ConfigObject, name: &str) -> Result<[i64; 2]> {
    match config.int_array(name)? {
        [x, y] => Ok([*x, *y]),
        _ => Err(ConfigError::KindMismatch {
            field: name.to_string(),
            expected: "2 comma-separated ints".to_string(),
        }),
    }
}

/// A layer that can be placed in a network.
pub trait LayerConfiguration: OptionHandler {
    /// Connects the layer to its input: sets programmatic fields derived from
    /// the input (such as `nIn`) and returns the layer's output type.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the layer cannot consume `input`.
    fn connect(&mut self, input: InputType) -> Result<InputType>;

    /// Receives the number of classes of the data set. Only output layers
    /// use it.
    fn bind_classes(&mut self, _num_classes: usize) -> Result<()> {
        Ok(())
    }

    fn layer_name(&self) -> Result<&str> {
        self.config().string(LAYER_NAME)
    }

    fn set_layer_name(&mut self, name: &str) -> Result<()> {
        self.config_mut().set_string(LAYER_NAME, name)
    }
}

/// Typed accessors for settings shared by convolution, dense and output layers.
pub trait BaseLayerOptions: LayerConfiguration {
    fn n_in(&self) -> Result<i64> {
        self.config().int(N_IN)
    }

    fn set_n_in(&mut self, n_in: i64) -> Result<()> {
        self.config_mut().set_int(N_IN, n_in)
    }

    fn n_out(&self) -> Result<i64> {
        self.config().int(N_OUT)
    }

    fn set_n_out(&mut self, n_out: i64) -> Result<()> {
        self.config_mut().set_int(N_OUT, n_out)
    }

    fn activation(&self) -> Result<Activation> {
        self.config().choice(ACTIVATION)?.parse()
    }

    fn set_activation(&mut self, activation: Activation) -> Result<()> {
        self.config_mut().set_choice(ACTIVATION, activation.as_str())
    }

    fn weight_init(&self) -> Result<WeightInit> {
        self.config().choice(WEIGHT_INIT)?.parse()
    }

    fn set_weight_init(&mut self, weight_init: WeightInit) -> Result<()> {
        self.config_mut().set_choice(WEIGHT_INIT, weight_init.as_str())
    }

    fn bias_init(&self) -> Result<f64> {
        self.config().double(BIAS_INIT)
    }

    fn set_bias_init(&mut self, bias_init: f64) -> Result<()> {
        self.config_mut().set_double(BIAS_INIT, bias_init)
    }

    fn dist(&self) -> Result<Distribution> {
        Distribution::from_config(self.config().object(DIST)?)
    }

    fn set_dist(&mut self, dist: Distribution) -> Result<()> {
        let object = dist.to_config()?;
        self.config_mut().set_object(DIST, object)
    }

    fn l1(&self) -> Result<f64> {
        self.config().double(L1)
    }

    fn set_l1(&mut self, l1: f64) -> Result<()> {
        self.config_mut().set_double(L1, l1)
    }

    fn l2(&self) -> Result<f64> {
        self.config().double(L2)
    }

    fn set_l2(&mut self, l2: f64) -> Result<()> {
        self.config_mut().set_double(L2, l2)
    }

    fn l1_bias(&self) -> Result<f64> {
        self.config().double(L1_BIAS)
    }

    fn set_l1_bias(&mut self, l1_bias: f64) -> Result<()> {
        self.config_mut().set_double(L1_BIAS, l1_bias)
    }

    fn l2_bias(&self) -> Result<f64> {
        self.config().double(L2_BIAS)
    }

    fn set_l2_bias(&mut self, l2_bias: f64) -> Result<()> {
        self.config_mut().set_double(L2_BIAS, l2_bias)
    }

    fn dropout(&self) -> Result<f64> {
        self.config().double(DROPOUT)
    }

    fn set_dropout(&mut self, dropout: f64) -> Result<()> {
        self.config_mut().set_double(DROPOUT, dropout)
    }

    fn gradient_normalization(&self) -> Result<GradientNormalization> {
        self.config().choice(GRADIENT_NORMALIZATION)?.parse()
    }

    fn set_gradient_normalization(&mut self, method: GradientNormalization) -> Result<()> {
        self.config_mut()
            .set_choice(GRADIENT_NORMALIZATION, method.as_str())
    }

    fn gradient_normalization_threshold(&self) -> Result<f64> {
        self.config().double(GRAD_NORM_THRESHOLD)
    }

    fn set_gradient_normalization_threshold(&mut self, threshold: f64) -> Result<()> {
        self.config_mut().set_double(GRAD_NORM_THRESHOLD, threshold)
    }
}
