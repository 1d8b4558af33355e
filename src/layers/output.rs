//! Output layer configuration
//!
//! The number of outputs is not a command-line option: it is set from the
//! number of classes of the data set when the network is assembled.

use crate::architecture::{size_to_int, InputType};
use crate::error::Result;
use crate::layers::choices::{Activation, LossFunction};
use crate::layers::distribution::{DISTRIBUTIONS, NORMAL};
use crate::layers::r#trait::{
    activation_field, dist_field, layer_name_field, validate_base, BaseLayerOptions,
    LayerConfiguration, BIAS_INIT_FIELD, DROPOUT_FIELD, GRADIENT_NORMALIZATION_FIELD,
    GRAD_NORM_THRESHOLD_FIELD, L1_BIAS_FIELD, L1_FIELD, L2_BIAS_FIELD, L2_FIELD, N_IN,
    N_IN_FIELD, N_OUT, WEIGHT_INIT_FIELD,
};
use crate::options::{ConfigObject, FieldDescriptor, OptionHandler, Schema};
use log::{debug, warn};

const LOSS_FN: &str = "lossFn";

pub static OUTPUT: Schema = Schema {
    name: "output",
    global_info: "An output layer from DeepLearning4J.",
    fields: &OUTPUT_FIELDS,
    validate: validate_base,
};

static OUTPUT_FIELDS: [FieldDescriptor; 15] = [
    layer_name_field("Output layer"),
    FieldDescriptor::choice(LOSS_FN, LossFunction::VALUES, LossFunction::Mcxent.as_str())
        .flag("lossFn")
        .order(2)
        .display("loss function")
        .help("The loss function to use (default = MCXENT)."),
    activation_field(Activation::Softmax),
    WEIGHT_INIT_FIELD,
    BIAS_INIT_FIELD,
    dist_field(&DISTRIBUTIONS, &NORMAL),
    L1_FIELD,
    L2_FIELD,
    L1_BIAS_FIELD,
    L2_BIAS_FIELD,
    DROPOUT_FIELD,
    GRADIENT_NORMALIZATION_FIELD,
    GRAD_NORM_THRESHOLD_FIELD,
    N_IN_FIELD,
    FieldDescriptor::int(N_OUT, 0)
        .display("number of outputs")
        .help("Set automatically from the number of classes.")
        .required(),
];

/// Final layer of a network, producing one output per class.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayer {
    config: ConfigObject,
}

impl Default for OutputLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputLayer {
    pub fn new() -> Self {
        Self {
            config: ConfigObject::new(&OUTPUT),
        }
    }

    pub fn loss_fn(&self) -> Result<LossFunction> {
        self.config.choice(LOSS_FN)?.parse()
    }

    pub fn set_loss_fn(&mut self, loss: LossFunction) -> Result<()> {
        self.config.set_choice(LOSS_FN, loss.as_str())
    }
}

impl OptionHandler for OutputLayer {
    fn config(&self) -> &ConfigObject {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ConfigObject {
        &mut self.config
    }
}

impl LayerConfiguration for OutputLayer {
    fn connect(&mut self, input: InputType) -> Result<InputType> {
        self.config.set_int(N_IN, size_to_int(input.flat_size()?, "input size")?)?;
        let size = usize::try_from(self.n_out()?).unwrap_or(0);
        debug!("output layer: {} -> {} classes", input, size);
        Ok(InputType::FeedForward { size })
    }

    fn bind_classes(&mut self, num_classes: usize) -> Result<()> {
        let classes = size_to_int(num_classes, "number of classes")?;
        let previous = self.n_out()?;
        if previous > 0 && previous != classes {
            warn!(
                "output layer nOut {} replaced by number of classes {}",
                previous, classes
            );
        }
        self.set_n_out(classes)
    }
}

impl BaseLayerOptions for OutputLayer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let output = OutputLayer::new();
        assert_eq!(output.layer_name().unwrap(), "Output layer");
        assert_eq!(output.activation().unwrap(), Activation::Softmax);
        assert_eq!(output.loss_fn().unwrap(), LossFunction::Mcxent);
    }

    #[test]
    fn test_n_out_is_not_a_cli_option() {
        let mut output = OutputLayer::new();
        let flags: Vec<&str> = output.list_options().iter().map(|o| o.flag).collect();
        assert!(!flags.contains(&"nOut"));
        assert!(output.set_options(&["-nOut", "3"]).is_err());
        assert_eq!(output.n_out().unwrap(), 0);
    }

    #[test]
    fn test_bind_classes_sets_n_out() {
        let mut output = OutputLayer::new();
        output.bind_classes(10).unwrap();
        assert_eq!(output.n_out().unwrap(), 10);

        let shape = output.connect(InputType::FeedForward { size: 64 }).unwrap();
        assert_eq!(shape, InputType::FeedForward { size: 10 });
        assert_eq!(output.n_in().unwrap(), 64);
    }

    #[test]
    fn test_loss_fn_option() {
        let mut output = OutputLayer::new();
        output
            .set_options(&["-lossFn", "NEGATIVELOGLIKELIHOOD"])
            .unwrap();
        assert_eq!(output.loss_fn().unwrap(), LossFunction::NegativeLogLikelihood);
    }
}
