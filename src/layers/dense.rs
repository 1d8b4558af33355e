//! Dense (fully connected) layer configuration

use crate::architecture::{size_to_int, InputType};
use crate::error::Result;
use crate::layers::choices::Activation;
use crate::layers::distribution::{DISTRIBUTIONS, NORMAL};
use crate::layers::r#trait::{
    activation_field, dist_field, layer_name_field, validate_base, BaseLayerOptions,
    LayerConfiguration, BIAS_INIT_FIELD, DROPOUT_FIELD, GRADIENT_NORMALIZATION_FIELD,
    GRAD_NORM_THRESHOLD_FIELD, L1_BIAS_FIELD, L1_FIELD, L2_BIAS_FIELD, L2_FIELD, N_IN,
    N_IN_FIELD, N_OUT, WEIGHT_INIT_FIELD,
};
use crate::options::{ConfigObject, FieldDescriptor, OptionHandler, Schema};
use log::debug;

pub static DENSE: Schema = Schema {
    name: "dense",
    global_info: "A dense layer from DeepLearning4J.",
    fields: &DENSE_FIELDS,
    validate: validate_base,
};

static DENSE_FIELDS: [FieldDescriptor; 14] = [
    layer_name_field("Dense layer"),
    FieldDescriptor::int(N_OUT, 0)
        .flag("nOut")
        .order(1)
        .display("number of outputs")
        .help("The number of outputs.")
        .required(),
    activation_field(Activation::Identity),
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
];

/// Fully connected layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    config: ConfigObject,
}

impl Default for DenseLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl DenseLayer {
    pub fn new() -> Self {
        Self {
            config: ConfigObject::new(&DENSE),
        }
    }
}

impl OptionHandler for DenseLayer {
    fn config(&self) -> &ConfigObject {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ConfigObject {
        &mut self.config
    }
}

impl LayerConfiguration for DenseLayer {
    /// Accepts any input; convolutional input is flattened.
    fn connect(&mut self, input: InputType) -> Result<InputType> {
        self.config.set_int(N_IN, size_to_int(input.flat_size()?, "input size")?)?;
        let size = usize::try_from(self.n_out()?).unwrap_or(0);
        debug!("dense layer: {} -> {} units", input, size);
        Ok(InputType::FeedForward { size })
    }
}

impl BaseLayerOptions for DenseLayer {}
