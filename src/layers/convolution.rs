//! Convolution layer configuration
//!
//! A version of DeepLearning4J's ConvolutionLayer with Weka-style option
//! handling. Kernel size, stride and padding are two-slot composites; on the
//! command line each axis has its own flag (`-kernelSizeX`, `-kernelSizeY`,
//! ...), and the whole composite is settable only from code.

use crate::architecture::{size_to_int, window_output, InputType};
use crate::error::{ConfigError, Result};
use crate::layers::choices::{Activation, AlgoMode, ConvolutionMode};
use crate::layers::distribution::{DISTRIBUTIONS, NORMAL};
use crate::layers::r#trait::{
    activation_field, dist_field, layer_name_field, pair, validate_base, validate_window,
    BaseLayerOptions, LayerConfiguration, BIAS_INIT_FIELD, DROPOUT_FIELD,
    GRADIENT_NORMALIZATION_FIELD, GRAD_NORM_THRESHOLD_FIELD, KERNEL_SIZE, L1_BIAS_FIELD,
    L1_FIELD, L2_BIAS_FIELD, L2_FIELD, N_IN, N_IN_FIELD, N_OUT, PADDING, STRIDE,
    WEIGHT_INIT_FIELD,
};
use crate::options::{ConfigObject, FieldDescriptor, OptionHandler, Schema};
use log::debug;

const MODE: &str = "mode";
const CUDNN_ALGO_MODE: &str = "cudnnAlgoMode";

pub static CONVOLUTION: Schema = Schema {
    name: "convolution",
    global_info: "A convolution layer from DeepLearning4J.",
    fields: &CONVOLUTION_FIELDS,
    validate: validate_convolution,
};

static CONVOLUTION_FIELDS: [FieldDescriptor; 25] = [
    layer_name_field("Convolution layer"),
    FieldDescriptor::int(N_OUT, 0)
        .flag("nFilters")
        .order(1)
        .display("number of filters")
        .help("The number of filters.")
        .required(),
    FieldDescriptor::choice(MODE, ConvolutionMode::VALUES, ConvolutionMode::Truncate.as_str())
        .flag("mode")
        .order(2)
        .display("convolution mode")
        .help("The convolution mode (default = Truncate)."),
    FieldDescriptor::choice(CUDNN_ALGO_MODE, AlgoMode::VALUES, AlgoMode::PreferFastest.as_str())
        .flag("cudnnAlgoMode")
        .order(3)
        .display("CudnnAlgoMode")
        .help("The Cudnn algo mode (default = PREFER_FASTEST)."),
    FieldDescriptor::slot("kernelSizeX", KERNEL_SIZE, 0)
        .flag("kernelSizeX")
        .order(4)
        .display("number of columns in kernel")
        .help("The number of columns in the kernel (default = 5)."),
    FieldDescriptor::slot("kernelSizeY", KERNEL_SIZE, 1)
        .flag("kernelSizeY")
        .order(5)
        .display("number of rows in kernel")
        .help("The number of rows in the kernel (default = 5)."),
    FieldDescriptor::slot("strideX", STRIDE, 0)
        .flag("strideX")
        .order(6)
        .display("number of columns in stride")
        .help("The number of columns in the stride (default = 1)."),
    FieldDescriptor::slot("strideY", STRIDE, 1)
        .flag("strideY")
        .order(7)
        .display("number of rows in stride")
        .help("The number of rows in the stride (default = 1)."),
    FieldDescriptor::slot("paddingX", PADDING, 0)
        .flag("paddingX")
        .order(8)
        .display("number of columns in padding")
        .help("The number of columns in the padding (default = 0)."),
    FieldDescriptor::slot("paddingY", PADDING, 1)
        .flag("paddingY")
        .order(9)
        .display("number of rows in padding")
        .help("The number of rows in the padding (default = 0)."),
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
    FieldDescriptor::int_array(KERNEL_SIZE, &[5, 5]),
    FieldDescriptor::int_array(STRIDE, &[1, 1]),
    FieldDescriptor::int_array(PADDING, &[0, 0]),
];

fn validate_convolution(object: &ConfigObject, problems: &mut Vec<String>) {
    validate_base(object, problems);
    validate_window(object, problems);
}

/// Convolution layer with Weka-style option handling.
///
/// # Example
///
/// ```
/// use weka_dl4j_layers::layers::{BaseLayerOptions, ConvolutionLayer};
/// use weka_dl4j_layers::options::OptionHandler;
///
/// let mut conv = ConvolutionLayer::new();
/// conv.set_options(&["-nFilters", "16", "-kernelSizeX", "3", "-kernelSizeY", "3"]).unwrap();
/// assert_eq!(conv.n_out().unwrap(), 16);
/// assert_eq!(conv.kernel_size().unwrap(), [3, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionLayer {
    config: ConfigObject,
}

impl Default for ConvolutionLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvolutionLayer {
    pub fn new() -> Self {
        Self {
            config: ConfigObject::new(&CONVOLUTION),
        }
    }

    pub fn convolution_mode(&self) -> Result<ConvolutionMode> {
        self.config.choice(MODE)?.parse()
    }

    pub fn set_convolution_mode(&mut self, mode: ConvolutionMode) -> Result<()> {
        self.config.set_choice(MODE, mode.as_str())
    }

    pub fn cudnn_algo_mode(&self) -> Result<AlgoMode> {
        self.config.choice(CUDNN_ALGO_MODE)?.parse()
    }

    pub fn set_cudnn_algo_mode(&mut self, mode: AlgoMode) -> Result<()> {
        self.config.set_choice(CUDNN_ALGO_MODE, mode.as_str())
    }

    pub fn kernel_size_x(&self) -> Result<i64> {
        self.config.int("kernelSizeX")
    }

    pub fn set_kernel_size_x(&mut self, size: i64) -> Result<()> {
        self.config.set_int("kernelSizeX", size)
    }

    pub fn kernel_size_y(&self) -> Result<i64> {
        self.config.int("kernelSizeY")
    }

    pub fn set_kernel_size_y(&mut self, size: i64) -> Result<()> {
        self.config.set_int("kernelSizeY", size)
    }

    pub fn kernel_size(&self) -> Result<[i64; 2]> {
        pair(&self.config, KERNEL_SIZE)
    }

    pub fn set_kernel_size(&mut self, size: [i64; 2]) -> Result<()> {
        self.config.set_int_array(KERNEL_SIZE, &size)
    }

    pub fn stride_x(&self) -> Result<i64> {
        self.config.int("strideX")
    }

    pub fn set_stride_x(&mut self, stride: i64) -> Result<()> {
        self.config.set_int("strideX", stride)
    }

    pub fn stride_y(&self) -> Result<i64> {
        self.config.int("strideY")
    }

    pub fn set_stride_y(&mut self, stride: i64) -> Result<()> {
        self.config.set_int("strideY", stride)
    }

    pub fn stride(&self) -> Result<[i64; 2]> {
        pair(&self.config, STRIDE)
    }

    pub fn set_stride(&mut self, stride: [i64; 2]) -> Result<()> {
        self.config.set_int_array(STRIDE, &stride)
    }

    pub fn padding_x(&self) -> Result<i64> {
        self.config.int("paddingX")
    }

    pub fn set_padding_x(&mut self, padding: i64) -> Result<()> {
        self.config.set_int("paddingX", padding)
    }

    pub fn padding_y(&self) -> Result<i64> {
        self.config.int("paddingY")
    }

    pub fn set_padding_y(&mut self, padding: i64) -> Result<()> {
        self.config.set_int("paddingY", padding)
    }

    pub fn padding(&self) -> Result<[i64; 2]> {
        pair(&self.config, PADDING)
    }

    pub fn set_padding(&mut self, padding: [i64; 2]) -> Result<()> {
        self.config.set_int_array(PADDING, &padding)
    }
}

impl OptionHandler for ConvolutionLayer {
    fn config(&self) -> &ConfigObject {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ConfigObject {
        &mut self.config
    }
}

impl LayerConfiguration for ConvolutionLayer {
    fn connect(&mut self, input: InputType) -> Result<InputType> {
        let InputType::Convolutional {
            height,
            width,
            channels,
        } = input
        else {
            return Err(ConfigError::ShapeMismatch(format!(
                "convolution layer needs convolutional input, got {}",
                input
            )));
        };

        let mode = self.convolution_mode()?;
        let [kernel_x, kernel_y] = self.kernel_size()?;
        let [stride_x, stride_y] = self.stride()?;
        let [padding_x, padding_y] = self.padding()?;
        let out_width = window_output(width, kernel_x, stride_x, padding_x, mode)?;
        let out_height = window_output(height, kernel_y, stride_y, padding_y, mode)?;
        let filters = usize::try_from(self.n_out()?).unwrap_or(0);

        self.config.set_int(N_IN, size_to_int(channels, "channel count")?)?;
        let output = InputType::Convolutional {
            height: out_height,
            width: out_width,
            channels: filters,
        };
        debug!("convolution layer: {} -> {}", input, output);
        Ok(output)
    }
}

impl BaseLayerOptions for ConvolutionLayer {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::distribution::Distribution;

    #[test]
    fn test_defaults() {
        let conv = ConvolutionLayer::new();

        assert_eq!(conv.layer_name().unwrap(), "Convolution layer");
        assert_eq!(conv.activation().unwrap(), Activation::Identity);
        assert_eq!(conv.convolution_mode().unwrap(), ConvolutionMode::Truncate);
        assert_eq!(conv.cudnn_algo_mode().unwrap(), AlgoMode::PreferFastest);
        assert_eq!(conv.kernel_size().unwrap(), [5, 5]);
        assert_eq!(conv.stride().unwrap(), [1, 1]);
        assert_eq!(conv.padding().unwrap(), [0, 0]);
        assert_eq!(conv.bias_init().unwrap(), 1.0);
        assert_eq!(conv.dist().unwrap(), Distribution::default());
        assert_eq!(conv.n_out().unwrap(), 0);
    }

    #[test]
    fn test_axis_setters_are_independent() {
        let mut conv = ConvolutionLayer::new();
        conv.set_kernel_size_x(3).unwrap();
        assert_eq!(conv.kernel_size_y().unwrap(), 5);
        conv.set_kernel_size_y(7).unwrap();
        assert_eq!(conv.kernel_size_x().unwrap(), 3);

        conv.set_padding_y(2).unwrap();
        assert_eq!(conv.padding().unwrap(), [0, 2]);
        conv.set_stride_x(2).unwrap();
        assert_eq!(conv.stride().unwrap(), [2, 1]);
    }

    #[test]
    fn test_whole_composite_setter_feeds_axis_getters() {
        let mut conv = ConvolutionLayer::new();
        conv.set_kernel_size([2, 4]).unwrap();
        assert_eq!(conv.kernel_size_x().unwrap(), 2);
        assert_eq!(conv.kernel_size_y().unwrap(), 4);
    }

    #[test]
    fn test_connect_truncate() {
        let mut conv = ConvolutionLayer::new();
        conv.set_n_out(16).unwrap();
        conv.set_kernel_size([3, 3]).unwrap();

        let output = conv
            .connect(InputType::Convolutional {
                height: 28,
                width: 28,
                channels: 1,
            })
            .unwrap();

        assert_eq!(
            output,
            InputType::Convolutional {
                height: 26,
                width: 26,
                channels: 16
            }
        );
        assert_eq!(conv.n_in().unwrap(), 1);
    }

    #[test]
    fn test_connect_rejects_feed_forward_input() {
        let mut conv = ConvolutionLayer::new();
        conv.set_n_out(4).unwrap();
        assert!(matches!(
            conv.connect(InputType::FeedForward { size: 10 }),
            Err(ConfigError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_validator_flags_bad_window() {
        let mut conv = ConvolutionLayer::new();
        conv.set_stride_y(0).unwrap();
        conv.set_padding_x(-1).unwrap();

        let mut problems = Vec::new();
        validate_convolution(conv.config(), &mut problems);
        assert_eq!(problems.len(), 2);
    }
}
