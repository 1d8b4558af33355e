//! Subsampling (pooling) layer configuration

use crate::architecture::{window_output, InputType};
use crate::error::{ConfigError, Result};
use crate::layers::choices::{ConvolutionMode, PoolingType};
use crate::layers::r#trait::{
    layer_name_field, pair, validate_window, LayerConfiguration, KERNEL_SIZE, PADDING, STRIDE,
};
use crate::options::{ConfigObject, FieldDescriptor, OptionHandler, Schema};
use log::debug;

const POOLING_TYPE: &str = "poolingType";
const MODE: &str = "mode";
const PNORM: &str = "pnorm";
const EPS: &str = "eps";

pub static SUBSAMPLING: Schema = Schema {
    name: "subsampling",
    global_info: "A subsampling layer from DeepLearning4J.",
    fields: &SUBSAMPLING_FIELDS,
    validate: validate_subsampling,
};

static SUBSAMPLING_FIELDS: [FieldDescriptor; 14] = [
    layer_name_field("Subsampling layer"),
    FieldDescriptor::choice(POOLING_TYPE, PoolingType::VALUES, PoolingType::Max.as_str())
        .flag("poolingType")
        .order(1)
        .display("pooling type")
        .help("The type of pooling to use (default = MAX)."),
    FieldDescriptor::choice(MODE, ConvolutionMode::VALUES, ConvolutionMode::Truncate.as_str())
        .flag("mode")
        .order(2)
        .display("convolution mode")
        .help("The convolution mode (default = Truncate)."),
    FieldDescriptor::slot("kernelSizeX", KERNEL_SIZE, 0)
        .flag("kernelSizeX")
        .order(4)
        .display("number of columns in kernel")
        .help("The number of columns in the kernel (default = 2)."),
    FieldDescriptor::slot("kernelSizeY", KERNEL_SIZE, 1)
        .flag("kernelSizeY")
        .order(5)
        .display("number of rows in kernel")
        .help("The number of rows in the kernel (default = 2)."),
    FieldDescriptor::slot("strideX", STRIDE, 0)
        .flag("strideX")
        .order(6)
        .display("number of columns in stride")
        .help("The number of columns in the stride (default = 2)."),
    FieldDescriptor::slot("strideY", STRIDE, 1)
        .flag("strideY")
        .order(7)
        .display("number of rows in stride")
        .help("The number of rows in the stride (default = 2)."),
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
    FieldDescriptor::int(PNORM, 1)
        .flag("pnorm")
        .order(10)
        .display("pnorm value")
        .help("The value of the pnorm parameter (default = 1)."),
    FieldDescriptor::double(EPS, 1e-8)
        .flag("eps")
        .order(11)
        .display("eps")
        .help("The value of the eps parameter (default = 1e-8)."),
    FieldDescriptor::int_array(KERNEL_SIZE, &[2, 2]),
    FieldDescriptor::int_array(STRIDE, &[2, 2]),
    FieldDescriptor::int_array(PADDING, &[0, 0]),
];

fn validate_subsampling(object: &ConfigObject, problems: &mut Vec<String>) {
    validate_window(object, problems);
    if let Ok(pnorm) = object.int(PNORM) {
        if pnorm < 1 {
            problems.push(format!("pnorm must be positive, got {}", pnorm));
        }
    }
    if let Ok(eps) = object.double(EPS) {
        if eps <= 0.0 {
            problems.push(format!("eps must be positive, got {}", eps));
        }
    }
}

/// Pooling layer. Has no weights, so none of the base layer settings apply.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsamplingLayer {
    config: ConfigObject,
}

impl Default for SubsamplingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SubsamplingLayer {
    pub fn new() -> Self {
        Self {
            config: ConfigObject::new(&SUBSAMPLING),
        }
    }

    pub fn pooling_type(&self) -> Result<PoolingType> {
        self.config.choice(POOLING_TYPE)?.parse()
    }

    pub fn set_pooling_type(&mut self, pooling: PoolingType) -> Result<()> {
        self.config.set_choice(POOLING_TYPE, pooling.as_str())
    }

    pub fn convolution_mode(&self) -> Result<ConvolutionMode> {
        self.config.choice(MODE)?.parse()
    }

    pub fn set_convolution_mode(&mut self, mode: ConvolutionMode) -> Result<()> {
        self.config.set_choice(MODE, mode.as_str())
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

    pub fn pnorm(&self) -> Result<i64> {
        self.config.int(PNORM)
    }

    pub fn set_pnorm(&mut self, pnorm: i64) -> Result<()> {
        self.config.set_int(PNORM, pnorm)
    }

    pub fn eps(&self) -> Result<f64> {
        self.config.double(EPS)
    }

    pub fn set_eps(&mut self, eps: f64) -> Result<()> {
        self.config.set_double(EPS, eps)
    }
}

impl OptionHandler for SubsamplingLayer {
    fn config(&self) -> &ConfigObject {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ConfigObject {
        &mut self.config
    }
}

impl LayerConfiguration for SubsamplingLayer {
    /// Pools each channel independently; the channel count passes through.
    fn connect(&mut self, input: InputType) -> Result<InputType> {
        let InputType::Convolutional {
            height,
            width,
            channels,
        } = input
        else {
            return Err(ConfigError::ShapeMismatch(format!(
                "subsampling layer needs convolutional input, got {}",
                input
            )));
        };

        let mode = self.convolution_mode()?;
        let [kernel_x, kernel_y] = self.kernel_size()?;
        let [stride_x, stride_y] = self.stride()?;
        let [padding_x, padding_y] = self.padding()?;
        let output = InputType::Convolutional {
            height: window_output(height, kernel_y, stride_y, padding_y, mode)?,
            width: window_output(width, kernel_x, stride_x, padding_x, mode)?,
            channels,
        };
        debug!("subsampling layer: {} -> {}", input, output);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pool = SubsamplingLayer::new();
        assert_eq!(pool.layer_name().unwrap(), "Subsampling layer");
        assert_eq!(pool.pooling_type().unwrap(), PoolingType::Max);
        assert_eq!(pool.kernel_size().unwrap(), [2, 2]);
        assert_eq!(pool.stride().unwrap(), [2, 2]);
        assert_eq!(pool.padding().unwrap(), [0, 0]);
        assert_eq!(pool.pnorm().unwrap(), 1);
        assert_eq!(pool.eps().unwrap(), 1e-8);
    }

    #[test]
    fn test_has_no_weight_options() {
        let pool = SubsamplingLayer::new();
        let flags: Vec<&str> = pool.list_options().iter().map(|o| o.flag).collect();
        assert_eq!(
            flags,
            vec![
                "name",
                "poolingType",
                "mode",
                "kernelSizeX",
                "kernelSizeY",
                "strideX",
                "strideY",
                "paddingX",
                "paddingY",
                "pnorm",
                "eps"
            ]
        );
    }

    #[test]
    fn test_connect_halves_spatial_size() {
        let mut pool = SubsamplingLayer::new();
        let output = pool
            .connect(InputType::Convolutional {
                height: 24,
                width: 24,
                channels: 20,
            })
            .unwrap();
        assert_eq!(
            output,
            InputType::Convolutional {
                height: 12,
                width: 12,
                channels: 20
            }
        );
    }

    #[test]
    fn test_validator_rejects_zero_pnorm() {
        let mut pool = SubsamplingLayer::new();
        pool.set_pnorm(0).unwrap();
        let mut problems = Vec::new();
        validate_subsampling(pool.config(), &mut problems);
        assert_eq!(problems, vec!["pnorm must be positive, got 0".to_string()]);
    }
}
