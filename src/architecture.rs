//! Layer factory and architecture files
//!
//! This module turns configured layers into immutable `LayerSpec` snapshots
//! for the numerical back end. `finalize` validates and freezes a single
//! configuration object; `NetworkBuilder` connects a sequence of layers to an
//! input shape, fills in their programmatic fields and finalizes them all.
//! Architectures can also be described in JSON files, with every layer's
//! settings written as command-line options.

use crate::config::NetworkConfiguration;
use crate::error::{ConfigError, Result};
use crate::layers::choices::ConvolutionMode;
use crate::layers::{ConvolutionLayer, DenseLayer, LayerConfiguration, OutputLayer, SubsamplingLayer};
use crate::options::codec;
use crate::options::{ConfigObject, OptionHandler, Value};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Shape of the data flowing into a layer.
///
/// # Example
///
/// ```json
/// { "type": "convolutional", "height": 28, "width": 28, "channels": 1 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputType {
    /// Image-like data, `height x width x channels`.
    Convolutional {
        height: usize,
        width: usize,
        channels: usize,
    },
    /// Flat feature vector.
    FeedForward { size: usize },
}

impl InputType {
    /// Number of values in one example.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `height * width * channels` overflows.
    pub fn flat_size(&self) -> Result<usize> {
        match *self {
            InputType::Convolutional {
                height,
                width,
                channels,
            } => height
                .checked_mul(width)
                .and_then(|area| area.checked_mul(channels))
                .ok_or_else(|| ConfigError::ShapeMismatch(format!("{} is too large to flatten", self))),
            InputType::FeedForward { size } => Ok(size),
        }
    }
}

/// Converts a size into an integer attribute value.
pub(crate) fn size_to_int(size: usize, what: &str) -> Result<i64> {
    i64::try_from(size)
        .map_err(|_| ConfigError::ShapeMismatch(format!("{} {} does not fit an integer option", what, size)))
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Convolutional {
                height,
                width,
                channels,
            } => write!(f, "convolutional {}x{}x{}", height, width, channels),
            InputType::FeedForward { size } => write!(f, "feed-forward {}", size),
        }
    }
}

/// Output length along one axis of a convolution or pooling window.
///
/// - `Truncate`: `(input + 2 * padding - kernel) / stride + 1`, rounding down
/// - `Strict`: same formula, but the division must be exact
/// - `Same`: `ceil(input / stride)`; padding is ignored
///
/// # Errors
///
/// Returns `ShapeMismatch` if the window does not fit the input or, in
/// `Strict` mode, does not tile it exactly.
pub fn window_output(
    input: usize,
    kernel: i64,
    stride: i64,
    padding: i64,
    mode: ConvolutionMode,
) -> Result<usize> {
    if kernel < 1 || stride < 1 || padding < 0 {
        return Err(ConfigError::ShapeMismatch(format!(
            "invalid window: kernel {}, stride {}, padding {}",
            kernel, stride, padding
        )));
    }
    // Wide enough that no combination of usize input and i64 window overflows.
    let (wide_input, kernel, stride, padding) =
        (input as i128, i128::from(kernel), i128::from(stride), i128::from(padding));
    let too_large = || {
        ConfigError::ShapeMismatch(format!(
            "window output for input {} is too large",
            input
        ))
    };

    if mode == ConvolutionMode::Same {
        return usize::try_from((wide_input + stride - 1) / stride).map_err(|_| too_large());
    }

    let span = wide_input + 2 * padding - kernel;
    if span < 0 {
        return Err(ConfigError::ShapeMismatch(format!(
            "kernel {} does not fit input {} with padding {}",
            kernel, input, padding
        )));
    }
    if mode == ConvolutionMode::Strict && span % stride != 0 {
        return Err(ConfigError::ShapeMismatch(format!(
            "Strict mode: (input {} + 2 * padding {} - kernel {}) is not divisible by stride {}",
            input, padding, kernel, stride
        )));
    }
    usize::try_from(span / stride + 1).map_err(|_| too_large())
}

/// Immutable snapshot of a finalized configuration object.
///
/// This is what the numerical back end consumes. It has no mutators and
/// serializes to JSON as `{ "kind", "name", "params" }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    kind: &'static str,
    name: String,
    params: ConfigObject,
}

impl LayerSpec {
    /// Configuration type, e.g. `convolution`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &ConfigObject {
        &self.params
    }

    pub fn get(&self, field: &str) -> Result<Value> {
        self.params.get(field)
    }
}

fn collect_problems(object: &ConfigObject, prefix: &str, problems: &mut Vec<String>) {
    let mut own = Vec::new();
    (object.schema().validate)(object, &mut own);
    problems.extend(own.into_iter().map(|problem| format!("{}{}", prefix, problem)));

    for (name, value) in object.attributes() {
        if let Value::Object(nested) = value {
            collect_problems(nested, &format!("{}{}.", prefix, name), problems);
        }
    }
}

/// Validates `object` without finalizing it.
///
/// # Errors
///
/// - `IncompleteConfiguration` listing every required field still unset,
///   including those of nested objects
/// - `InvalidConfiguration` listing every cross-field problem
pub fn check(object: &ConfigObject) -> Result<()> {
    let schema = object.schema().name.to_string();

    let fields = object.unset_required();
    if !fields.is_empty() {
        return Err(ConfigError::IncompleteConfiguration { schema, fields });
    }

    let mut problems = Vec::new();
    collect_problems(object, "", &mut problems);
    if !problems.is_empty() {
        return Err(ConfigError::InvalidConfiguration { schema, problems });
    }
    Ok(())
}

/// Validates `object`, moves it (and its nested objects) to the finalized
/// state and returns its snapshot.
///
/// Later writes to `object` fail with `FinalizedObject`; the snapshot is
/// unaffected either way.
///
/// # Errors
///
/// `FinalizedObject` if `object` was already finalized, otherwise the
/// errors of `check`. The object is left unchanged on error.
///
/// # Example
///
/// ```
/// use weka_dl4j_layers::architecture::finalize;
/// use weka_dl4j_layers::layers::DenseLayer;
/// use weka_dl4j_layers::options::OptionHandler;
///
/// let mut dense = DenseLayer::new();
/// assert!(finalize(dense.config_mut()).is_err()); // nOut unset
///
/// dense.set_options(&["-nOut", "64"]).unwrap();
/// let spec = finalize(dense.config_mut()).unwrap();
/// assert_eq!(spec.kind(), "dense");
/// assert!(dense.set_options(&["-nOut", "32"]).is_err());
/// ```
pub fn finalize(object: &mut ConfigObject) -> Result<LayerSpec> {
    let schema = object.schema();
    if object.is_finalized() {
        return Err(ConfigError::FinalizedObject {
            field: schema.name.to_string(),
        });
    }
    check(object)?;

    object.mark_finalized();
    let name = object
        .string("name")
        .map(str::to_string)
        .unwrap_or_else(|_| schema.name.to_string());
    debug!("finalized {} '{}'", schema.name, name);

    Ok(LayerSpec {
        kind: schema.name,
        name,
        params: object.clone(),
    })
}

/// A finalized network: settings plus layer specifications in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    settings: LayerSpec,
    layers: Vec<LayerSpec>,
    output_type: InputType,
}

impl Network {
    pub fn settings(&self) -> &LayerSpec {
        &self.settings
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Shape produced by the last layer.
    pub fn output_type(&self) -> InputType {
        self.output_type
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Assembles a network from an input shape and an ordered list of layers.
///
/// `build` runs in two passes. The first connects each layer to the shape
/// produced by its predecessor, setting `nIn` (and the output layer's `nOut`
/// from the number of classes) and validating it. Only if every layer passes
/// does the second pass finalize them.
///
/// # Example
///
/// ```
/// use weka_dl4j_layers::architecture::{InputType, NetworkBuilder};
/// use weka_dl4j_layers::layers::{BaseLayerOptions, DenseLayer, OutputLayer};
///
/// let mut hidden = DenseLayer::new();
/// hidden.set_n_out(32).unwrap();
///
/// let network = NetworkBuilder::new(InputType::FeedForward { size: 784 })
///     .num_classes(10)
///     .layer(hidden)
///     .layer(OutputLayer::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(network.layers().len(), 2);
/// assert_eq!(network.output_type(), InputType::FeedForward { size: 10 });
/// ```
pub struct NetworkBuilder {
    input: InputType,
    num_classes: Option<usize>,
    settings: NetworkConfiguration,
    layers: Vec<Box<dyn LayerConfiguration>>,
}

impl NetworkBuilder {
    pub fn new(input: InputType) -> Self {
        Self {
            input,
            num_classes: None,
            settings: NetworkConfiguration::new(),
            layers: Vec::new(),
        }
    }

    pub fn settings(mut self, settings: NetworkConfiguration) -> Self {
        self.settings = settings;
        self
    }

    pub fn num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = Some(num_classes);
        self
    }

    pub fn layer<L: LayerConfiguration + 'static>(self, layer: L) -> Self {
        self.boxed_layer(Box::new(layer))
    }

    pub fn boxed_layer(mut self, layer: Box<dyn LayerConfiguration>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Connects, validates and finalizes every layer.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` for a network without layers or with invalid settings
    /// - `Layer { index, .. }` wrapping the first failing layer's error
    pub fn build(self) -> Result<Network> {
        let NetworkBuilder {
            input,
            num_classes,
            settings,
            mut layers,
        } = self;

        if layers.is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                schema: "network".to_string(),
                problems: vec!["a network needs at least one layer".to_string()],
            });
        }

        let mut shape = input;
        for (index, layer) in layers.iter_mut().enumerate() {
            shape = prepare(layer.as_mut(), shape, num_classes).map_err(|err| at(index, err))?;
        }

        let mut settings = settings.into_config();
        let settings = finalize(&mut settings)?;
        let specs = layers
            .iter_mut()
            .enumerate()
            .map(|(index, layer)| finalize(layer.config_mut()).map_err(|err| at(index, err)))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "assembled network: {} layer(s), {} -> {}",
            specs.len(),
            input,
            shape
        );
        Ok(Network {
            settings,
            layers: specs,
            output_type: shape,
        })
    }
}

fn at(index: usize, err: ConfigError) -> ConfigError {
    ConfigError::Layer {
        index,
        source: Box::new(err),
    }
}

fn prepare(
    layer: &mut dyn LayerConfiguration,
    input: InputType,
    num_classes: Option<usize>,
) -> Result<InputType> {
    if let Some(num_classes) = num_classes {
        layer.bind_classes(num_classes)?;
    }
    check(layer.config())?;
    layer.connect(input)
}

/// Command-line options for one object, as a single line or a token list.
///
/// ```json
/// "-nFilters 16 -kernelSizeX 3"
/// ["-nFilters", "16", "-kernelSizeX", "3"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionTokens {
    Line(String),
    Tokens(Vec<String>),
}

impl Default for OptionTokens {
    fn default() -> Self {
        OptionTokens::Tokens(Vec::new())
    }
}

impl OptionTokens {
    pub fn tokens(&self) -> Result<Vec<String>> {
        match self {
            OptionTokens::Line(line) => codec::split_options(line),
            OptionTokens::Tokens(tokens) => Ok(tokens.clone()),
        }
    }
}

/// One layer of an architecture file.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerEntry {
    /// "convolution", "dense", "output" or "subsampling" (case-insensitive)
    pub layer_type: String,
    #[serde(default)]
    pub options: OptionTokens,
}

/// A network described in a JSON file.
///
/// # Example
///
/// ```json
/// {
///   "network": "-seed 42 -updater ADAM -learningRate 0.001",
///   "input": { "type": "convolutional", "height": 28, "width": 28, "channels": 1 },
///   "num_classes": 10,
///   "layers": [
///     { "layer_type": "convolution", "options": "-nFilters 20 -activation RELU" },
///     { "layer_type": "subsampling" },
///     { "layer_type": "dense", "options": ["-nOut", "500", "-activation", "RELU"] },
///     { "layer_type": "output" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureConfig {
    #[serde(default)]
    pub network: OptionTokens,
    pub input: InputType,
    #[serde(default)]
    pub num_classes: Option<usize>,
    pub layers: Vec<LayerEntry>,
}

/// Loads an architecture description from a JSON file.
///
/// # Errors
///
/// `Io` / `Json` if the file cannot be read or parsed, `InvalidConfiguration`
/// if it lists no layers or zero classes.
///
/// # Examples
///
/// ```no_run
/// use weka_dl4j_layers::architecture::{build_model, load_architecture};
///
/// let arch = load_architecture("lenet.json").unwrap();
/// let network = build_model(&arch).unwrap();
/// println!("{}", network.to_json().unwrap());
/// ```
pub fn load_architecture<P: AsRef<Path>>(path: P) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    debug!(
        "loaded architecture from {} with {} layer(s)",
        path.as_ref().display(),
        config.layers.len()
    );
    Ok(config)
}

fn validate_architecture(config: &ArchitectureConfig) -> Result<()> {
    let mut problems = Vec::new();
    if config.layers.is_empty() {
        problems.push("architecture must have at least one layer".to_string());
    }
    if config.num_classes == Some(0) {
        problems.push("num_classes must be greater than 0".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::InvalidConfiguration {
            schema: "architecture".to_string(),
            problems,
        })
    }
}

/// Creates a layer of the named type and applies `options` to it.
///
/// # Errors
///
/// `UnknownSchema` for an unknown layer type, `Decode` if the options do
/// not apply.
pub fn layer_from_options<S: AsRef<str>>(
    layer_type: &str,
    options: &[S],
) -> Result<Box<dyn LayerConfiguration>> {
    let mut layer: Box<dyn LayerConfiguration> = match layer_type.to_lowercase().as_str() {
        "convolution" => Box::new(ConvolutionLayer::new()),
        "dense" => Box::new(DenseLayer::new()),
        "output" => Box::new(OutputLayer::new()),
        "subsampling" => Box::new(SubsamplingLayer::new()),
        _ => return Err(ConfigError::UnknownSchema(layer_type.to_string())),
    };
    codec::decode(layer.config_mut(), options)?;
    Ok(layer)
}

/// Builds and finalizes the network described by `config`.
///
/// Errors in a layer's options are reported as `Layer { index, .. }`.
pub fn build_model(config: &ArchitectureConfig) -> Result<Network> {
    validate_architecture(config)?;

    let mut settings = NetworkConfiguration::new();
    codec::decode(settings.config_mut(), &config.network.tokens()?)?;

    let mut builder = NetworkBuilder::new(config.input).settings(settings);
    if let Some(num_classes) = config.num_classes {
        builder = builder.num_classes(num_classes);
    }

    for (index, entry) in config.layers.iter().enumerate() {
        let layer = entry
            .options
            .tokens()
            .and_then(|tokens| layer_from_options(&entry.layer_type, &tokens))
            .map_err(|err| at(index, err))?;
        builder = builder.boxed_layer(layer);
    }

    builder.build()
}
