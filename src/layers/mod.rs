//! Layer configurations
//!
//! This module provides the layer configuration traits and one typed wrapper
//! per supported DeepLearning4J layer type, each backed by a static schema.

mod r#trait;
pub mod choices;
pub mod convolution;
pub mod dense;
pub mod distribution;
pub mod output;
pub mod subsampling;

// Re-export the layer traits and wrappers for convenience
pub use convolution::ConvolutionLayer;
pub use dense::DenseLayer;
pub use distribution::Distribution;
pub use output::OutputLayer;
pub use r#trait::{BaseLayerOptions, LayerConfiguration};
pub use subsampling::SubsamplingLayer;
