//! Enumerated option values
//!
//! Each enum mirrors a DeepLearning4J setting. `VALUES` is the legal,
//! case-sensitive name set used by the field descriptors, and `FromStr`
//! parses exactly those names.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

macro_rules! option_choice {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Legal names, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ConfigError::KindMismatch {
                        field: stringify!($name).to_string(),
                        expected: format!("one of {}", Self::VALUES.join(", ")),
                    }),
                }
            }
        }
    };
}

option_choice! {
    /// Activation function applied to a layer's output.
    Activation {
        Cube => "CUBE",
        Elu => "ELU",
        HardSigmoid => "HARDSIGMOID",
        HardTanh => "HARDTANH",
        Identity => "IDENTITY",
        LeakyRelu => "LEAKYRELU",
        RationalTanh => "RATIONALTANH",
        Relu => "RELU",
        Sigmoid => "SIGMOID",
        Softmax => "SOFTMAX",
        Softplus => "SOFTPLUS",
        Softsign => "SOFTSIGN",
        Tanh => "TANH",
    }
}

option_choice! {
    /// Weight initialization scheme.
    WeightInit {
        Distribution => "DISTRIBUTION",
        Zero => "ZERO",
        Ones => "ONES",
        SigmoidUniform => "SIGMOID_UNIFORM",
        Uniform => "UNIFORM",
        Xavier => "XAVIER",
        XavierUniform => "XAVIER_UNIFORM",
        XavierFanIn => "XAVIER_FAN_IN",
        XavierLegacy => "XAVIER_LEGACY",
        Relu => "RELU",
        ReluUniform => "RELU_UNIFORM",
    }
}

option_choice! {
    /// How convolution and pooling handle inputs that do not tile exactly.
    ConvolutionMode {
        Strict => "Strict",
        Truncate => "Truncate",
        Same => "Same",
    }
}

option_choice! {
    /// cuDNN algorithm selection.
    AlgoMode {
        NoWorkspace => "NO_WORKSPACE",
        PreferFastest => "PREFER_FASTEST",
        UserSpecified => "USER_SPECIFIED",
    }
}

option_choice! {
    GradientNormalization {
        None => "None",
        RenormalizeL2PerLayer => "RenormalizeL2PerLayer",
        RenormalizeL2PerParamType => "RenormalizeL2PerParamType",
        ClipElementWiseAbsoluteValue => "ClipElementWiseAbsoluteValue",
        ClipL2PerLayer => "ClipL2PerLayer",
        ClipL2PerParamType => "ClipL2PerParamType",
    }
}

option_choice! {
    PoolingType {
        Max => "MAX",
        Avg => "AVG",
        Sum => "SUM",
        Pnorm => "PNORM",
    }
}

option_choice! {
    /// Loss function of an output layer.
    LossFunction {
        Mse => "MSE",
        L1 => "L1",
        Xent => "XENT",
        Mcxent => "MCXENT",
        SquaredLoss => "SQUARED_LOSS",
        NegativeLogLikelihood => "NEGATIVELOGLIKELIHOOD",
        Hinge => "HINGE",
        SquaredHinge => "SQUARED_HINGE",
        KlDivergence => "KL_DIVERGENCE",
        MeanAbsoluteError => "MEAN_ABSOLUTE_ERROR",
        CosineProximity => "COSINE_PROXIMITY",
        Poisson => "POISSON",
    }
}

option_choice! {
    OptimizationAlgorithm {
        LineGradientDescent => "LINE_GRADIENT_DESCENT",
        ConjugateGradient => "CONJUGATE_GRADIENT",
        Lbfgs => "LBFGS",
        StochasticGradientDescent => "STOCHASTIC_GRADIENT_DESCENT",
    }
}

option_choice! {
    /// Parameter update rule used by the training engine.
    Updater {
        Sgd => "SGD",
        Adam => "ADAM",
        AdaMax => "ADAMAX",
        AdaDelta => "ADADELTA",
        Nesterovs => "NESTEROVS",
        Nadam => "NADAM",
        AdaGrad => "ADAGRAD",
        RmsProp => "RMSPROP",
        NoOp => "NONE",
    }
}
