//! Error taxonomy for option decoding, configuration objects and layer assembly
//!
//! Programming errors (`UnknownField`, `DuplicateFlag`, `KindMismatch`,
//! `FinalizedObject`) indicate a broken schema or misuse of the API. User
//! input errors are aggregated into a single `Decode` report so a whole
//! command line can be fixed in one pass.

use std::fmt;
use thiserror::Error;

/// One problem found while decoding a token sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeIssue {
    /// A token in flag position that matches no declared flag.
    UnrecognizedFlag { token: String },
    /// A value token that does not parse for the flag's declared kind.
    MalformedValue {
        flag: String,
        value: String,
        reason: String,
    },
    /// A flag at the end of the sequence, or directly followed by another flag.
    MissingValue { flag: String },
}

impl DecodeIssue {
    /// The offending token: the raw token for unrecognized flags, the flag name otherwise.
    pub fn token(&self) -> &str {
        match self {
            DecodeIssue::UnrecognizedFlag { token } => token,
            DecodeIssue::MalformedValue { flag, .. } => flag,
            DecodeIssue::MissingValue { flag } => flag,
        }
    }
}

impl fmt::Display for DecodeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeIssue::UnrecognizedFlag { token } => {
                write!(f, "unrecognized option '{}'", token)
            }
            DecodeIssue::MalformedValue {
                flag,
                value,
                reason,
            } => write!(f, "malformed value '{}' for -{}: {}", value, flag, reason),
            DecodeIssue::MissingValue { flag } => write!(f, "missing value for -{}", flag),
        }
    }
}

fn join_issues(issues: &[DecodeIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown field '{field}' in {schema}")]
    UnknownField { schema: String, field: String },

    #[error("Flag -{flag} is declared more than once in {schema}")]
    DuplicateFlag { schema: String, flag: String },

    #[error("Field '{field}' expects a value of kind {expected}")]
    KindMismatch { field: String, expected: String },

    #[error("Invalid options for {schema}: {}", join_issues(.issues))]
    Decode {
        schema: String,
        issues: Vec<DecodeIssue>,
    },

    #[error("Unbalanced quotes in option string: {0}")]
    UnbalancedQuotes(String),

    #[error("Incomplete configuration for {schema}: unset required field(s) {}", .fields.join(", "))]
    IncompleteConfiguration { schema: String, fields: Vec<String> },

    #[error("Invalid configuration for {schema}: {}", .problems.join("; "))]
    InvalidConfiguration {
        schema: String,
        problems: Vec<String>,
    },

    #[error("Cannot modify '{field}': configuration is finalized")]
    FinalizedObject { field: String },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Layer {index}: {source}")]
    Layer {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("Unknown configuration type '{0}'")]
    UnknownSchema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Decode issues carried by this error, looking through `Layer` wrappers.
    pub fn issues(&self) -> &[DecodeIssue] {
        match self {
            ConfigError::Decode { issues, .. } => issues,
            ConfigError::Layer { source, .. } => source.issues(),
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
