// Error taxonomy shared by the API, CLI and library components

use thiserror::Error;

/// Failures decoding catalog text (example cases, signature metadata)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("arity must be positive, got {0}")]
    Arity(usize),
    #[error("{lines} non-blank lines cannot be grouped into cases of {arity} arguments")]
    MalformedCases { lines: usize, arity: usize },
    #[error("signature metadata could not be decoded: {0}")]
    Signature(String),
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("no harness target for language '{0}'")]
    UnsupportedLanguage(String),
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("case {index} has {found} arguments, signature declares {expected}")]
    ArityMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("failed to encode case data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to render harness template: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// Failures talking to the remote execution service.
///
/// Upstream status and body are carried verbatim so callers can surface them.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("submission rejected ({status}): {body}")]
    Submit { status: u16, body: String },
    #[error("status request failed ({status}): {body}")]
    Poll { status: u16, body: String },
    #[error("no job token supplied")]
    MissingToken,
    #[error("execution service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected execution service payload: {0}")]
    Decode(String),
}

impl ExecutionError {
    /// Upstream HTTP status, when the service answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ExecutionError::Submit { status, .. } | ExecutionError::Poll { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("catalog unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected catalog payload: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}
