use std::path::PathBuf;

/// Errors surfaced by the terminal URI codec.
///
/// An untrusted URI is deliberately absent from this list: dropping its
/// sensitive fields is the normal decode path, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A structured query value (`command`, `environmentVariables`,
    /// `preservedCommands`) was not valid JSON of the expected shape.
    #[error("malformed `{field}` parameter: {source}")]
    MalformedField {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A structured field could not be serialized while encoding.
    #[error("failed to encode `{field}` parameter: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The configured scheme/host pair does not parse as a URI.
    #[error("invalid terminal URI prefix `{prefix}`: {source}")]
    InvalidPrefix {
        prefix: String,
        #[source]
        source: url::ParseError,
    },

    /// The configured prefix parses but cannot serve as a namespace
    /// (empty host, or a path, query or fragment).
    #[error("unusable terminal URI prefix `{prefix}`: {reason}")]
    UnusablePrefix { prefix: String, reason: String },

    /// The OS random source failed while generating the trust token.
    #[error("secure random source unavailable: {0}")]
    RandomSource(#[from] getrandom::Error),

    /// A config file exists but could not be read.
    #[error("failed to read config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl CodecError {
    pub(crate) fn malformed(field: &'static str, source: serde_json::Error) -> Self {
        Self::MalformedField { field, source }
    }
}
