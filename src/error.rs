use thiserror::Error;

/// Errors raised by the request configuration helpers.
///
/// Configuration variants carry the offending value and the accepted set so
/// the message is enough to fix the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid app mode: {mode}. Available modes: {}", .valid.join(", "))]
    InvalidMode { mode: String, valid: Vec<String> },

    #[error("no endpoint configured for app mode: {mode}. Available modes: {}", .valid.join(", "))]
    EmptyEndpoint { mode: String, valid: Vec<String> },

    #[error("invalid size: {size}. Available sizes: {}", .valid.join(", "))]
    InvalidSize { size: String, valid: Vec<String> },

    #[error("invalid download type: {name}. Available types: {}", .valid.join(", "))]
    InvalidDownloadType { name: String, valid: Vec<String> },

    #[error("variant rank {index} is out of range for {len} variants")]
    OutOfRange { index: usize, len: usize },

    #[error("missing field `{0}` in API response")]
    MissingField(String),

    #[error("malformed field `{field}` in API response: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("environment variable {0} is not set or not valid")]
    MissingEnv(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl Error {
    /// True for errors caused by bad configuration rather than bad data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidMode { .. }
                | Error::EmptyEndpoint { .. }
                | Error::InvalidSize { .. }
                | Error::InvalidDownloadType { .. }
                | Error::MissingEnv(_)
                | Error::InvalidUrl { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
