//! Error types for link parsing, serialization and document rendering
//!
//! This crate uses a unified error convention (see crate-level docs):
//! - **UnsupportedScheme**: Unknown scheme prefix (e.g. `hysteria2://`, `unknown://`).
//! - **InvalidInput**: Empty or oversized input, before any scheme is looked at.
//! - **MalformedLink**: Structural split failure (missing `@` or `:`), unparseable port, missing host or credential.
//! - **InvalidPayload**: Bad base64 or JSON inside a VMess body or Shadowsocks userinfo.
//! - **UnsupportedCombination**: A target format has no encoding for the scheme.
//! - **TemplateLoadFailure**: A template could not be resolved or compiled, even after baseline fallback.

use std::fmt;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting links into configuration documents
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Link scheme is not one of vless/vmess/trojan/ss
    UnsupportedScheme(String),
    /// Input is empty or exceeds the maximum link length
    InvalidInput(String),
    /// Link structure is broken (missing `@`, bad port, missing host)
    MalformedLink(String),
    /// Encoded payload could not be decoded (base64, UTF-8, JSON)
    InvalidPayload(String),
    /// Serializer has no encoding for this scheme
    UnsupportedCombination {
        /// Target format id
        format: String,
        /// Scheme of the record
        scheme: String,
    },
    /// Template source unresolvable or not compilable
    TemplateLoadFailure(String),
    /// No link in a batch produced a usable fragment
    BatchFailed(String),
    /// Settings could not be read or parsed
    Config(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::UnsupportedScheme(msg) => write!(f, "Unsupported scheme: {}", msg),
            ConvertError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ConvertError::MalformedLink(msg) => write!(f, "Malformed link: {}", msg),
            ConvertError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            ConvertError::UnsupportedCombination { format, scheme } => {
                write!(f, "Unsupported combination: {} has no {} encoding", format, scheme)
            }
            ConvertError::TemplateLoadFailure(msg) => write!(f, "Template load failure: {}", msg),
            ConvertError::BatchFailed(msg) => write!(f, "No link could be converted:\n{}", msg),
            ConvertError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<base64::DecodeError> for ConvertError {
    fn from(err: base64::DecodeError) -> Self {
        ConvertError::InvalidPayload(format!("Base64 decode error: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for ConvertError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ConvertError::InvalidPayload(format!("Invalid UTF-8: {}", err))
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::InvalidPayload(format!("JSON parse error: {}", err))
    }
}

impl From<toml::de::Error> for ConvertError {
    fn from(err: toml::de::Error) -> Self {
        ConvertError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        ConvertError::TemplateLoadFailure(format!("YAML render error: {}", err))
    }
}
