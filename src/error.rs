//! Error types for the page interaction layer.
//!
//! ERROR HANDLING
//! ==============
//! Nothing in this layer is fatal. Each error is logged where it is observed
//! and the affected feature degrades to inactive; none of these types crosses
//! an event handler boundary.

/// Failure reading or writing one of the preference persistence locations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The location does not exist in this environment (no `localStorage`,
    /// no cookie-capable document).
    #[error("storage unavailable")]
    Unavailable,
    /// The browser refused the access (quota, privacy mode, sandboxing).
    #[error("storage access rejected: {0}")]
    Rejected(String),
}

/// Failure of a like request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LikeError {
    /// The control carries no usable content item id.
    #[error("like control has no post id")]
    MissingPostId,
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint answered with a non-2xx status.
    #[error("like request failed: {0}")]
    Status(u16),
    /// The response body was not the expected `{"likes": n}` object.
    #[error("invalid like response: {0}")]
    Decode(String),
}

/// Failure loading the page configuration block.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed page config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid page config: {0}")]
    Invalid(String),
}
