use thiserror::Error;

/// Result type for tagger operations
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Errors that can occur while setting up tagging
///
/// Tagging and resolution themselves never fail: malformed source produces
/// best-effort tags and an unresolvable cursor yields `None`.
#[derive(Error, Debug)]
pub enum TaggerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Declaration pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl TaggerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
