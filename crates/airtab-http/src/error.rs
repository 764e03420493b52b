//! Configuration errors for the HTTP transport.

use thiserror::Error;

/// Invalid or missing client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No API key was given.
    #[error("missing API key (set AIRTABLE_API_KEY)")]
    MissingApiKey,

    /// No base id was given.
    #[error("missing base id (set AIRTABLE_BASE_ID)")]
    MissingBaseId,

    /// The root URL is malformed or not allowed.
    #[error("invalid root URL '{value}': {reason}")]
    InvalidRootUrl { value: String, reason: String },

    /// The API version is not a single path segment.
    #[error("invalid API version '{0}'")]
    InvalidVersion(String),

    /// The API key cannot be sent in a header.
    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<ConfigError> for airtab_core::Error {
    fn from(err: ConfigError) -> Self {
        airtab_core::Error::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_core_config_error() {
        let err = airtab_core::Error::from(ConfigError::MissingBaseId);
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "configuration error: missing base id (set AIRTABLE_BASE_ID)"
        );
    }
}
