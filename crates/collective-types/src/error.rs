use thiserror::Error;

use crate::persona::PersonaId;

/// Errors related to persona operations.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("persona {0} not found")]
    NotFound(PersonaId),

    #[error("persona template '{0}' not found")]
    TemplateNotFound(String),
}

/// Errors from key-value repository operations (used by the `KvStore` port).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid key '{0}'")]
    InvalidKey(String),
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("provide both an access key id and a secret access key")]
    MissingCredentials,

    #[error("invalid region: '{0}'")]
    InvalidRegion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_not_found_display() {
        let err = PersonaError::TemplateNotFound("pirate".to_string());
        assert_eq!(err.to_string(), "persona template 'pirate' not found");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::InvalidKey("../etc".to_string());
        assert_eq!(err.to_string(), "invalid key '../etc'");
    }

    #[test]
    fn test_missing_credentials_display() {
        assert!(
            ConfigError::MissingCredentials
                .to_string()
                .contains("secret access key")
        );
    }
}
