//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("Missing required setting {name}: {hint}")]
    MissingVar {
        name: &'static str,
        hint: &'static str,
    },

    /// A setting is present but its value cannot be used.
    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },

    /// The inline JSON user map could not be parsed.
    #[error("Failed to parse GITHUB_NOTION_USER_MAP as a JSON object of strings: {source}")]
    UserMapJson {
        #[source]
        source: serde_json::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse user map '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
