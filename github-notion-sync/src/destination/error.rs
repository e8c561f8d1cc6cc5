//! Notion destination error types.

use thiserror::Error;

/// Errors that can occur while reading from or writing to Notion.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// Transport failure, timeout or unreadable body.
    #[error("Notion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Notion answered with a non-success status.
    #[error("Notion API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A response did not have the expected shape.
    #[error("Malformed Notion response ({context}): {source}")]
    Malformed {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A database property exists with a type the importer cannot use.
    #[error("Notion property '{name}' has type '{found}', expected '{expected}'")]
    WrongPropertyType {
        name: String,
        expected: &'static str,
        found: String,
    },
}
