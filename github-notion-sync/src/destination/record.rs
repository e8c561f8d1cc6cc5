//! Values exchanged with the destination database.

use crate::config::RepositoryMode;
use crate::content::Block;
use serde::Serialize;
use std::fmt;

/// Option sets of the database's label and repository properties, in
/// destination order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    /// Label multi-select options.
    pub labels: Vec<String>,
    /// Repository select options; empty when repositories are relations.
    pub repos: Vec<String>,
}

/// Identifier of a record (Notion page) in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps a raw page id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw page id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a record points at its source repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryRef {
    /// Select option named after the repository.
    Select { property: String, name: String },
    /// Relation to a page representing the repository.
    Relation { property: String, page_id: String },
}

impl RepositoryRef {
    /// Builds the reference for `repo` under the configured mode.
    #[must_use]
    pub fn for_mode(mode: &RepositoryMode, repo: &str) -> Self {
        match mode {
            RepositoryMode::Select { property } => Self::Select {
                property: property.clone(),
                name: repo.to_string(),
            },
            RepositoryMode::Relation { property, page_id } => Self::Relation {
                property: property.clone(),
                page_id: page_id.clone(),
            },
        }
    }

    /// Returns the repository option that must exist in the taxonomy, if
    /// repositories are select options.
    #[must_use]
    pub fn option_name(&self) -> Option<&str> {
        match self {
            Self::Select { name, .. } => Some(name),
            Self::Relation { .. } => None,
        }
    }
}

/// A record to create, with its properties already mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub title: String,
    /// Source URL; the idempotency key.
    pub link: String,
    pub status: String,
    pub labels: Vec<String>,
    /// Notion user ids of the resolved assignees.
    pub assignees: Vec<String>,
    pub repository: RepositoryRef,
    pub icon_url: String,
    /// Initial page content; at most one request's worth of blocks.
    pub body: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_mode_names_the_repository_option() {
        let reference = RepositoryRef::for_mode(&RepositoryMode::default(), "widgets");

        assert_eq!(reference.option_name(), Some("widgets"));
        assert!(matches!(
            reference,
            RepositoryRef::Select { ref property, .. } if property == "Repository"
        ));
    }

    #[test]
    fn relation_mode_has_no_option() {
        let mode = RepositoryMode::Relation {
            property: "Project".to_string(),
            page_id: "page-1".to_string(),
        };
        let reference = RepositoryRef::for_mode(&mode, "widgets");

        assert_eq!(reference.option_name(), None);
        assert_eq!(
            reference,
            RepositoryRef::Relation {
                property: "Project".to_string(),
                page_id: "page-1".to_string()
            }
        );
    }

    #[test]
    fn record_id_displays_raw_id() {
        assert_eq!(RecordId::new("abc").to_string(), "abc");
    }
}
