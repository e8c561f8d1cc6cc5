//! Notion database property names.

/// Names of the Notion properties written for every imported issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    /// Multi-select holding GitHub labels.
    pub label: String,
    /// URL property holding the issue link; used to detect existing records.
    pub link: String,
    /// People property holding resolved assignees.
    pub assignee: String,
    /// Status property (board column).
    pub status: String,
    /// Status for open issues.
    pub status_default: String,
    /// Status for closed issues.
    pub status_done: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            label: "Github Labels".to_string(),
            link: "Github Link".to_string(),
            assignee: "Assignees".to_string(),
            status: "Status".to_string(),
            status_default: "Backlog".to_string(),
            status_done: "Done".to_string(),
        }
    }
}

/// How the source repository is recorded on each Notion page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryMode {
    /// Repository name stored as a select option; the option set is
    /// reconciled alongside the labels.
    Select {
        /// Select property name.
        property: String,
    },

    /// Repository stored as a relation to an existing page.
    Relation {
        /// Relation property name.
        property: String,
        /// Id of the page representing the repository.
        page_id: String,
    },
}

impl Default for RepositoryMode {
    fn default() -> Self {
        Self::Select {
            property: "Repository".to_string(),
        }
    }
}

impl RepositoryMode {
    /// Returns the property the repository is written to.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::Select { property } | Self::Relation { property, .. } => property,
        }
    }
}
