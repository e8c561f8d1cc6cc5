//! Upsert outcome types.

use crate::destination::RecordId;
use serde::Serialize;

/// Result of importing one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// A new record was created and every comment replayed.
    Created {
        /// Id of the new record.
        record_id: RecordId,
        /// Number of comments replayed.
        comments: usize,
        /// Assignee logins with no Notion user.
        unresolved_assignees: Vec<String>,
    },

    /// A record with the same link already exists.
    Skipped {
        /// Id of the existing record.
        record_id: RecordId,
        /// Reason for skipping.
        reason: String,
    },

    /// Dry run: the record would have been created.
    WouldCreate {
        /// Number of comments that would be replayed.
        comments: usize,
        /// Assignee logins with no Notion user.
        unresolved_assignees: Vec<String>,
    },
}

impl UpsertOutcome {
    /// Assignee logins that could not be mapped.
    #[must_use]
    pub fn unresolved_assignees(&self) -> &[String] {
        match self {
            Self::Created {
                unresolved_assignees,
                ..
            }
            | Self::WouldCreate {
                unresolved_assignees,
                ..
            } => unresolved_assignees,
            Self::Skipped { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_status_tag() {
        let outcome = UpsertOutcome::Skipped {
            record_id: RecordId::new("page-1"),
            reason: "already imported".to_string(),
        };
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            json!({ "status": "skipped", "record_id": "page-1", "reason": "already imported" })
        );
    }
}
