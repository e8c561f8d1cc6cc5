//! Record upsert error types.

use crate::destination::{DestinationError, RecordId};
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while importing one issue.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// Lookup or creation failed; nothing was written.
    #[error(transparent)]
    Destination(#[from] DestinationError),

    /// A comment header failed to render; nothing was written.
    #[error("Comment header rendering failed: {0}")]
    Template(#[from] TemplateError),

    /// The record exists but part of its content is missing.
    #[error("Record {record_id} created but appending its content failed: {source}")]
    PartialBody {
        record_id: RecordId,
        #[source]
        source: DestinationError,
    },

    /// The record exists but not every comment was replayed.
    #[error("Record {record_id} created but only {replayed} of {total} comments were replayed: {source}")]
    PartialReplay {
        record_id: RecordId,
        replayed: usize,
        total: usize,
        #[source]
        source: DestinationError,
    },
}

impl UpsertError {
    /// Returns the id of the record left behind, if one was created.
    #[must_use]
    pub fn partial_record(&self) -> Option<&RecordId> {
        match self {
            Self::PartialBody { record_id, .. } | Self::PartialReplay { record_id, .. } => {
                Some(record_id)
            }
            Self::Destination(_) | Self::Template(_) => None,
        }
    }
}
