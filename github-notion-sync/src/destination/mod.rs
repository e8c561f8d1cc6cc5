//! Destination database access.
//!
//! [`Destination`] is the seam between the sync engine and Notion. The engine
//! only ever talks to the trait; [`NotionClient`] implements it over the
//! Notion REST API.

mod error;
mod notion;
mod payload;
mod record;

pub use error::DestinationError;
pub use notion::{NotionClient, NOTION_API_URL, NOTION_VERSION};
pub use record::{NewRecord, RecordId, RepositoryRef, Taxonomy};

use crate::content::{Block, RichText};
use async_trait::async_trait;

/// Most blocks Notion accepts in one create or append request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;

/// A database that issues are imported into.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Reads the label and repository option sets.
    async fn read_taxonomy(&self) -> Result<Taxonomy, DestinationError>;

    /// Writes the option sets and creates the link and assignee properties
    /// if the database lacks them.
    async fn ensure_schema(&self, taxonomy: &Taxonomy) -> Result<(), DestinationError>;

    /// Writes the option sets.
    async fn write_taxonomy(&self, taxonomy: &Taxonomy) -> Result<(), DestinationError>;

    /// Finds the record whose link property equals `link`.
    async fn find_record(&self, link: &str) -> Result<Option<RecordId>, DestinationError>;

    /// Creates a record with its properties and initial content.
    async fn create_record(&self, record: &NewRecord) -> Result<RecordId, DestinationError>;

    /// Appends blocks to the end of a record's content.
    async fn append_blocks(&self, record: &RecordId, blocks: &[Block])
        -> Result<(), DestinationError>;

    /// Adds a comment to a record.
    async fn append_comment(
        &self,
        record: &RecordId,
        rich_text: &[RichText],
    ) -> Result<(), DestinationError>;
}
