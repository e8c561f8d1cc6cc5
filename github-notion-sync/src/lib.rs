#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod content;
pub mod destination;
pub mod rate_limit;
pub mod records;
pub mod runner;
pub mod source;
pub mod summary;
pub mod taxonomy;
pub mod templates;

pub use config::{ConfigError, FetchLimits, PropertyNames, RepositoryMode, SyncConfig, UserMap};
pub use content::{markdown_to_blocks, markdown_to_rich_text, Block, RichText};
pub use destination::{
    Destination, DestinationError, NewRecord, NotionClient, RecordId, RepositoryRef, Taxonomy,
};
pub use records::{RecordUpserter, UpsertError, UpsertOutcome};
pub use runner::{Runner, RunnerError, SyncDriver};
pub use source::{
    issue_pages, Comment, GitHubIssueSource, Issue, IssuePage, IssueSource, SourceError, User,
};
pub use summary::RunSummary;
pub use taxonomy::{reconcile, Reconciliation, TaxonomyReconciler};
pub use templates::{create_handlebars_registry, TemplateError, TemplateRenderer};
