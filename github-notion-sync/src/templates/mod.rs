//! Comment header rendering using Handlebars.
//!
//! Every replayed comment is prefixed with a short header naming its author
//! and linking back to the original comment on GitHub.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};

/// Default header prepended to replayed comments.
///
/// Available variables: `login`, `profile_url`, `url`.
pub const DEFAULT_COMMENT_HEADER: &str =
    "[@{{login}}]({{profile_url}}) [commented]({{url}})\n\n";
