//! Template renderer.

use crate::source::Comment;
use handlebars::{no_escape, Handlebars};
use serde_json::json;

const COMMENT_HEADER: &str = "comment_header";

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs
}

/// Renders the header placed in front of each replayed comment.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Compiles the comment header template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not parse.
    pub fn new(comment_header: &str) -> Result<Self, super::TemplateError> {
        let mut handlebars = create_handlebars_registry();
        handlebars.register_template_string(COMMENT_HEADER, comment_header)?;
        Ok(Self { handlebars })
    }

    /// Renders the header for a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the template references an unknown variable.
    pub fn render_comment_header(&self, comment: &Comment) -> Result<String, super::TemplateError> {
        let data = json!({
            "login": comment.author.login,
            "profile_url": comment.author.url,
            "url": comment.url,
        });
        Ok(self.handlebars.render(COMMENT_HEADER, &data)?)
    }

    /// Renders the full markdown of a replayed comment: header followed by body.
    ///
    /// # Errors
    ///
    /// Returns an error if the header fails to render.
    pub fn render_comment(&self, comment: &Comment) -> Result<String, super::TemplateError> {
        let mut text = self.render_comment_header(comment)?;
        text.push_str(&comment.body);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::User;
    use crate::templates::{TemplateError, DEFAULT_COMMENT_HEADER};

    fn sample_comment() -> Comment {
        Comment {
            author: User {
                login: "bob".to_string(),
                url: "https://github.com/bob".to_string(),
            },
            body: "repro steps".to_string(),
            url: "https://github.com/acme/widgets/issues/1#issuecomment-1".to_string(),
        }
    }

    #[test]
    fn renders_default_header() {
        let renderer = TemplateRenderer::new(DEFAULT_COMMENT_HEADER).unwrap();
        let header = renderer.render_comment_header(&sample_comment()).unwrap();

        assert_eq!(
            header,
            "[@bob](https://github.com/bob) [commented](https://github.com/acme/widgets/issues/1#issuecomment-1)\n\n"
        );
    }

    #[test]
    fn comment_text_starts_with_header() {
        let renderer = TemplateRenderer::new(DEFAULT_COMMENT_HEADER).unwrap();
        let text = renderer.render_comment(&sample_comment()).unwrap();

        assert!(text.starts_with("[@bob]"));
        assert!(text.ends_with("\n\nrepro steps"));
    }

    #[test]
    fn custom_header_template() {
        let renderer = TemplateRenderer::new("**{{login}}** wrote:\n").unwrap();
        let text = renderer.render_comment(&sample_comment()).unwrap();

        assert_eq!(text, "**bob** wrote:\nrepro steps");
    }

    #[test]
    fn no_html_escaping() {
        let renderer = TemplateRenderer::new("{{login}}").unwrap();
        let mut comment = sample_comment();
        comment.author.login = "<b>bob</b>".to_string();

        assert_eq!(
            renderer.render_comment_header(&comment).unwrap(),
            "<b>bob</b>"
        );
    }

    #[test]
    fn strict_mode_rejects_unknown_variables() {
        let renderer = TemplateRenderer::new("{{author_name}}").unwrap();
        let error = renderer.render_comment_header(&sample_comment()).unwrap_err();
        assert!(matches!(error, TemplateError::RenderError(_)));
    }

    #[test]
    fn rejects_unparsable_template() {
        let error = TemplateRenderer::new("{{#if login}}").err().unwrap();
        assert!(matches!(error, TemplateError::RegistrationError(_)));
    }
}
