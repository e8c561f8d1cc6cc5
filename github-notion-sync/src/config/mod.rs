//! Run configuration.
//!
//! Every setting is read once at startup into a [`SyncConfig`], which is then
//! passed by reference to the components that need it. Settings come from
//! environment variables; the CLI loads a `.env` file first when one exists.
//!
//! | Variable | Default |
//! |---|---|
//! | `GITHUB_API_TOKEN` | required |
//! | `NOTION_API_KEY` | required |
//! | `NOTION_PAGE_ID` | required (database id) |
//! | `GH_LABEL_PROP_NAME` | `Github Labels` |
//! | `GH_LINK_PROP_NAME` | `Github Link` |
//! | `ASSIGNEE_PROP_NAME` | `Assignees` |
//! | `BOARD_COLUMN_PROP_NAME` | `Status` |
//! | `BOARD_COLUMN_DEFAULT_VAL` | `Backlog` |
//! | `BOARD_COLUMN_DONE_VAL` | `Done` |
//! | `REPOSITORY_PROP_NAME` | `Repository` |
//! | `RELATION_PROP_NAME` | unset (select mode) |
//! | `RELATION_PAGE_ID` | required with `RELATION_PROP_NAME` |
//! | `NOTION_ISSUE_ICON` | GitHub icon hosted by Notion |
//! | `GITHUB_NOTION_USER_MAP` | `{}` |
//! | `GITHUB_NOTION_USER_MAP_FILE` | unset |
//! | `COMMENT_HEADER_TEMPLATE` | [`DEFAULT_COMMENT_HEADER`] |
//! | `GH_ISSUE_PAGE_SIZE` | `50` |
//! | `GH_ASSIGNEE_CUTOFF` | `50` |
//! | `GH_LABEL_CUTOFF` | `50` |
//! | `GH_COMMENT_CUTOFF` | `100` |
//! | `NOTION_TIMEOUT_SECS` | `60` |

mod error;
mod limits;
mod properties;
mod user_map;

pub use error::ConfigError;
pub use limits::{FetchLimits, MAX_CONNECTION_SIZE};
pub use properties::{PropertyNames, RepositoryMode};
pub use user_map::UserMap;

use crate::templates::DEFAULT_COMMENT_HEADER;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Icon attached to every created page unless overridden.
pub const DEFAULT_ISSUE_ICON: &str =
    "https://www.notion.so/images/external_integrations/github-icon.png";

/// Default timeout for a single Notion request.
pub const DEFAULT_NOTION_TIMEOUT_SECS: u64 = 60;

/// Everything a sync run needs to know, assembled once at startup.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// GitHub token used for GraphQL calls.
    github_token: String,
    /// Notion integration secret.
    notion_api_key: String,
    /// Target Notion database id.
    database_id: String,
    /// Notion property names.
    properties: PropertyNames,
    /// How the repository is recorded on each page.
    repository_mode: RepositoryMode,
    /// Icon URL attached to created pages.
    icon_url: String,
    /// GitHub login to Notion user id mapping.
    user_map: UserMap,
    /// GraphQL page size and truncation limits.
    limits: FetchLimits,
    /// Handlebars template for the comment header.
    comment_header_template: String,
    /// Per-request timeout for Notion calls.
    notion_timeout: Duration,
}

impl SyncConfig {
    /// Creates a configuration with default settings for everything but credentials.
    pub fn new(github_token: String, notion_api_key: String, database_id: String) -> Self {
        Self {
            github_token,
            notion_api_key,
            database_id,
            properties: PropertyNames::default(),
            repository_mode: RepositoryMode::default(),
            icon_url: DEFAULT_ISSUE_ICON.to_string(),
            user_map: UserMap::default(),
            limits: FetchLimits::default(),
            comment_header_template: DEFAULT_COMMENT_HEADER.to_string(),
            notion_timeout: Duration::from_secs(DEFAULT_NOTION_TIMEOUT_SECS),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required setting is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required setting is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let github_token = env.required(
            "GITHUB_API_TOKEN",
            "add a GitHub access token to your environment or .env file",
        )?;
        let notion_api_key = env.required(
            "NOTION_API_KEY",
            "add a Notion integration secret to your environment or .env file",
        )?;
        let database_id = env.required(
            "NOTION_PAGE_ID",
            "add the id of the target Notion database to your environment or .env file",
        )?;

        let defaults = PropertyNames::default();
        let properties = PropertyNames {
            label: env.or("GH_LABEL_PROP_NAME", defaults.label),
            link: env.or("GH_LINK_PROP_NAME", defaults.link),
            assignee: env.or("ASSIGNEE_PROP_NAME", defaults.assignee),
            status: env.or("BOARD_COLUMN_PROP_NAME", defaults.status),
            status_default: env.or("BOARD_COLUMN_DEFAULT_VAL", defaults.status_default),
            status_done: env.or("BOARD_COLUMN_DONE_VAL", defaults.status_done),
        };

        let repository_mode = match env.get("RELATION_PROP_NAME") {
            Some(property) => RepositoryMode::Relation {
                property,
                page_id: env.required(
                    "RELATION_PAGE_ID",
                    "relation mode needs the id of the page the issues relate to",
                )?,
            },
            None => RepositoryMode::Select {
                property: env.or(
                    "REPOSITORY_PROP_NAME",
                    RepositoryMode::default().property().to_string(),
                ),
            },
        };

        let icon_url = env.or("NOTION_ISSUE_ICON", DEFAULT_ISSUE_ICON.to_string());
        url::Url::parse(&icon_url).map_err(|e| ConfigError::InvalidValue {
            name: "NOTION_ISSUE_ICON",
            message: e.to_string(),
        })?;

        let mut user_map = match env.get("GITHUB_NOTION_USER_MAP_FILE") {
            Some(path) => UserMap::load_toml(Path::new(&path))?,
            None => UserMap::default(),
        };
        if let Some(json) = env.get("GITHUB_NOTION_USER_MAP") {
            user_map.extend(UserMap::from_json(&json)?);
        }

        let default_limits = FetchLimits::default();
        let limits = FetchLimits {
            page_size: env.limit("GH_ISSUE_PAGE_SIZE", default_limits.page_size)?,
            assignees: env.limit("GH_ASSIGNEE_CUTOFF", default_limits.assignees)?,
            labels: env.limit("GH_LABEL_CUTOFF", default_limits.labels)?,
            comments: env.limit("GH_COMMENT_CUTOFF", default_limits.comments)?,
        };

        // Untrimmed: the template's trailing newlines separate header and body.
        let comment_header_template = env
            .raw("COMMENT_HEADER_TEMPLATE")
            .unwrap_or_else(|| DEFAULT_COMMENT_HEADER.to_string());

        let notion_timeout = match env.get("NOTION_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "NOTION_TIMEOUT_SECS",
                        message: format!("expected a positive number of seconds, got '{value}'"),
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_NOTION_TIMEOUT_SECS),
        };

        debug!(
            database_id = %database_id,
            mapped_users = user_map.len(),
            ?repository_mode,
            ?limits,
            "Loaded configuration"
        );

        Ok(Self {
            github_token,
            notion_api_key,
            database_id,
            properties,
            repository_mode,
            icon_url,
            user_map,
            limits,
            comment_header_template,
            notion_timeout,
        })
    }

    /// Sets how the repository is recorded.
    pub fn with_repository_mode(mut self, repository_mode: RepositoryMode) -> Self {
        self.repository_mode = repository_mode;
        self
    }

    /// Sets the user map.
    pub fn with_user_map(mut self, user_map: UserMap) -> Self {
        self.user_map = user_map;
        self
    }

    /// Sets the comment header template.
    pub fn with_comment_header_template(mut self, template: String) -> Self {
        self.comment_header_template = template;
        self
    }

    /// Returns the GitHub token.
    pub fn github_token(&self) -> &str {
        &self.github_token
    }

    /// Returns the Notion integration secret.
    pub fn notion_api_key(&self) -> &str {
        &self.notion_api_key
    }

    /// Returns the Notion database id.
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// Returns the property names.
    pub fn properties(&self) -> &PropertyNames {
        &self.properties
    }

    /// Returns how the repository is recorded.
    pub fn repository_mode(&self) -> &RepositoryMode {
        &self.repository_mode
    }

    /// Returns the page icon URL.
    pub fn icon_url(&self) -> &str {
        &self.icon_url
    }

    /// Returns the user map.
    pub fn user_map(&self) -> &UserMap {
        &self.user_map
    }

    /// Returns the fetch limits.
    pub fn limits(&self) -> FetchLimits {
        self.limits
    }

    /// Returns the comment header template.
    pub fn comment_header_template(&self) -> &str {
        &self.comment_header_template
    }

    /// Returns the Notion request timeout.
    pub fn notion_timeout(&self) -> Duration {
        self.notion_timeout
    }
}

/// Variable lookup with blank values treated as unset.
struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn raw(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn or(&self, name: &str, default: String) -> String {
        self.get(name).unwrap_or(default)
    }

    fn required(&self, name: &'static str, hint: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::MissingVar { name, hint })
    }

    fn limit(&self, name: &'static str, default: u32) -> Result<u32, ConfigError> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        match value.parse::<u32>() {
            Ok(limit) if (1..=MAX_CONNECTION_SIZE).contains(&limit) => Ok(limit),
            _ => Err(ConfigError::InvalidValue {
                name,
                message: format!(
                    "expected a number between 1 and {MAX_CONNECTION_SIZE}, got '{value}'"
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn load(vars: &[(&str, &str)]) -> Result<SyncConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SyncConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("GITHUB_API_TOKEN", "gh-token"),
        ("NOTION_API_KEY", "secret"),
        ("NOTION_PAGE_ID", "db-id"),
    ];

    #[test]
    fn applies_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.github_token(), "gh-token");
        assert_eq!(config.notion_api_key(), "secret");
        assert_eq!(config.database_id(), "db-id");
        assert_eq!(config.properties(), &PropertyNames::default());
        assert_eq!(config.repository_mode(), &RepositoryMode::default());
        assert_eq!(config.icon_url(), DEFAULT_ISSUE_ICON);
        assert!(config.user_map().is_empty());
        assert_eq!(config.limits(), FetchLimits::default());
        assert_eq!(config.comment_header_template(), DEFAULT_COMMENT_HEADER);
        assert_eq!(config.notion_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn reports_each_missing_credential() {
        for missing in ["GITHUB_API_TOKEN", "NOTION_API_KEY", "NOTION_PAGE_ID"] {
            let vars: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            match load(&vars) {
                Err(ConfigError::MissingVar { name, .. }) => assert_eq!(name, missing),
                other => panic!("expected missing {missing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let mut vars = REQUIRED.to_vec();
        vars[0] = ("GITHUB_API_TOKEN", "   ");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::MissingVar {
                name: "GITHUB_API_TOKEN",
                ..
            })
        ));
    }

    #[test]
    fn reads_property_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("GH_LABEL_PROP_NAME", "Labels"),
            ("GH_LINK_PROP_NAME", "Link"),
            ("ASSIGNEE_PROP_NAME", "Owners"),
            ("BOARD_COLUMN_PROP_NAME", "Tags"),
            ("BOARD_COLUMN_DEFAULT_VAL", "Todo"),
            ("BOARD_COLUMN_DONE_VAL", "Shipped"),
            ("REPOSITORY_PROP_NAME", "Repo"),
        ]);
        let config = load(&vars).unwrap();

        let properties = config.properties();
        assert_eq!(properties.label, "Labels");
        assert_eq!(properties.link, "Link");
        assert_eq!(properties.assignee, "Owners");
        assert_eq!(properties.status, "Tags");
        assert_eq!(properties.status_default, "Todo");
        assert_eq!(properties.status_done, "Shipped");
        assert_eq!(
            config.repository_mode(),
            &RepositoryMode::Select {
                property: "Repo".to_string()
            }
        );
    }

    #[test]
    fn relation_mode_requires_page_id() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("RELATION_PROP_NAME", "Project"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::MissingVar {
                name: "RELATION_PAGE_ID",
                ..
            })
        ));

        vars.push(("RELATION_PAGE_ID", "page-1"));
        let config = load(&vars).unwrap();
        assert_eq!(
            config.repository_mode(),
            &RepositoryMode::Relation {
                property: "Project".to_string(),
                page_id: "page-1".to_string()
            }
        );
    }

    #[test]
    fn rejects_out_of_range_limits() {
        for value in ["0", "101", "many"] {
            let mut vars = REQUIRED.to_vec();
            vars.push(("GH_COMMENT_CUTOFF", value));
            assert!(matches!(
                load(&vars),
                Err(ConfigError::InvalidValue {
                    name: "GH_COMMENT_CUTOFF",
                    ..
                })
            ));
        }
    }

    #[test]
    fn reads_limits() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("GH_ISSUE_PAGE_SIZE", "10"),
            ("GH_ASSIGNEE_CUTOFF", "5"),
            ("GH_LABEL_CUTOFF", "20"),
            ("GH_COMMENT_CUTOFF", "100"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(
            config.limits(),
            FetchLimits {
                page_size: 10,
                assignees: 5,
                labels: 20,
                comments: 100
            }
        );
    }

    #[test]
    fn rejects_invalid_icon_url() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("NOTION_ISSUE_ICON", "not a url"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidValue {
                name: "NOTION_ISSUE_ICON",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("NOTION_TIMEOUT_SECS", "0"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidValue {
                name: "NOTION_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn comment_header_keeps_trailing_newlines() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("COMMENT_HEADER_TEMPLATE", "**{{login}}** wrote:\n\n"));
        let config = load(&vars).unwrap();
        assert_eq!(config.comment_header_template(), "**{{login}}** wrote:\n\n");
    }

    #[test]
    fn json_user_map_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("users.toml");
        fs::write(
            &path,
            r#"
[users]
alice = "from-file"
bob = "bob-id"
"#,
        )
        .unwrap();
        let path = path.display().to_string();

        let mut vars = REQUIRED.to_vec();
        vars.push(("GITHUB_NOTION_USER_MAP_FILE", path.as_str()));
        vars.push(("GITHUB_NOTION_USER_MAP", r#"{"alice": "from-json"}"#));
        let config = load(&vars).unwrap();

        assert_eq!(config.user_map().resolve("alice"), Some("from-json"));
        assert_eq!(config.user_map().resolve("bob"), Some("bob-id"));
    }

    #[test]
    fn from_env_reads_process_environment() {
        temp_env::with_vars(
            [
                ("GITHUB_API_TOKEN", Some("env-token")),
                ("NOTION_API_KEY", Some("env-secret")),
                ("NOTION_PAGE_ID", Some("env-db")),
                ("BOARD_COLUMN_DONE_VAL", Some("Closed")),
                ("RELATION_PROP_NAME", None),
                ("GITHUB_NOTION_USER_MAP", None),
                ("GITHUB_NOTION_USER_MAP_FILE", None),
            ],
            || {
                let config = SyncConfig::from_env().unwrap();
                assert_eq!(config.github_token(), "env-token");
                assert_eq!(config.database_id(), "env-db");
                assert_eq!(config.properties().status_done, "Closed");
            },
        );
    }

    #[test]
    fn from_env_fails_without_token() {
        temp_env::with_var_unset("GITHUB_API_TOKEN", || {
            assert!(matches!(
                SyncConfig::from_env(),
                Err(ConfigError::MissingVar {
                    name: "GITHUB_API_TOKEN",
                    ..
                })
            ));
        });
    }
}
