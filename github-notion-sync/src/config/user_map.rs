//! GitHub login to Notion user id mapping.

use crate::config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Static table resolving GitHub logins to Notion user ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserMap {
    users: HashMap<String, String>,
}

/// Layout of a TOML user map file:
///
/// ```toml
/// [users]
/// octocat = "30486824-964a-49ae-a41b-a4640bcf8721"
/// ```
#[derive(Debug, Deserialize)]
struct UserMapFile {
    #[serde(default)]
    users: HashMap<String, String>,
}

impl UserMap {
    /// Parses a JSON object of `login -> user id`. Blank input yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UserMapJson`] if the input is not a JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let users = serde_json::from_str::<HashMap<String, String>>(json)
            .map_err(|source| ConfigError::UserMapJson { source })?;
        Ok(Self { users })
    }

    /// Loads a TOML file with a `[users]` table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_toml(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading user map");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        let parsed: UserMapFile =
            toml::from_str(&contents).map_err(|source| ConfigError::TomlError {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self {
            users: parsed.users,
        })
    }

    /// Adds every entry of `other`, overriding existing logins.
    pub fn extend(&mut self, other: UserMap) {
        self.users.extend(other.users);
    }

    /// Resolves a GitHub login to a Notion user id.
    #[must_use]
    pub fn resolve(&self, login: &str) -> Option<&str> {
        self.users.get(login).map(String::as_str)
    }

    /// Number of mapped logins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if no logins are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UserMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            users: iter
                .into_iter()
                .map(|(login, id)| (login.into(), id.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_json_object() {
        let map = UserMap::from_json(r#"{"octocat": "user-1", "hubot": "user-2"}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve("octocat"), Some("user-1"));
        assert_eq!(map.resolve("nobody"), None);
    }

    #[test]
    fn blank_json_is_empty() {
        assert!(UserMap::from_json("  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_string_values() {
        let error = UserMap::from_json(r#"{"octocat": 3}"#).unwrap_err();
        assert!(matches!(error, ConfigError::UserMapJson { .. }));
    }

    #[test]
    fn loads_toml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("users.toml");
        fs::write(
            &path,
            r#"
[users]
octocat = "user-1"
"#,
        )
        .unwrap();

        let map = UserMap::load_toml(&path).unwrap();
        assert_eq!(map.resolve("octocat"), Some("user-1"));
    }

    #[test]
    fn load_toml_reports_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("users.toml");
        fs::write(&path, "users = [").unwrap();

        let error = UserMap::load_toml(&path).unwrap_err();
        assert!(matches!(error, ConfigError::TomlError { .. }));
    }

    #[test]
    fn extend_overrides_existing_logins() {
        let mut map: UserMap = [("octocat", "old"), ("hubot", "kept")].into_iter().collect();
        map.extend([("octocat", "new")].into_iter().collect());

        assert_eq!(map.resolve("octocat"), Some("new"));
        assert_eq!(map.resolve("hubot"), Some("kept"));
    }
}
