//! Configuration loaded from `channel.toml`.
//!
//! ```toml
//! [channel]
//! title = "Posts"
//! description = "Notes and essays"
//! base_path = "/posts"
//! index_title = "Recent Posts"
//! posts_dir = "posts"
//! templates_dir = "themes/default/templates"
//!
//! [server]
//! port = 8080
//! static_dir = "themes/default/static"
//! ```
//!
//! Every key is optional. `PORT` in the environment overrides `server.port`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub channel: ChannelConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    pub title: String,
    pub description: String,
    pub base_path: String,
    /// Title of the listing page, distinct from the channel title.
    pub index_title: String,
    pub posts_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: "Posts".to_string(),
            description: String::new(),
            base_path: "/posts".to_string(),
            index_title: "Recent Posts".to_string(),
            posts_dir: "posts".into(),
            templates_dir: "themes/default/templates".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            static_dir: None,
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };
        config.channel.base_path = normalize_base_path(&config.channel.base_path)?;
        Ok(config)
    }

    pub fn apply_env(&mut self, port: Option<String>) {
        if let Some(port) = port.and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }
}

/// Gives the base path a leading slash and no trailing slash. The site root
/// becomes the empty string.
pub fn normalize_base_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.contains(['{', '}', '*']) {
        return Err(ConfigError::Validation(format!(
            "base_path {raw:?} may not contain route wildcards"
        )));
    }
    if trimmed.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("channel.toml")).unwrap();
        assert_eq!(config.channel.title, "Posts");
        assert_eq!(config.channel.base_path, "/posts");
        assert_eq!(config.channel.index_title, "Recent Posts");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.static_dir.is_none());
    }

    #[test]
    fn reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channel.toml");
        fs::write(
            &path,
            "[channel]\ntitle = \"Notes\"\nbase_path = \"blog/\"\n\n[server]\nport = 3000\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.channel.title, "Notes");
        assert_eq!(config.channel.base_path, "/blog");
        assert_eq!(config.channel.posts_dir, PathBuf::from("posts"));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channel.toml");
        fs::write(&path, "[channel]\ntitel = \"typo\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn normalizes_base_paths() {
        assert_eq!(normalize_base_path("/posts").unwrap(), "/posts");
        assert_eq!(normalize_base_path("posts/").unwrap(), "/posts");
        assert_eq!(normalize_base_path("/a/b/").unwrap(), "/a/b");
        assert_eq!(normalize_base_path("/").unwrap(), "");
        assert_eq!(normalize_base_path("").unwrap(), "");
        assert!(normalize_base_path("/{slug}").is_err());
    }

    #[test]
    fn port_from_environment() {
        let mut config = Config::default();
        config.apply_env(Some("9000".to_string()));
        assert_eq!(config.server.port, 9000);
        config.apply_env(Some("not-a-port".to_string()));
        assert_eq!(config.server.port, 9000);
        config.apply_env(None);
        assert_eq!(config.server.port, 9000);
    }
}
