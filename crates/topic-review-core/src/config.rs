use std::path::Path;

use serde::Deserialize;

use crate::error::TopicReviewError;

/// Default SSH port of a Gerrit server.
pub const DEFAULT_PORT: u16 = 29418;

/// Top-level configuration loaded from `.topic-review.toml`.
///
/// Supports layered resolution: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use topic_review_core::TopicReviewConfig;
///
/// let config = TopicReviewConfig::default();
/// assert_eq!(config.gerrit.port, 29418);
/// assert_eq!(config.gerrit.remote, "gerrit");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicReviewConfig {
    /// Gerrit connection settings.
    #[serde(default)]
    pub gerrit: GerritConfig,
    /// Default review label, score, and message.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl TopicReviewConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TopicReviewError::FileNotFound`] if `path` does not exist,
    /// [`TopicReviewError::Io`] if it cannot be read, or
    /// [`TopicReviewError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, TopicReviewError> {
        if !path.exists() {
            return Err(TopicReviewError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`TopicReviewError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use topic_review_core::TopicReviewConfig;
    ///
    /// let toml = r#"
    /// [gerrit]
    /// server = "review.example.com"
    /// "#;
    /// let config = TopicReviewConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.gerrit.server.as_deref(), Some("review.example.com"));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, TopicReviewError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// How to reach the Gerrit server.
#[derive(Debug, Clone, Deserialize)]
pub struct GerritConfig {
    /// SSH host (optionally `user@host`).
    pub server: Option<String>,
    /// SSH port (default: 29418).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Remote command name used for queries (default: `"gerrit"`).
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Local ssh client binary (default: `"ssh"`).
    #[serde(default = "default_ssh_program")]
    pub ssh_program: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_remote() -> String {
    "gerrit".into()
}

fn default_ssh_program() -> String {
    "ssh".into()
}

impl Default for GerritConfig {
    fn default() -> Self {
        Self {
            server: None,
            port: default_port(),
            remote: default_remote(),
            ssh_program: default_ssh_program(),
        }
    }
}

/// Review defaults, overridden by `--label`, `--score`, and `--message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConfig {
    /// Label name, e.g. `Code-Review` or `Verified`.
    pub label: Option<String>,
    /// Score for the label, e.g. `+1` or `-2`.
    pub score: Option<String>,
    /// Review comment text.
    pub message: Option<String>,
}
