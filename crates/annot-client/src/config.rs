//! Annotation source configuration.
//!
//! Defaults point at the public annotation dictionary on GitHub. Override
//! via environment variables or explicit construction for mirrors and tests.

use url::Url;
use zeroize::Zeroizing;

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Default `owner/name` of the dictionary repository.
pub const DEFAULT_REPOSITORY: &str = "Sage-Bionetworks/synapseAnnotations";
/// Default directory of module documents inside the repository.
pub const DEFAULT_DATA_PATH: &str = "synapseAnnotations/data";

/// Configuration for the GitHub annotation source.
///
/// Custom `Debug` implementation redacts the `token` field.
#[derive(Clone)]
pub struct SourceConfig {
    /// GitHub REST API root.
    pub api_url: Url,
    /// Repository as `owner/name`.
    pub repository: String,
    /// Path of the module directory within the repository.
    pub data_path: String,
    /// Optional token, sent as a bearer token to raise rate limits.
    /// Zeroed on drop.
    pub token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("api_url", &self.api_url)
            .field("repository", &self.repository)
            .field("data_path", &self.data_path)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SourceConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ANNOT_GITHUB_API_URL` (default: `https://api.github.com`)
    /// - `ANNOT_REPOSITORY` (default: `Sage-Bionetworks/synapseAnnotations`)
    /// - `ANNOT_DATA_PATH` (default: `synapseAnnotations/data`)
    /// - `ANNOT_GITHUB_TOKEN` (optional)
    /// - `ANNOT_TIMEOUT_SECS` (default: 30)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparseable URL or a repository not of
    /// the form `owner/name`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env_url("ANNOT_GITHUB_API_URL", DEFAULT_API_URL)?;
        let repository =
            std::env::var("ANNOT_REPOSITORY").unwrap_or_else(|_| DEFAULT_REPOSITORY.to_string());
        validate_repository(&repository)?;

        Ok(Self {
            api_url,
            repository,
            data_path: std::env::var("ANNOT_DATA_PATH")
                .unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string()),
            token: std::env::var("ANNOT_GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            timeout_secs: std::env::var("ANNOT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Configuration pointing at a local mock server, with default repository.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `base_url` cannot be parsed.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: Url::parse(base_url)
                .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?,
            repository: DEFAULT_REPOSITORY.to_string(),
            data_path: DEFAULT_DATA_PATH.to_string(),
            token: None,
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn validate_repository(repository: &str) -> Result<(), ConfigError> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => Ok(()),
        _ => Err(ConfigError::InvalidRepository(repository.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("repository must be of the form owner/name, got '{0}'")]
    InvalidRepository(String),
    #[error("ANNOT_GITHUB_TOKEN contains characters not allowed in an HTTP header")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_base_url_uses_defaults() {
        let cfg = SourceConfig::for_base_url("http://127.0.0.1:9000").unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.repository, DEFAULT_REPOSITORY);
        assert_eq!(cfg.data_path, DEFAULT_DATA_PATH);
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn for_base_url_rejects_garbage() {
        assert!(SourceConfig::for_base_url("not a url").is_err());
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("ANNOT_NONEXISTENT_VAR_12345", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn repository_must_have_owner_and_name() {
        assert!(validate_repository("Sage-Bionetworks/synapseAnnotations").is_ok());
        assert!(validate_repository("synapseAnnotations").is_err());
        assert!(validate_repository("/x").is_err());
        assert!(validate_repository("a/b/c").is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let mut cfg = SourceConfig::for_base_url("http://127.0.0.1:9000").unwrap();
        cfg.token = Some(Zeroizing::new("ghp_secret".to_string()));
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
