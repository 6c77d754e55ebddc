// src/config.rs
// =============================================================================
// Application configuration.
//
// Everything has a default, so the tool works without a config file. A TOML
// file passed with --config overrides any subset of the keys:
//
//   snapshot_path = "bookmarks.json"
//   bind_addr = "127.0.0.1:5000"
//
//   [probe]
//   timeout_secs = 5
//   concurrency = 10
//   follow_redirects = true
//
//   [summarizer]
//   model = "gpt-4o-mini"
//   timeout_secs = 60
// =============================================================================

use crate::checker::DEFAULT_CONCURRENCY;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the ingest endpoint writes the received bookmarks
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Address the ingest endpoint listens on (the extension posts here)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory holding manifest.json and background.js; the bundled copies
    /// are used when unset
    #[serde(default)]
    pub extension_dir: Option<PathBuf>,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// When false, a 3xx answer is reported as-is (and classified Inactive)
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Upper bound on one chat request, answer included
    #[serde(default = "default_summarizer_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            bind_addr: default_bind_addr(),
            extension_dir: None,
            probe: ProbeConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_summarizer_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Loads the config from `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.probe.timeout_secs == 0 {
            return Err(Error::Config("probe.timeout_secs must be greater than 0".to_string()));
        }

        if self.summarizer.timeout_secs == 0 {
            return Err(Error::Config(
                "summarizer.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Url::parse(&self.summarizer.base_url).map_err(|e| {
            Error::Config(format!(
                "summarizer.base_url '{}' is not a valid URL: {}",
                self.summarizer.base_url, e
            ))
        })?;

        Ok(())
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SummarizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("bookmarks.json")
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("bookmark-analyzer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_summarizer_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("bookmarks.json"));
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.probe.timeout(), Duration::from_secs(5));
        assert_eq!(config.probe.concurrency, 10);
        assert!(config.probe.follow_redirects);
        assert!(config.extension_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            snapshot_path = "/tmp/marks.json"

            [probe]
            concurrency = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/marks.json"));
        assert_eq!(config.probe.concurrency, 3);
        assert_eq!(config.probe.timeout_secs, 5);
        assert_eq!(config.summarizer.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.summarizer.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[summarizer]\nmodel = \"local-model\"").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.summarizer.model, "local-model");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = AppConfig::from_toml("[probe]\ntimeout_secs = 0").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_summarizer_timeout_rejected() {
        let config = AppConfig::from_toml("[summarizer]\ntimeout_secs = 0").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let config = AppConfig::from_toml("[summarizer]\nbase_url = \"not a url\"").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
