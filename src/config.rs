//! Configuration loader and validator for the timeline archiver.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::IngestRequest;

/// Hard ceiling the remote API places on one timeline download.
pub const MAX_TIMELINE_COUNT: u32 = 3200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub api: Api,
    pub ingest: Ingest,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Remote timeline API settings. Credentials live here, never in source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub base_url: String,
    pub bearer_token: String,
}

/// Ingestion limits and quota policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingest {
    /// Per-run request ceiling; must not exceed [`MAX_TIMELINE_COUNT`].
    pub max_count: u32,
    /// How many times a session may sleep until quota reset and resume.
    /// Zero means quota exhaustion ends the session.
    pub quota_retries: u32,
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }

    /// Validate one pipeline invocation against the configured limits.
    /// Rejection happens here, before any network or store activity.
    pub fn ingest_request(&self, username: &str, count: u32) -> Result<IngestRequest, ConfigError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ConfigError::Invalid("username must be non-empty"));
        }
        if count == 0 {
            return Err(ConfigError::Invalid("count must be > 0"));
        }
        if count > self.ingest.max_count {
            return Err(ConfigError::Invalid("count exceeds ingest.max_count"));
        }
        Ok(IngestRequest {
            username: username.to_string(),
            count,
        })
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }

    if cfg.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.base_url must be non-empty"));
    }
    if !cfg.api.base_url.starts_with("http://") && !cfg.api.base_url.starts_with("https://") {
        return Err(ConfigError::Invalid(
            "api.base_url must start with http:// or https://",
        ));
    }
    if cfg.api.bearer_token.trim().is_empty() {
        return Err(ConfigError::Invalid("api.bearer_token must be non-empty"));
    }

    if cfg.ingest.max_count == 0 {
        return Err(ConfigError::Invalid("ingest.max_count must be > 0"));
    }
    if cfg.ingest.max_count > MAX_TIMELINE_COUNT {
        return Err(ConfigError::Invalid(
            "ingest.max_count exceeds the remote API ceiling of 3200",
        ));
    }

    Ok(())
}

/// Canonical example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

api:
  base_url: "https://api.twitter.com/1.1/"
  bearer_token: "YOUR_API_BEARER_TOKEN"

ingest:
  max_count: 3200
  quota_retries: 0
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
    }

    #[test]
    fn invalid_bearer_token() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.api.bearer_token = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("api.bearer_token")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_base_url() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.api.base_url = "ftp://example.com".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("api.base_url")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn max_count_bounded_by_api_ceiling() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.ingest.max_count = MAX_TIMELINE_COUNT + 1;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        cfg.ingest.max_count = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn ingest_request_rejects_bad_inputs() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();

        assert!(matches!(
            cfg.ingest_request("", 10),
            Err(ConfigError::Invalid(msg)) if msg.contains("username")
        ));
        assert!(matches!(
            cfg.ingest_request("   ", 10),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            cfg.ingest_request("alice", 0),
            Err(ConfigError::Invalid(msg)) if msg.contains("count")
        ));
        assert!(matches!(
            cfg.ingest_request("alice", 3201),
            Err(ConfigError::Invalid(msg)) if msg.contains("max_count")
        ));
    }

    #[test]
    fn ingest_request_trims_username() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        let request = cfg.ingest_request("  alice ", 10).unwrap();
        assert_eq!(request.username, "alice");
        assert_eq!(request.count, 10);
    }

    #[test]
    fn ensure_dirs_creates_data_dir() {
        let td = tempdir().unwrap();
        let data_path = td.path().join("data");
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.data_dir = data_path.to_string_lossy().to_string();
        cfg.ensure_dirs().unwrap();
        assert!(data_path.exists());
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(example().as_bytes()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.ingest.max_count, 3200);
        assert_eq!(cfg.ingest.quota_retries, 0);
    }
}
