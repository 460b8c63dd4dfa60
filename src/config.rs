//! # Config — Backend Connection Settings
//!
//! Settings resolve in layers, later layers winning:
//!
//! 1. built-in defaults (`http://127.0.0.1:8000`, user `admin`, 10 rows/page)
//! 2. `~/.trlboard/config.toml` (or the file given with `--config`)
//! 3. environment (`TRLBOARD_API_URL`, `TRLBOARD_USER`, `TRLBOARD_PASSWORD`)
//! 4. command-line flags
//!
//! Layers 3 and 4 are merged by clap (`#[arg(env = ...)]`) in `main.rs` and
//! handed to [`Settings::apply_overrides`]. The password never lives in the
//! TOML file; it only comes from the environment or the command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Non-secret settings, as stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub username: String,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: DEFAULT_API_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            page_size: crate::pagination::DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub page_size: Option<usize>,
}

impl Settings {
    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).context("invalid settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load the settings file.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location is tried and silently skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Settings::default()),
            },
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Settings::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn apply_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(user) = overrides.username {
            self.username = user;
        }
        if let Some(size) = overrides.page_size {
            self.page_size = size;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.username.is_empty() {
            anyhow::bail!("username must not be empty");
        }
        let url = url::Url::parse(&self.api_url)
            .with_context(|| format!("invalid api_url '{}'", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api_url must be http or https, got '{}'", url.scheme());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

/// `~/.trlboard/config.toml`, if a home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()?;
    Some(PathBuf::from(home).join(".trlboard").join("config.toml"))
}

/// Shared dashboard credential. The username is fixed per deployment, the
/// password is supplied by the operator at run time.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let password = password.into();
        if password.is_empty() {
            anyhow::bail!("password is required (use --password or TRLBOARD_PASSWORD)");
        }
        Ok(Credentials {
            username: username.into(),
            password,
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_deployment() {
        let s = Settings::default();
        assert_eq!(s.api_url, "http://127.0.0.1:8000");
        assert_eq!(s.username, "admin");
        assert_eq!(s.page_size, 10);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let s = Settings::from_toml("api_url = \"https://evals.example.org/\"\n").unwrap();
        assert_eq!(s.base_url(), "https://evals.example.org");
        assert_eq!(s.username, "admin");
        assert_eq!(s.page_size, 10);
    }

    #[test]
    fn rejects_zero_page_size() {
        assert!(Settings::from_toml("page_size = 0").is_err());
        let overrides = Overrides {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(Settings::default().apply_overrides(overrides).is_err());
    }

    #[test]
    fn rejects_non_http_url() {
        assert!(Settings::from_toml("api_url = \"ftp://host\"").is_err());
        assert!(Settings::from_toml("api_url = \"not a url\"").is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let s = Settings::from_toml("username = \"lab\"\npage_size = 25").unwrap();
        let s = s
            .apply_overrides(Overrides {
                api_url: Some("http://10.0.0.5:9000".into()),
                username: None,
                page_size: Some(5),
            })
            .unwrap();
        assert_eq!(s.api_url, "http://10.0.0.5:9000");
        assert_eq!(s.username, "lab");
        assert_eq!(s.page_size, 5);
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 3\ntimeout_secs = 5\n").unwrap();
        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.page_size, 3);
        assert_eq!(s.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn load_fails_for_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn credentials_require_password_and_redact_it() {
        assert!(Credentials::new("admin", "").is_err());
        let c = Credentials::new("admin", "hunter2").unwrap();
        assert_eq!(c.password(), "hunter2");
        let dbg = format!("{:?}", c);
        assert!(dbg.contains("admin"));
        assert!(!dbg.contains("hunter2"));
    }
}
