//! # Configuration
//!
//! Settings are read from a TOML file and then overridden by environment variables
//! and CLI flags (precedence: CLI args > Environment > Config file > Defaults). The
//! resulting [`Config`] value is passed explicitly to every component that needs it.
//!
//! ```toml
//! callsign = "N0CALL"
//! radio = "IC-7300"
//!
//! [hamlib]
//! server = "localhost:4532"
//! poll_interval_ms = 1000
//! poll_jitter_ms = 1000
//! query_timeout_ms = 2000
//!
//! [firebase]
//! project = "hrwbota"
//! url = "https://hrwbota-default-rtdb.firebaseio.com"
//! token = "/etc/rigwatch/token"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! A missing default file (`rigwatch.toml`) is not an error: defaults plus overrides are
//! used. A file named explicitly must exist.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "rigwatch.toml";

/// Characters the Realtime Database does not accept in a key.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operator callsign; the datastore key under `hams/`.
    #[serde(default)]
    pub callsign: String,
    /// Free-form radio model written to the operator profile.
    #[serde(default)]
    pub radio: String,
    #[serde(default)]
    pub hamlib: HamlibConfig,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HamlibConfig {
    /// `host:port` of rigctld.
    pub server: String,
    pub poll_interval_ms: u64,
    /// Upper bound of the random delay added to each poll tick.
    pub poll_jitter_ms: u64,
    pub query_timeout_ms: u64,
}

impl Default for HamlibConfig {
    fn default() -> Self {
        Self {
            server: "localhost:4532".to_string(),
            poll_interval_ms: 1000,
            poll_jitter_ms: 1000,
            query_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    pub project: String,
    /// Database URL. Derived from `project` when empty.
    pub url: String,
    /// Path to a service-account key JSON or a file holding a database secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project: "hrwbota".to_string(),
            url: "https://hrwbota-default-rtdb.firebaseio.com".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Values supplied on the command line or through `RIGWATCH_*` variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub callsign: Option<String>,
    pub radio: Option<String>,
    pub hamlib_server: Option<String>,
    pub log_level: Option<String>,
    pub firebase_project: Option<String>,
    pub firebase_url: Option<String>,
    pub firebase_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            callsign: String::new(),
            radio: String::new(),
            hamlib: HamlibConfig::default(),
            firebase: FirebaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        Self::from_toml(path, &content)
    }

    /// Load `path` if it exists. When `required` is false a missing file yields defaults.
    pub async fn load_or_default(path: &str, required: bool) -> Result<Self, ConfigError> {
        if !required && !Path::new(path).exists() {
            return Ok(Config::default());
        }
        Self::load(path).await
    }

    fn from_toml(path: &str, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.callsign {
            self.callsign = v;
        }
        if let Some(v) = overrides.radio {
            self.radio = v;
        }
        if let Some(v) = overrides.hamlib_server {
            self.hamlib.server = v;
        }
        if let Some(v) = overrides.log_level {
            self.logging.level = v;
        }
        if let Some(v) = overrides.firebase_project {
            self.firebase.project = v;
        }
        if let Some(v) = overrides.firebase_url {
            self.firebase.url = v;
        }
        if let Some(v) = overrides.firebase_token {
            self.firebase.token = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let callsign = self.callsign.trim();
        if callsign.is_empty() {
            return Err(ConfigError::Invalid("callsign is required".to_string()));
        }
        if callsign
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_KEY_CHARS.contains(&c))
        {
            return Err(ConfigError::Invalid(format!(
                "callsign '{}' contains characters not allowed in a datastore key",
                callsign
            )));
        }
        if self.hamlib.server.trim().is_empty() {
            return Err(ConfigError::Invalid("hamlib server is required".to_string()));
        }
        if self.hamlib.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "hamlib.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.hamlib.query_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "hamlib.query_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.firebase.url.trim().is_empty() && self.firebase.project.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "either firebase.url or firebase.project must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// The database URL, derived from the project id when no URL is configured.
    pub fn database_url(&self) -> String {
        let url = self.firebase.url.trim();
        if url.is_empty() {
            format!(
                "https://{}-default-rtdb.firebaseio.com",
                self.firebase.project.trim()
            )
        } else {
            url.trim_end_matches('/').to_string()
        }
    }

    pub fn profile_path(&self) -> String {
        format!("hams/{}", self.callsign.trim())
    }

    pub fn status_path(&self) -> String {
        format!("{}/status", self.profile_path())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.hamlib.poll_interval_ms)
    }

    pub fn poll_jitter(&self) -> Duration {
        Duration::from_millis(self.hamlib.poll_jitter_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.hamlib.query_timeout_ms)
    }

    /// Upper bound for one datastore write: four poll intervals, at least two seconds.
    pub fn publish_timeout(&self) -> Duration {
        (self.poll_interval() * 4).max(Duration::from_secs(2))
    }

    /// Parsed `logging.level`; `None` when the value is not a recognised level.
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        match self.logging.level.trim().to_ascii_lowercase().as_str() {
            "off" | "disabled" => Some(log::LevelFilter::Off),
            "error" => Some(log::LevelFilter::Error),
            "warn" | "warning" => Some(log::LevelFilter::Warn),
            "info" => Some(log::LevelFilter::Info),
            "debug" => Some(log::LevelFilter::Debug),
            "trace" => Some(log::LevelFilter::Trace),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            callsign: "W1AW".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults_match_hrwbota_deployment() {
        let config = Config::default();
        assert_eq!(config.hamlib.server, "localhost:4532");
        assert_eq!(config.firebase.project, "hrwbota");
        assert_eq!(
            config.database_url(),
            "https://hrwbota-default-rtdb.firebaseio.com"
        );
        assert_eq!(config.log_level(), Some(log::LevelFilter::Info));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml(
            "inline",
            r#"
callsign = "K1ABC"
[hamlib]
server = "rig.local:4532"
poll_interval_ms = 500
"#,
        )
        .unwrap();
        assert_eq!(config.callsign, "K1ABC");
        assert_eq!(config.hamlib.server, "rig.local:4532");
        assert_eq!(config.hamlib.poll_interval_ms, 500);
        assert_eq!(config.hamlib.query_timeout_ms, 2000);
        assert_eq!(config.firebase.project, "hrwbota");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = valid();
        config.apply_overrides(ConfigOverrides {
            callsign: Some("N0CALL".to_string()),
            hamlib_server: Some("10.0.0.2:4532".to_string()),
            firebase_token: Some("/tmp/token".to_string()),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.callsign, "N0CALL");
        assert_eq!(config.hamlib.server, "10.0.0.2:4532");
        assert_eq!(config.firebase.token.as_deref(), Some("/tmp/token"));
        assert_eq!(config.radio, "");
    }

    #[test]
    fn test_validate_rejects_bad_callsigns() {
        assert!(valid().validate().is_ok());
        for bad in ["", "  ", "W1AW/P", "W1.AW", "W1 AW", "W1#AW"] {
            let config = Config {
                callsign: bad.to_string(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "accepted callsign {:?}", bad);
        }
    }

    #[test]
    fn test_validate_requires_firebase_target() {
        let mut config = valid();
        config.firebase.url.clear();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.database_url(),
            "https://hrwbota-default-rtdb.firebaseio.com"
        );
        config.firebase.project.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_publish_timeout_tracks_poll_interval() {
        let mut config = valid();
        assert_eq!(config.publish_timeout(), Duration::from_secs(4));
        config.hamlib.poll_interval_ms = 100;
        assert_eq!(config.publish_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_paths() {
        let config = valid();
        assert_eq!(config.profile_path(), "hams/W1AW");
        assert_eq!(config.status_path(), "hams/W1AW/status");
    }

    #[test]
    fn test_unknown_log_level() {
        let mut config = valid();
        config.logging.level = "chatty".to_string();
        assert_eq!(config.log_level(), None);
        config.logging.level = "DEBUG".to_string();
        assert_eq!(config.log_level(), Some(log::LevelFilter::Debug));
    }
}
