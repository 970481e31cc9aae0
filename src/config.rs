//! Configuration system
//!
//! Typed configuration for the relay: JIRA connection settings, rate-limit
//! parameters, and the seed maps for the team and component-alias registries.
//!
//! Loaded from environment variables (the `JIRA_*` family) or from
//! ~/.config/jira-relay/config.yaml. The JSON-shaped maps are parsed into
//! typed collections once here; no other component re-parses raw text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RelayError, Result};

/// Rate-limit parameters for outbound JIRA calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Sustained request rate (permits per second)
    #[serde(default = "default_rate_per_sec")]
    pub requests_per_sec: f64,

    /// Burst allowance above the sustained rate
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Maximum seconds a caller waits for a permit before failing
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_sec: default_rate_per_sec(),
            burst: default_burst(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

fn default_rate_per_sec() -> f64 {
    10.0
}

fn default_burst() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_verify_ssl() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_max_results() -> u32 {
    100
}

/// Configuration for the JIRA relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// JIRA server URL
    pub server_url: String,

    /// Personal access token for bearer authentication
    #[serde(default)]
    pub access_token: String,

    /// Verify SSL certificates
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum results per search request
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Outbound rate-limit parameters
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Team name -> ordered member identifiers
    #[serde(default)]
    pub teams: HashMap<String, Vec<String>>,

    /// Component alias -> canonical component name
    #[serde(default)]
    pub component_aliases: HashMap<String, String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            access_token: String::new(),
            verify_ssl: default_verify_ssl(),
            timeout_secs: default_timeout(),
            max_results: default_max_results(),
            rate_limit: RateLimitSettings::default(),
            teams: HashMap::new(),
            component_aliases: HashMap::new(),
        }
    }
}

impl RelayConfig {
    /// Create configuration from `JIRA_*` environment variables.
    ///
    /// `JIRA_TEAMS` and `JIRA_COMPONENT_ALIASES` hold JSON objects; invalid
    /// JSON degrades to an empty map with a warning rather than failing
    /// startup.
    pub fn from_env() -> Self {
        let rate_limit = RateLimitSettings {
            requests_per_sec: env_parsed("JIRA_RATE_LIMIT_RPS", default_rate_per_sec()),
            burst: env_parsed("JIRA_RATE_LIMIT_BURST", default_burst()),
            acquire_timeout_secs: env_parsed(
                "JIRA_RATE_LIMIT_ACQUIRE_TIMEOUT",
                default_acquire_timeout(),
            ),
        };

        Self {
            server_url: std::env::var("JIRA_SERVER_URL").unwrap_or_default(),
            access_token: std::env::var("JIRA_ACCESS_TOKEN").unwrap_or_default(),
            verify_ssl: std::env::var("JIRA_VERIFY_SSL")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            timeout_secs: env_parsed("JIRA_TIMEOUT", default_timeout()),
            max_results: env_parsed("JIRA_MAX_RESULTS", default_max_results()),
            rate_limit,
            teams: parse_json_map(
                "JIRA_TEAMS",
                std::env::var("JIRA_TEAMS").ok().as_deref(),
            ),
            component_aliases: parse_json_map(
                "JIRA_COMPONENT_ALIASES",
                std::env::var("JIRA_COMPONENT_ALIASES").ok().as_deref(),
            ),
        }
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Default config file location (~/.config/jira-relay/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("jira-relay");
        path.push("config.yaml");
        path
    }

    /// Validate that required fields are present
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(RelayError::Config("JIRA_SERVER_URL is required".to_string()));
        }
        if self.access_token.is_empty() {
            return Err(RelayError::Config(
                "JIRA_ACCESS_TOKEN is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a JSON object from an environment variable value, degrading to an
/// empty map (with a warning) on missing, empty, or malformed input.
fn parse_json_map<V>(var: &str, raw: Option<&str>) -> HashMap<String, V>
where
    V: for<'de> Deserialize<'de>,
{
    match raw {
        None => HashMap::new(),
        Some(raw) if raw.trim().is_empty() => HashMap::new(),
        Some(raw) => match serde_json::from_str(raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(var = var, error = %e, "Ignoring malformed JSON map");
                HashMap::new()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert!(config.verify_ssl);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_results, 100);
        assert_eq!(config.rate_limit.requests_per_sec, 10.0);
        assert_eq!(config.rate_limit.burst, 10);
        assert!(config.teams.is_empty());
        assert!(config.component_aliases.is_empty());
    }

    #[test]
    fn test_parse_teams_map() {
        let raw = r#"{"frontend": ["alice", "bob"], "backend": ["charlie", "david"]}"#;
        let teams: HashMap<String, Vec<String>> = parse_json_map("JIRA_TEAMS", Some(raw));

        assert_eq!(teams.len(), 2);
        assert_eq!(teams["frontend"], vec!["alice", "bob"]);
        assert_eq!(teams["backend"], vec!["charlie", "david"]);
    }

    #[test]
    fn test_parse_alias_map() {
        let raw = r#"{"ui": "User Interface", "be": "Backend Services"}"#;
        let aliases: HashMap<String, String> =
            parse_json_map("JIRA_COMPONENT_ALIASES", Some(raw));

        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases["ui"], "User Interface");
    }

    #[test]
    fn test_malformed_json_degrades_to_empty() {
        let teams: HashMap<String, Vec<String>> =
            parse_json_map("JIRA_TEAMS", Some("invalid json"));
        assert!(teams.is_empty());

        let empty: HashMap<String, String> = parse_json_map("JIRA_TEAMS", Some("   "));
        assert!(empty.is_empty());

        let missing: HashMap<String, String> = parse_json_map("JIRA_TEAMS", None);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_validate_required_fields() {
        let mut config = RelayConfig::default();
        assert!(matches!(
            config.validate(),
            Err(RelayError::Config(ref msg)) if msg.contains("JIRA_SERVER_URL")
        ));

        config.server_url = "https://jira.example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(RelayError::Config(ref msg)) if msg.contains("JIRA_ACCESS_TOKEN")
        ));

        config.access_token = "token".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        let mut config = RelayConfig {
            server_url: "https://jira.example.com".to_string(),
            access_token: "secret".to_string(),
            ..Default::default()
        };
        config
            .teams
            .insert("frontend".to_string(), vec!["alice".to_string()]);
        config
            .component_aliases
            .insert("ui".to_string(), "User Interface".to_string());

        config.save(&path).unwrap();
        let loaded = RelayConfig::load(&path).unwrap();

        assert_eq!(loaded.server_url, "https://jira.example.com");
        assert_eq!(loaded.teams["frontend"], vec!["alice"]);
        assert_eq!(loaded.component_aliases["ui"], "User Interface");
        assert_eq!(loaded.rate_limit.burst, 10);
    }
}
