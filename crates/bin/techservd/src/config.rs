//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `techserv.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use serde::Deserialize;

use techserv_app::services::workflow_service::DEFAULT_DRAFT_GROUP;
use techserv_domain::address::AddressDefaults;
use techserv_domain::id::UserId;

const CONFIG_FILE: &str = "techserv.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Draft reset authorization.
    pub workflow: WorkflowConfig,
    /// Country and subdivision given to new addresses.
    pub addresses: AddressDefaults,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Group whose members may send services back to review.
    pub draft_group: String,
    /// Users added to `draft_group` at startup.
    pub draft_members: Vec<UserId>,
}

impl Config {
    /// Load configuration from `techserv.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply `TECHSERV_*` and `RUST_LOG` values found through `lookup`.
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("TECHSERV_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("TECHSERV_PORT") {
            self.server.port = parse_port(&val)?;
        }
        if let Some(val) = lookup("TECHSERV_BIND") {
            let (host, port) = val
                .rsplit_once(':')
                .ok_or_else(|| ConfigError::Validation(format!("bind address {val:?} has no port")))?;
            self.server.host = host.to_string();
            self.server.port = parse_port(port)?;
        }
        if let Some(val) = lookup("TECHSERV_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("TECHSERV_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("TECHSERV_DRAFT_GROUP") {
            self.workflow.draft_group = val;
        }
        if let Some(val) = lookup("TECHSERV_COUNTRY_CODE") {
            self.addresses.country_code = val;
        }
        if let Some(val) = lookup("TECHSERV_SUBDIVISION_CODE") {
            self.addresses.subdivision_code = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.workflow.draft_group.trim().is_empty() {
            return Err(ConfigError::Validation(
                "workflow.draft_group must not be empty".to_string(),
            ));
        }
        let country = &self.addresses.country_code;
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "addresses.country_code {country:?} is not an ISO 3166-1 alpha-2 code"
            )));
        }
        if !self
            .addresses
            .subdivision_code
            .starts_with(&format!("{country}-"))
        {
            return Err(ConfigError::Validation(format!(
                "addresses.subdivision_code {:?} does not belong to {country}",
                self.addresses.subdivision_code
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::Validation(format!("invalid port {raw:?}")))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:techserv.db".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "techservd=info,techserv=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            draft_group: DEFAULT_DRAFT_GROUP.to_string(),
            draft_members: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:techserv.db");
        assert_eq!(config.workflow.draft_group, "service_draft");
        assert_eq!(config.addresses.country_code, "EC");
        assert_eq!(config.addresses.subdivision_code, "EC-L");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.workflow.draft_members.is_empty());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [workflow]
            draft_group = 'supervisors'
            draft_members = ['5f0c4a1e-7d3b-4a8e-9c1f-2b6d8e0a4c7f']

            [addresses]
            country_code = 'PE'
            subdivision_code = 'PE-LIM'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.workflow.draft_group, "supervisors");
        assert_eq!(config.workflow.draft_members.len(), 1);
        assert_eq!(config.addresses.country_code, "PE");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [server]
            port = 8080

            [addresses]
            subdivision_code = 'EC-P'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.addresses.country_code, "EC");
        assert_eq!(config.addresses.subdivision_code, "EC-P");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_let_environment_win_over_file() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("TECHSERV_PORT", "8081"),
                ("TECHSERV_DATABASE_URL", "sqlite::memory:"),
                ("TECHSERV_DRAFT_GROUP", "leads"),
                ("TECHSERV_LOG", "info"),
                ("RUST_LOG", "trace"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.workflow.draft_group, "leads");
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_split_bind_override() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("TECHSERV_BIND", "127.0.0.1:4000")]))
            .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
    }

    #[test]
    fn should_reject_malformed_port_override() {
        let mut config = Config::default();
        assert!(matches!(
            config.apply_overrides(env(&[("TECHSERV_PORT", "http")])),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_blank_draft_group() {
        let mut config = Config::default();
        config.workflow.draft_group = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_subdivision_of_other_country() {
        let mut config = Config::default();
        config.addresses.subdivision_code = "PE-LIM".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_lowercase_country() {
        let mut config = Config::default();
        config.addresses.country_code = "ec".to_string();
        config.addresses.subdivision_code = "ec-L".to_string();
        assert!(config.validate().is_err());
    }
}
