//! Server configuration.
//!
//! Built once at start-up from, in increasing priority: the defaults below,
//! an optional TOML file named by `GRAND_FORMS_CONFIG`, and `GRAND_FORMS_*`
//! environment variables (`GRAND_FORMS_DATA_DIR=/srv/forms`). The resulting
//! [`ServerConfig`] is handed to the components that need it; nothing reads
//! the environment after that.

use config::{Config, ConfigError, Environment, File, FileFormat};
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "GRAND_FORMS_CONFIG";
const ENV_PREFIX: &str = "GRAND_FORMS";

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_host: String,
    pub bind_port: u16,
    /// Root of `forms/` and `responses/`.
    pub data_dir: PathBuf,
    /// Aggregation service receiving submissions of `db` destinations.
    pub aggregator_url: String,
    /// Largest accepted request body, in bytes.
    pub max_body_size: usize,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            bind_port: 8080,
            data_dir: PathBuf::from("./data"),
            aggregator_url: "http://localhost:3002/api/submit".to_string(),
            max_body_size: 20 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn aggregator_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.aggregator_url).map_err(|e| {
            ConfigError::Message(format!("invalid aggregator_url {:?}: {}", self.aggregator_url, e))
        })
    }
}

fn validate_config(config: ServerConfig) -> Result<ServerConfig, ConfigError> {
    config.aggregator_url()?;
    if config.max_body_size == 0 {
        return Err(ConfigError::Message("max_body_size must be positive".to_string()));
    }
    Ok(config)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

pub fn load_config() -> Result<ServerConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        builder = builder.add_source(File::with_name(&path).format(FileFormat::Toml));
    }

    builder
        .add_source(environment())
        .build()?
        .try_deserialize()
        .and_then(validate_config)
}

// Load a config from a string (to test our structs are defined correctly)
pub fn load_config_from_string(config_str: &str) -> Result<ServerConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(config_str, FileFormat::Toml))
        .build()?
        .try_deserialize()
        .and_then(validate_config)
}

#[cfg(test)]
mod tests {
    use super::{load_config_from_string, ServerConfig};
    use std::path::PathBuf;

    const TEST_CONFIG_BASIC: &str = r#"
bind_host = "0.0.0.0"
bind_port = 80
data_dir = "/srv/grand-forms"
aggregator_url = "http://aggregator.internal:3002/api/submit"
"#;

    const TEST_CONFIG_BAD_URL: &str = r#"
aggregator_url = "not a url"
"#;

    #[test]
    fn test_parse_config_basic() {
        let config = load_config_from_string(TEST_CONFIG_BASIC).unwrap();

        assert_eq!(
            config,
            ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                bind_port: 80,
                data_dir: PathBuf::from("/srv/grand-forms"),
                aggregator_url: "http://aggregator.internal:3002/api/submit".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_config_empty() {
        let config = load_config_from_string("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.aggregator_url().unwrap().path(), "/api/submit");
    }

    #[test]
    fn test_parse_config_bad_url() {
        let error = load_config_from_string(TEST_CONFIG_BAD_URL).unwrap_err();
        assert!(error.to_string().contains("invalid aggregator_url"));
    }
}
