use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub storage: Storage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Storage {
    Postgres { dsn: String },
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn parse_config(contents: &str, path: &str) -> Result<Config, ConfigError> {
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
        path: path.to_string(),
        source,
    })
}

fn read_config(path: &str) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_config(&contents, path)
}

/// Builds the configuration from `HOST`, `PORT` and `PG_DSN`.
///
/// Without `PG_DSN` the server keeps its data in memory.
pub fn from_env_vars<F>(var: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = var("HOST").unwrap_or_else(default_host);

    let port = match var("PORT") {
        Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Env {
            name: "PORT",
            reason: e.to_string(),
        })?,
        None => DEFAULT_PORT,
    };

    let storage = match var("PG_DSN") {
        Some(dsn) if !dsn.is_empty() => Storage::Postgres { dsn },
        _ => {
            tracing::warn!("PG_DSN is not set, notes will be kept in memory only");
            Storage::Memory
        }
    };

    Ok(Config {
        host,
        port,
        storage,
    })
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path = env::var("NOTEFUL_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return read_config(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return read_config("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return read_config("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    from_env_vars(|name| env::var(name).ok())
}
