// dbrestore/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "DBRESTORE_CONFIG";
pub const DEFAULT_GZIP_PROGRAM: &str = "gzip";

// Structs for deserializing config.json
#[derive(Debug, Clone, Deserialize)]
pub struct RawJsonConfig {
    pub dumps_path: Option<PathBuf>,
    pub default_connection: Option<String>,
    pub connections: Option<BTreeMap<String, String>>,
    pub check_connection: Option<bool>,
    pub gzip_program: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    Mysql,
    Sqlite,
}

impl Driver {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "postgres" | "postgresql" => Some(Driver::Postgres),
            "mysql" => Some(Driver::Mysql),
            "sqlite" => Some(Driver::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub name: String,
    pub driver: Driver,
    pub url: Url,
}

// Application's internal configuration
#[derive(Debug, Clone)]
pub struct RestoreConfig {
    pub dumps_path: PathBuf,
    pub default_connection: Option<String>,
    pub connections: BTreeMap<String, ConnectionConfig>,
    pub check_connection: bool,
    pub gzip_program: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub restore: RestoreConfig,
}

impl AppConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        let raw_json_config: RawJsonConfig = serde_json::from_str(&config_content)
            .with_context(|| {
                format!(
                    "Failed to parse JSON from config file at {}",
                    config_path.display()
                )
            })?;

        let restore = load_restore_config_from_json(&raw_json_config)?;
        log::debug!(
            "Loaded {} connection(s) from {}",
            restore.connections.len(),
            config_path.display()
        );

        Ok(AppConfig { restore })
    }
}

/// Location of the configuration file, honouring `DBRESTORE_CONFIG`.
pub fn config_path_from_env() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_restore_config_from_json(raw_config: &RawJsonConfig) -> Result<RestoreConfig> {
    let dumps_path = raw_config
        .dumps_path
        .as_ref()
        .context("dumps_path must be set in config.json")?
        .clone();

    if dumps_path.to_string_lossy().trim().is_empty() {
        return Err(AppError::Config("dumps_path cannot be empty in config.json.".to_string()).into());
    }

    let raw_connections = raw_config
        .connections
        .as_ref()
        .filter(|c| !c.is_empty())
        .context("connections must contain at least one entry in config.json")?;

    let mut connections = BTreeMap::new();
    for (name, url) in raw_connections {
        let connection = parse_connection_url(name, url)
            .with_context(|| format!("Invalid connection '{}' in config.json", name))?;
        connections.insert(name.clone(), connection);
    }

    let default_connection = raw_config
        .default_connection
        .clone()
        .filter(|s| !s.trim().is_empty());
    if let Some(name) = &default_connection {
        if !connections.contains_key(name) {
            return Err(AppError::Config(format!(
                "default_connection '{}' is not one of the configured connections",
                name
            ))
            .into());
        }
    }

    Ok(RestoreConfig {
        dumps_path,
        default_connection,
        connections,
        check_connection: raw_config.check_connection.unwrap_or(true),
        gzip_program: raw_config
            .gzip_program
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GZIP_PROGRAM.to_string()),
    })
}

/// Parses a connection URL; the scheme picks the driver.
fn parse_connection_url(name: &str, url: &str) -> crate::errors::Result<ConnectionConfig> {
    let url = Url::parse(url)?;
    let driver = Driver::from_scheme(url.scheme()).ok_or_else(|| {
        AppError::Config(format!(
            "unsupported scheme '{}' (expected postgres, mysql or sqlite)",
            url.scheme()
        ))
    })?;

    Ok(ConnectionConfig {
        name: name.to_string(),
        driver,
        url,
    })
}
