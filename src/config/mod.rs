mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_DB_FILE: &str = "music_database.db";

/// CLI arguments that can be used for config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        CliConfig {
            db_path: None,
            port: server.port,
            bind_address: server.bind_address,
            logging_level: server.requests_logging_level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
        if db_path.is_dir() {
            bail!("Database path is a directory: {:?}", db_path);
        }

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Unknown logging_level in config file: {:?}", s),
            },
            None => cli.logging_level,
        };

        Ok(Self {
            db_path,
            port,
            bind_address,
            logging_level,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level,
            port: self.port,
            bind_address: self.bind_address.clone(),
        }
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
