use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from the optional TOML file. Every key is optional; a
/// present key wins over the matching command line argument.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub logging_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
