//! Server configuration: TOML file, environment overrides, CLI overrides,
//! in that order of precedence (later wins).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Directory for attachment bytes.
    pub blob_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8787,
            db_path: PathBuf::from("corkboard.db"),
            blob_dir: PathBuf::from("blobs"),
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)?
            }
            None => ServerConfig::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("CORKBOARD_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("CORKBOARD_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }
        if let Ok(db) = std::env::var("CORKBOARD_DB") {
            self.db_path = PathBuf::from(db);
        }
        if let Ok(dir) = std::env::var("CORKBOARD_BLOBS") {
            self.blob_dir = PathBuf::from(dir);
        }
    }
}
