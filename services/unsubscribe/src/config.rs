use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::store::StoreConfig;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_METRICS_BIND: &str = "0.0.0.0:9090";
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown storage backend: {other}"),
        }
    }
}

// Unsubscribe service configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct UnsubscribeConfig {
    // HTTP listener bind address.
    pub bind_addr: SocketAddr,
    // Metrics HTTP listener bind address.
    pub metrics_bind: SocketAddr,
    // Directory holding unsubscribe_log.json.
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
}

#[derive(Debug, Deserialize)]
struct UnsubscribeConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    data_dir: Option<PathBuf>,
    storage: Option<String>,
}

impl UnsubscribeConfig {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value.parse::<u16>().with_context(|| "parse PORT")?,
            Err(_) => DEFAULT_PORT,
        };
        let bind_addr = match std::env::var("UNSUBSCRIBE_BIND") {
            Ok(value) => value.parse().with_context(|| "parse UNSUBSCRIBE_BIND")?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], port)),
        };
        let metrics_bind = std::env::var("UNSUBSCRIBE_METRICS_BIND")
            .unwrap_or_else(|_| DEFAULT_METRICS_BIND.to_string())
            .parse()
            .with_context(|| "parse UNSUBSCRIBE_METRICS_BIND")?;
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let storage = match std::env::var("UNSUBSCRIBE_STORAGE_BACKEND") {
            Ok(value) => {
                StorageBackend::parse(&value).with_context(|| "parse UNSUBSCRIBE_STORAGE_BACKEND")?
            }
            Err(_) => StorageBackend::File,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            data_dir,
            storage,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("UNSUBSCRIBE_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read UNSUBSCRIBE_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: UnsubscribeConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse unsubscribe config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.data_dir {
            self.data_dir = value;
        }
        if let Some(value) = override_cfg.storage {
            self.storage = StorageBackend::parse(&value).with_context(|| "parse storage")?;
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            directory: self.data_dir.clone(),
        }
    }
}
