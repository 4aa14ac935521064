use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppCfg {
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub server: ServerCfg,
    #[serde(default)]
    pub store: StoreCfg,
    #[serde(default)]
    pub datasets: DatasetsCfg,
}

impl AppCfg {
    pub fn load(path: &Path) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::default().separator("__"))
            .build()
            .context("building configuration")?;

        cfg.try_deserialize().context("deserializing configuration")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpCfg {
    #[serde(rename = "userAgent", default = "default_ua")]
    pub user_agent: String,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(
        rename = "poolIdleTimeout",
        with = "humantime_serde",
        default = "default_pool_idle"
    )]
    pub pool_idle_timeout: Duration,
    #[serde(
        rename = "tcpKeepAlive",
        with = "humantime_serde",
        default = "default_keep_alive"
    )]
    pub tcp_keep_alive: Duration,
    #[serde(rename = "poolMaxIdlePerHost", default = "default_pool")]
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            user_agent: default_ua(),
            timeout: default_timeout(),
            pool_idle_timeout: default_pool_idle(),
            tcp_keep_alive: default_keep_alive(),
            pool_max_idle_per_host: default_pool(),
        }
    }
}

fn default_ua() -> String {
    "aiclock/0.1".into()
}
fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
fn default_pool_idle() -> Duration {
    Duration::from_secs(90)
}
fn default_keep_alive() -> Duration {
    Duration::from_secs(60)
}
fn default_pool() -> usize {
    16
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerCfg {
    #[serde(rename = "bindAddr", default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreCfg {
    #[serde(rename = "dataDir", default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetsCfg {
    #[serde(default = "default_models_cfg")]
    pub models: DatasetCfg,
    #[serde(default = "default_benchmarks_cfg")]
    pub benchmarks: DatasetCfg,
}

impl Default for DatasetsCfg {
    fn default() -> Self {
        Self {
            models: default_models_cfg(),
            benchmarks: default_benchmarks_cfg(),
        }
    }
}

/// One upstream dataset: a primary archive URL plus an ordered fallback list
/// tried in sequence when the primary fails.
#[derive(Debug, Deserialize, Clone)]
pub struct DatasetCfg {
    pub url: String,
    #[serde(rename = "fallbackUrls", default)]
    pub fallback_urls: Vec<String>,
    #[serde(rename = "csvPattern")]
    pub csv_pattern: String,
}

fn default_models_cfg() -> DatasetCfg {
    DatasetCfg {
        url: "https://epoch.ai/data/ai-models/ai-models.zip".to_string(),
        fallback_urls: vec![
            "https://epoch.ai/data/ai-models-download".to_string(),
            "https://epoch.ai/data/download/ai-models".to_string(),
        ],
        csv_pattern: "models".to_string(),
    }
}

fn default_benchmarks_cfg() -> DatasetCfg {
    DatasetCfg {
        url: "https://epoch.ai/data/benchmarks/benchmarks.zip".to_string(),
        fallback_urls: vec![
            "https://epoch.ai/data/benchmarks-download".to_string(),
            "https://epoch.ai/data/download/benchmarks".to_string(),
        ],
        csv_pattern: "benchmark".to_string(),
    }
}
