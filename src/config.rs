use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{Schema, DEFAULT_FIELDS};
use crate::query::RankMetric;

/// 服务配置（TOML）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// 目录快照（JSON）路径
    pub catalog_path: PathBuf,
    /// 定时重载间隔；0 表示不启用
    pub reload_interval_secs: u64,
    /// 监听快照文件变化并热重载
    pub watch_catalog: bool,
    pub rank_metric: RankMetric,
    /// 默认投影字段，同时决定哪些查询键可作为过滤参数
    pub default_fields: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 6060,
            catalog_path: default_data_dir().join("catalog.json"),
            reload_interval_secs: 0,
            watch_catalog: true,
            rank_metric: RankMetric::default(),
            default_fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// 读取配置：显式路径必须存在；未指定时尝试用户配置目录，缺失则全部取默认值
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = default_config_path();
                if !p.exists() {
                    tracing::debug!("No config at {:?}, using defaults", p);
                    return Ok(Self::default());
                }
                p
            }
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("read config {:?}: {}", path, e))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = toml::from_str(text)?;
        if cfg.default_fields.is_empty() {
            anyhow::bail!("default_fields must not be empty");
        }
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_addr, self.port).parse()?)
    }

    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_secs > 0).then(|| Duration::from_secs(self.reload_interval_secs))
    }

    pub fn schema(&self) -> Schema {
        Schema::new(self.default_fields.iter().cloned())
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cdn-query")
        .join("config.toml")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cdn-query")
}
