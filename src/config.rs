//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::{fmt, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub blockio: BlockIoConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Block.io 接入配置
#[derive(Clone, Serialize, Deserialize)]
pub struct BlockIoConfig {
    pub api_key: String,
    pub pin: String,
    #[serde(default = "default_api_version")]
    pub version: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: usize,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
    pub enable_file_logging: bool,
    pub log_file_path: Option<String>,
}

fn default_api_version() -> u32 {
    2
}

fn default_base_url() -> String {
    "https://block.io".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retries() -> usize {
    2
}

// api_key / pin 不进日志
impl fmt::Debug for BlockIoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockIoConfig")
            .field("api_key", &redact(&self.api_key))
            .field("pin", &"***")
            .field("version", &self.version)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("retries", &self.retries)
            .finish()
    }
}

fn redact(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "***".into();
    }
    format!("{}***", secret.chars().take(4).collect::<String>())
}

impl Default for BlockIoConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("BLOCKIO_API_KEY").unwrap_or_default(),
            pin: std::env::var("BLOCKIO_PIN").unwrap_or_default(),
            version: std::env::var("BLOCKIO_API_VERSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_api_version),
            base_url: std::env::var("BLOCKIO_BASE_URL").unwrap_or_else(|_| default_base_url()),
            timeout_ms: std::env::var("BLOCKIO_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_timeout_ms),
            retries: std::env::var("BLOCKIO_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_retries),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8088".into()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            enable_file_logging: std::env::var("LOG_FILE_ENABLED")
                .ok()
                .map(|v| v == "1")
                .unwrap_or(false),
            log_file_path: std::env::var("LOG_FILE_PATH").ok(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            blockio: BlockIoConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.blockio.api_key.trim().is_empty() {
            anyhow::bail!("BLOCKIO_API_KEY must be set");
        }

        if self.blockio.version == 0 {
            anyhow::bail!("BLOCKIO_API_VERSION must be >= 1");
        }

        if !self.blockio.base_url.starts_with("http://")
            && !self.blockio.base_url.starts_with("https://")
        {
            anyhow::bail!("BLOCKIO_BASE_URL must start with http:// or https://");
        }

        if self.blockio.timeout_ms == 0 {
            anyhow::bail!("BLOCKIO_TIMEOUT_MS must be greater than 0");
        }

        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}
