use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub drawing: DrawingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 分享链接前缀，例如 https://drawings.example.com
    pub public_base_url: String,
    /// 生产环境下会话 Cookie 带 Secure 标记
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: default_public_base_url(),
            production: false,
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_secret: String,
    /// 明文密码或 bcrypt 哈希；为空时登录总是失败
    pub admin_password: String,
    pub session_expires_in: i64, // seconds
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: "change-me-in-production".to_string(),
            admin_password: String::new(),
            session_expires_in: default_session_expires_in(),
        }
    }
}

fn default_session_expires_in() -> i64 {
    7 * 24 * 60 * 60
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    Blob,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filesystem" | "fs" => Ok(StorageBackend::Filesystem),
            "blob" => Ok(StorageBackend::Blob),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: String,
    pub list_limit: usize,
    pub blob: BlobConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            list_limit: default_list_limit(),
            blob: BlobConfig::default(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_list_limit() -> usize {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    pub base_url: String,
    pub token: String,
    pub prefix: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            base_url: "https://blob.vercel-storage.com".to_string(),
            token: String::new(),
            prefix: default_blob_prefix(),
        }
    }
}

fn default_blob_prefix() -> String {
    "drawings/".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// 单次抽奖所有玩家报名次数之和上限
    pub max_total_entries: i64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            max_total_entries: default_max_total_entries(),
        }
    }
}

fn default_max_total_entries() -> i64 {
    1_000_000
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量与默认值
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("Config file {config_path} not found, using environment and defaults");
                Config::default()
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "无法读取配置文件 {config_path}: {e}"
                )));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env(|name| env::var(name).ok())?;

        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("解析配置文件失败: {e}")))
    }

    /// 用环境变量覆盖配置，`get_env` 便于测试时注入
    pub fn apply_env<F>(&mut self, get_env: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get_env("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Some(v) = get_env("PUBLIC_BASE_URL") {
            self.server.public_base_url = v;
        }
        if let Some(v) = get_env("PRODUCTION")
            && let Ok(b) = v.parse()
        {
            self.server.production = b;
        }
        if let Some(v) = get_env("SESSION_SECRET") {
            self.auth.session_secret = v;
        }
        if let Some(v) = get_env("ADMIN_PASSWORD") {
            self.auth.admin_password = v;
        }
        if let Some(v) = get_env("SESSION_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.auth.session_expires_in = n;
        }
        if let Some(v) = get_env("STORAGE_BACKEND") {
            self.storage.backend = v.parse().map_err(AppError::ConfigError)?;
        }
        if let Some(v) = get_env("DATA_DIR") {
            self.storage.data_dir = v;
        }
        if let Some(v) = get_env("STORAGE_LIST_LIMIT")
            && let Ok(n) = v.parse()
        {
            self.storage.list_limit = n;
        }
        if let Some(v) = get_env("BLOB_BASE_URL") {
            self.storage.blob.base_url = v;
        }
        if let Some(v) = get_env("BLOB_READ_WRITE_TOKEN") {
            self.storage.blob.token = v;
        }
        if let Some(v) = get_env("BLOB_PREFIX") {
            self.storage.blob.prefix = v;
        }
        if let Some(v) = get_env("DRAWING_MAX_TOTAL_ENTRIES")
            && let Ok(n) = v.parse()
        {
            self.drawing.max_total_entries = n;
        }
        Ok(())
    }
}
