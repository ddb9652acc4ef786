//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，环境变量可覆盖其中的常用项

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
    /// 是否信任 Forwarded / X-Forwarded-For（仅部署在可信反向代理之后时开启）
    #[serde(default)]
    pub trust_forwarded: bool,
}

/// 报价代理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// 代理根地址
    #[serde(default = "default_proxy_url")]
    pub url: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 点赞存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Redis 地址（为空则只使用内存存储）
    #[serde(default)]
    pub redis_url: Option<String>,
    /// 单次存储操作超时（毫秒）
    #[serde(default = "default_store_timeout")]
    pub timeout_ms: u64,
}

/// 隐私配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyConfig {
    /// IP 哈希盐值
    #[serde(default = "default_ip_salt")]
    pub ip_salt: String,
}

/// API 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 错误响应中是否返回 detail
    #[serde(default)]
    pub expose_error_detail: bool,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub privacy: PrivacyConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_proxy_url() -> String { "https://stock-price-checker-proxy.freecodecamp.rocks".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_store_timeout() -> u64 { 500 }
fn default_ip_salt() -> String { "salt".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
            trust_forwarded: false,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: default_proxy_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            timeout_ms: default_store_timeout(),
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            ip_salt: default_ip_salt(),
        }
    }
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后应用环境变量
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }

    /// 应用环境变量覆盖
    ///
    /// 取值函数作为参数传入，便于测试
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse_var(&lookup, "PORT") {
            self.server.port = port;
        }
        if let Some(url) = lookup("PROXY_URL") {
            self.proxy.url = url.trim().to_string();
        }
        if let Some(salt) = lookup("IP_SALT") {
            self.privacy.ip_salt = salt;
        }
        if let Some(url) = lookup("REDIS_URL") {
            let url = url.trim().to_string();
            self.store.redis_url = (!url.is_empty()).then_some(url);
        }
        if let Some(trust) = parse_var(&lookup, "TRUST_PROXY") {
            self.server.trust_forwarded = trust;
        }
        if let Some(expose) = parse_var(&lookup, "EXPOSE_ERROR_DETAIL") {
            self.api.expose_error_detail = expose;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("环境变量 {} 的值无效 ({}): {}", key, raw, e);
            None
        }
    }
}
