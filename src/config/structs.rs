use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含基础设施配置：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接与重试配置
/// - logging: 日志配置
/// - shopify: 店铺平台 API 配置
/// - dispatch: Webhook/像素扇出配置
/// - metrics: 指标计算配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub shopify: ShopifyConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：CP，分隔符：__
    /// 示例：CP__SERVER__PORT=9999
    pub fn load() -> Self {
        use config::{Config, Environment, File};

        let path = "config.toml";

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("CP")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 店铺平台（Shopify Admin REST）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyConfig {
    #[serde(default = "default_shopify_api_version")]
    pub api_version: String,
    #[serde(default = "default_shopify_page_size")]
    pub page_size: u32,
    #[serde(default = "default_shopify_timeout_secs")]
    pub timeout_secs: u64,
    /// Admin API 访问令牌（通常经 CP__SHOPIFY__ACCESS_TOKEN 注入）
    #[serde(default)]
    pub access_token: Option<String>,
    /// 广告平台报表的默认时区（订单时间戳的换算基准之一）
    #[serde(default = "default_platform_timezone")]
    pub platform_timezone: String,
    /// 卖家本地时区，日分桶按此时区计算
    #[serde(default = "default_seller_timezone")]
    pub seller_timezone: String,
}

/// 扇出（Webhook / 像素）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_dispatch_workers")]
    pub workers: usize,
    #[serde(default = "default_dispatch_queue_depth")]
    pub queue_depth: usize,
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
    /// WebhookLog 保存的响应体上限（字节）
    #[serde(default = "default_response_body_cap")]
    pub response_body_cap: usize,
    /// 工作区扇出配置缓存 TTL（秒）
    #[serde(default = "default_config_cache_ttl_secs")]
    pub config_cache_ttl_secs: u64,
}

/// 指标计算配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// 原生花费为零时重算模式使用的换算率兜底值
    #[serde(default = "default_conversion_rate")]
    pub default_conversion_rate: f64,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "codpulse.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    7
}

fn default_enable_rotation() -> bool {
    true
}

fn default_shopify_api_version() -> String {
    "2024-10".to_string()
}

fn default_shopify_page_size() -> u32 {
    250
}

fn default_shopify_timeout_secs() -> u64 {
    30
}

fn default_platform_timezone() -> String {
    // Meta 广告账户的默认报表时区
    "America/Los_Angeles".to_string()
}

fn default_seller_timezone() -> String {
    "Asia/Baghdad".to_string()
}

fn default_dispatch_workers() -> usize {
    4
}

fn default_dispatch_queue_depth() -> usize {
    1024
}

fn default_delivery_timeout_secs() -> u64 {
    10
}

fn default_response_body_cap() -> usize {
    1024
}

fn default_config_cache_ttl_secs() -> u64 {
    60
}

fn default_conversion_rate() -> f64 {
    3.67
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            api_version: default_shopify_api_version(),
            page_size: default_shopify_page_size(),
            timeout_secs: default_shopify_timeout_secs(),
            access_token: None,
            platform_timezone: default_platform_timezone(),
            seller_timezone: default_seller_timezone(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_dispatch_workers(),
            queue_depth: default_dispatch_queue_depth(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            response_body_cap: default_response_body_cap(),
            config_cache_ttl_secs: default_config_cache_ttl_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            default_conversion_rate: default_conversion_rate(),
        }
    }
}
