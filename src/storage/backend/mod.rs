//! SeaORM storage backend
//!
//! 所有表的读写都走这里；按关注点拆分：
//! - events: 追踪事件写入与统计
//! - orders: 订单与日销售汇总 upsert / 查询
//! - webhooks: 扇出配置查询与投递记账
//! - metrics: 花费/指标行读写

mod connection;
mod converters;
mod events;
mod metrics;
mod orders;
pub mod retry;
mod webhooks;

use sea_orm::DatabaseConnection;

use crate::config::StaticConfig;
use crate::errors::{CodpulseError, Result};
use self::retry::RetryConfig;

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use orders::OrderQueryFilter;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(CodpulseError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM 存储后端
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: RetryConfig,
}

impl SeaOrmStorage {
    /// 按配置连接数据库并跑迁移
    pub async fn init(config: &StaticConfig) -> Result<Self> {
        let database_url = &config.database.database_url;
        let backend_name = infer_backend_from_url(database_url)?;

        let db = if backend_name == "sqlite" {
            let url = if database_url.starts_with("sqlite://") {
                database_url.clone()
            } else {
                format!("sqlite://{}", database_url)
            };
            connect_sqlite(&url).await?
        } else {
            connect_generic(database_url, &backend_name, config.database.pool_size).await?
        };

        run_migrations(&db).await?;

        Ok(Self {
            db,
            backend_name,
            retry_config: RetryConfig {
                max_retries: config.database.retry_count,
                base_delay_ms: config.database.retry_base_delay_ms,
                max_delay_ms: config.database.retry_max_delay_ms,
            },
        })
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn get_backend_name(&self) -> &str {
        &self.backend_name
    }

    pub(crate) fn retry_config(&self) -> RetryConfig {
        self.retry_config
    }
}
