//! Webhook 订阅配置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "webhook_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    /// HMAC 签名密钥，缺省时投递不带签名头
    pub secret: Option<String>,
    /// 订阅的事件名列表（JSON 数组文本）
    #[sea_orm(column_type = "Text")]
    pub events: String,
    pub is_active: bool,
    pub last_triggered_at: Option<DateTimeUtc>,
    pub failure_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
