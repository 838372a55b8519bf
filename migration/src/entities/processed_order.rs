//! 已处理订单实体
//!
//! 店铺平台原始订单的存储就绪形态；(workspace_id, external_id) 唯一，
//! 重复同步按该键 upsert。

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "processed_order")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: String,
    /// 外部平台的订单 ID（幂等键的一半）
    pub external_id: String,
    pub order_number: Option<String>,
    pub created_at_utc: DateTimeUtc,
    /// 卖家本地时区的日历日分桶
    pub local_day: Date,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub currency: String,
    pub total_price: f64,
    pub subtotal_price: f64,
    pub total_discounts: f64,
    pub total_items: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub product_names: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub skus: Option<String>,
    pub discount_codes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub landing_site: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub fbclid: Option<String>,
    pub gclid: Option<String>,
    pub ttclid: Option<String>,
    /// 归因渠道（facebook / organic / other）
    pub channel: String,
    pub synced_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
