//! 日销售汇总实体（(workspace_id, date, source) 唯一）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: String,
    pub date: Date,
    /// 销售来源（目前为 "shopify"）
    pub source: String,
    pub orders_count: i32,
    pub gross_revenue: f64,
    pub total_discounts: f64,
    pub net_revenue: f64,
    pub avg_order_value: f64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
