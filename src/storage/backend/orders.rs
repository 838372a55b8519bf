//! 订单与日销售汇总的落库实现

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use migration::entities::{daily_sales, processed_order};

use super::{converters, retry, SeaOrmStorage};
use crate::errors::Result;
use crate::shopify::sync::{OrderSink, UpsertOutcome};
use crate::storage::models::{DailySalesRollup, ProcessedOrderRecord};

/// GET 同步接口的订单查询条件
#[derive(Debug, Clone, Default)]
pub struct OrderQueryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub campaign: Option<String>,
    pub limit: Option<u64>,
}

#[async_trait]
impl OrderSink for SeaOrmStorage {
    /// 按 (workspace, external_id) upsert
    ///
    /// 先查再写用于区分 Created / Updated；插入带 on_conflict 兜底，
    /// 并发同步撞上唯一索引时落为更新而不是报错。
    async fn upsert_order(&self, order: &ProcessedOrderRecord) -> Result<UpsertOutcome> {
        let db = self.get_db();
        let now = Utc::now();

        let existing = processed_order::Entity::find()
            .filter(processed_order::Column::WorkspaceId.eq(&order.workspace_id))
            .filter(processed_order::Column::ExternalId.eq(&order.external_id))
            .one(db)
            .await?;

        if let Some(existing) = existing {
            // 可变字段以最新抓取值覆盖（状态可能 pending → paid）
            let mut active: processed_order::ActiveModel = existing.into();
            active.order_number = Set(order.order_number.clone());
            active.created_at_utc = Set(order.created_at_utc);
            active.local_day = Set(order.local_day);
            active.financial_status = Set(order.financial_status.clone());
            active.fulfillment_status = Set(order.fulfillment_status.clone());
            active.currency = Set(order.currency.clone());
            active.total_price = Set(order.total_price);
            active.subtotal_price = Set(order.subtotal_price);
            active.total_discounts = Set(order.total_discounts);
            active.total_items = Set(order.total_items);
            active.product_names = Set(order.product_names.clone());
            active.skus = Set(order.skus.clone());
            active.discount_codes = Set(order.discount_codes.clone());
            active.landing_site = Set(order.landing_site.clone());
            active.utm_source = Set(order.attribution.utm_source.clone());
            active.utm_medium = Set(order.attribution.utm_medium.clone());
            active.utm_campaign = Set(order.attribution.utm_campaign.clone());
            active.utm_content = Set(order.attribution.utm_content.clone());
            active.utm_term = Set(order.attribution.utm_term.clone());
            active.fbclid = Set(order.attribution.fbclid.clone());
            active.gclid = Set(order.attribution.gclid.clone());
            active.ttclid = Set(order.attribution.ttclid.clone());
            active.channel = Set(order.channel.as_ref().to_string());
            active.synced_at = Set(now);

            retry::with_retry("update_order", self.retry_config(), || async {
                processed_order::Entity::update(active.clone()).exec(db).await
            })
            .await?;

            debug!("Order {} updated", order.external_id);
            return Ok(UpsertOutcome::Updated);
        }

        let model = converters::processed_order_to_active_model(order, now);
        let conflict = OnConflict::columns([
            processed_order::Column::WorkspaceId,
            processed_order::Column::ExternalId,
        ])
        .update_columns([
            processed_order::Column::OrderNumber,
            processed_order::Column::FinancialStatus,
            processed_order::Column::FulfillmentStatus,
            processed_order::Column::Currency,
            processed_order::Column::TotalPrice,
            processed_order::Column::SubtotalPrice,
            processed_order::Column::TotalDiscounts,
            processed_order::Column::TotalItems,
            processed_order::Column::ProductNames,
            processed_order::Column::Skus,
            processed_order::Column::DiscountCodes,
            processed_order::Column::LandingSite,
            processed_order::Column::UtmSource,
            processed_order::Column::UtmMedium,
            processed_order::Column::UtmCampaign,
            processed_order::Column::UtmContent,
            processed_order::Column::UtmTerm,
            processed_order::Column::Fbclid,
            processed_order::Column::Gclid,
            processed_order::Column::Ttclid,
            processed_order::Column::Channel,
            processed_order::Column::SyncedAt,
        ])
        .to_owned();

        retry::with_retry("insert_order", self.retry_config(), || async {
            processed_order::Entity::insert(model.clone())
                .on_conflict(conflict.clone())
                .exec(db)
                .await
        })
        .await?;

        debug!("Order {} created", order.external_id);
        Ok(UpsertOutcome::Created)
    }

    /// 按 (workspace, date, source) upsert 日销售汇总
    async fn upsert_daily_sales(&self, rollup: &DailySalesRollup) -> Result<()> {
        let db = self.get_db();
        let model = converters::daily_sales_to_active_model(rollup, Utc::now());

        let conflict = OnConflict::columns([
            daily_sales::Column::WorkspaceId,
            daily_sales::Column::Date,
            daily_sales::Column::Source,
        ])
        .update_columns([
            daily_sales::Column::OrdersCount,
            daily_sales::Column::GrossRevenue,
            daily_sales::Column::TotalDiscounts,
            daily_sales::Column::NetRevenue,
            daily_sales::Column::AvgOrderValue,
            daily_sales::Column::UpdatedAt,
        ])
        .to_owned();

        retry::with_retry("upsert_daily_sales", self.retry_config(), || async {
            daily_sales::Entity::insert(model.clone())
                .on_conflict(conflict.clone())
                .exec(db)
                .await
        })
        .await?;

        debug!(
            "Daily sales rollup upserted: {} / {} / {}",
            rollup.workspace_id, rollup.date, rollup.source
        );
        Ok(())
    }
}

impl SeaOrmStorage {
    /// 查询已落库订单（GET 同步接口）
    pub async fn find_orders(
        &self,
        workspace_id: &str,
        filter: &OrderQueryFilter,
    ) -> Result<Vec<processed_order::Model>> {
        let db = self.get_db();

        let mut query = processed_order::Entity::find()
            .filter(processed_order::Column::WorkspaceId.eq(workspace_id));

        if let Some(start) = filter.start_date {
            query = query.filter(processed_order::Column::LocalDay.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(processed_order::Column::LocalDay.lte(end));
        }
        if let Some(ref campaign) = filter.campaign {
            query = query.filter(processed_order::Column::UtmCampaign.eq(campaign));
        }

        let limit = filter.limit.unwrap_or(100).clamp(1, 500);
        let models = query
            .order_by_desc(processed_order::Column::CreatedAtUtc)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models)
    }
}
