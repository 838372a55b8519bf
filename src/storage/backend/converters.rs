//! 领域模型与实体的互转

use sea_orm::ActiveValue::Set;
use std::str::FromStr;
use tracing::warn;

use migration::entities::{
    daily_ad_spend, daily_metrics, daily_sales, pixel, processed_order, tracking_event,
    webhook_config,
};

use crate::storage::models::{
    DailyAdSpendRow, DailyMetricsRecord, DailySalesRollup, PixelPlatform, PixelRecord,
    ProcessedOrderRecord, TrackingEventRecord, WebhookEndpoint,
};

pub fn tracking_event_to_active_model(record: &TrackingEventRecord) -> tracking_event::ActiveModel {
    tracking_event::ActiveModel {
        id: Set(record.id.clone()),
        workspace_id: Set(record.workspace_id.clone()),
        visitor_id: Set(record.visitor_id.clone()),
        session_id: Set(record.session_id.clone()),
        event_name: Set(record.event_name.clone()),
        payload: Set(record.payload.as_ref().map(|v| v.to_string())),
        utm_source: Set(record.attribution.utm_source.clone()),
        utm_medium: Set(record.attribution.utm_medium.clone()),
        utm_campaign: Set(record.attribution.utm_campaign.clone()),
        utm_content: Set(record.attribution.utm_content.clone()),
        utm_term: Set(record.attribution.utm_term.clone()),
        fbclid: Set(record.attribution.fbclid.clone()),
        gclid: Set(record.attribution.gclid.clone()),
        ttclid: Set(record.attribution.ttclid.clone()),
        page_url: Set(record.page_url.clone()),
        page_title: Set(record.page_title.clone()),
        referrer: Set(record.referrer.clone()),
        ip_address: Set(record.ip_address.clone()),
        user_agent: Set(record.user_agent.clone()),
        order_id: Set(record.order_id.clone()),
        order_value: Set(record.order_value),
        created_at: Set(record.created_at),
    }
}

pub fn processed_order_to_active_model(
    record: &ProcessedOrderRecord,
    synced_at: chrono::DateTime<chrono::Utc>,
) -> processed_order::ActiveModel {
    processed_order::ActiveModel {
        workspace_id: Set(record.workspace_id.clone()),
        external_id: Set(record.external_id.clone()),
        order_number: Set(record.order_number.clone()),
        created_at_utc: Set(record.created_at_utc),
        local_day: Set(record.local_day),
        financial_status: Set(record.financial_status.clone()),
        fulfillment_status: Set(record.fulfillment_status.clone()),
        currency: Set(record.currency.clone()),
        total_price: Set(record.total_price),
        subtotal_price: Set(record.subtotal_price),
        total_discounts: Set(record.total_discounts),
        total_items: Set(record.total_items),
        product_names: Set(record.product_names.clone()),
        skus: Set(record.skus.clone()),
        discount_codes: Set(record.discount_codes.clone()),
        landing_site: Set(record.landing_site.clone()),
        utm_source: Set(record.attribution.utm_source.clone()),
        utm_medium: Set(record.attribution.utm_medium.clone()),
        utm_campaign: Set(record.attribution.utm_campaign.clone()),
        utm_content: Set(record.attribution.utm_content.clone()),
        utm_term: Set(record.attribution.utm_term.clone()),
        fbclid: Set(record.attribution.fbclid.clone()),
        gclid: Set(record.attribution.gclid.clone()),
        ttclid: Set(record.attribution.ttclid.clone()),
        channel: Set(record.channel.as_ref().to_string()),
        synced_at: Set(synced_at),
        ..Default::default()
    }
}

pub fn daily_sales_to_active_model(
    rollup: &DailySalesRollup,
    updated_at: chrono::DateTime<chrono::Utc>,
) -> daily_sales::ActiveModel {
    daily_sales::ActiveModel {
        workspace_id: Set(rollup.workspace_id.clone()),
        date: Set(rollup.date),
        source: Set(rollup.source.clone()),
        orders_count: Set(rollup.orders_count),
        gross_revenue: Set(rollup.gross_revenue),
        total_discounts: Set(rollup.total_discounts),
        net_revenue: Set(rollup.net_revenue),
        avg_order_value: Set(rollup.avg_order_value),
        updated_at: Set(updated_at),
        ..Default::default()
    }
}

pub fn daily_metrics_to_active_model(
    record: &DailyMetricsRecord,
    computed_at: chrono::DateTime<chrono::Utc>,
) -> daily_metrics::ActiveModel {
    daily_metrics::ActiveModel {
        workspace_id: Set(record.workspace_id.clone()),
        date: Set(record.date),
        spend_native: Set(record.spend_native),
        spend_local: Set(record.spend_local),
        conversion_rate: Set(record.conversion_rate),
        sales_count: Set(record.sales_count),
        gross_revenue: Set(record.gross_revenue),
        net_revenue: Set(record.net_revenue),
        gross_profit: Set(record.gross_profit),
        net_profit: Set(record.net_profit),
        roi: Set(record.roi),
        roas: Set(record.roas),
        cpa: Set(record.cpa),
        computed_at: Set(computed_at),
        ..Default::default()
    }
}

pub fn daily_ad_spend_to_active_model(
    row: &DailyAdSpendRow,
    updated_at: chrono::DateTime<chrono::Utc>,
) -> daily_ad_spend::ActiveModel {
    daily_ad_spend::ActiveModel {
        workspace_id: Set(row.workspace_id.clone()),
        date: Set(row.date),
        source: Set(row.source.clone()),
        spend_native: Set(row.spend_native),
        spend_local: Set(row.spend_local),
        currency: Set(row.currency.clone()),
        updated_at: Set(updated_at),
        ..Default::default()
    }
}

pub fn model_to_ad_spend_row(model: daily_ad_spend::Model) -> DailyAdSpendRow {
    DailyAdSpendRow {
        workspace_id: model.workspace_id,
        date: model.date,
        source: model.source,
        spend_native: model.spend_native,
        spend_local: model.spend_local,
        currency: model.currency,
    }
}

pub fn model_to_sales_rollup(model: daily_sales::Model) -> DailySalesRollup {
    DailySalesRollup {
        workspace_id: model.workspace_id,
        date: model.date,
        source: model.source,
        orders_count: model.orders_count,
        gross_revenue: model.gross_revenue,
        total_discounts: model.total_discounts,
        net_revenue: model.net_revenue,
        avg_order_value: model.avg_order_value,
    }
}

/// webhook_config 行转运行时视图
///
/// events 列是 JSON 数组文本；解析失败按空订阅处理并告警，
/// 不让一行脏数据阻断整个工作区的扇出。
pub fn model_to_webhook_endpoint(model: webhook_config::Model) -> WebhookEndpoint {
    let events: Vec<String> = serde_json::from_str(&model.events).unwrap_or_else(|e| {
        warn!(
            "Webhook {} has malformed events list '{}': {}",
            model.id, model.events, e
        );
        Vec::new()
    });

    WebhookEndpoint {
        id: model.id,
        workspace_id: model.workspace_id,
        url: model.url,
        secret: model.secret,
        events,
        is_active: model.is_active,
        failure_count: model.failure_count,
    }
}

/// pixel 行转运行时视图；未知平台跳过并告警
pub fn model_to_pixel_record(model: pixel::Model) -> Option<PixelRecord> {
    let platform = match PixelPlatform::from_str(&model.platform) {
        Ok(platform) => platform,
        Err(_) => {
            warn!("Pixel {} has unknown platform '{}'", model.id, model.platform);
            return None;
        }
    };

    Some(PixelRecord {
        id: model.id,
        workspace_id: model.workspace_id,
        platform,
        pixel_id: model.pixel_id,
        name: model.name,
        is_active: model.is_active,
    })
}
