//! 店铺平台订单的原始表示
//!
//! Admin REST API 的金额都是十进制字符串，数值化在这一层完成，
//! 下游只见 f64。

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::attribution::{self, Channel};
use crate::errors::{CodpulseError, Result};
use crate::storage::models::ProcessedOrderRecord;
use crate::utils::timezone;

/// 平台原生订单（只反序列化核心需要的字段，其余忽略）
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrder {
    pub id: i64,
    /// 面向买家的订单号（如 "#1001"）
    pub name: Option<String>,
    pub created_at: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub currency: Option<String>,
    pub total_price: Option<String>,
    pub subtotal_price: Option<String>,
    pub total_discounts: Option<String>,
    pub landing_site: Option<String>,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
    #[serde(default)]
    pub discount_codes: Vec<DiscountCode>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    /// 归因脚本偶尔写入非字符串值
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountCode {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    pub title: Option<String>,
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: i32,
}

/// 金额字符串转数值，缺失或畸形按 0 处理
fn parse_money(value: Option<&str>) -> f64 {
    value.and_then(|s| s.parse::<f64>().ok()).unwrap_or(0.0)
}

impl RawOrder {
    /// 转为存储就绪形态
    ///
    /// 日分桶按卖家时区计算；时区名非法或时间戳无法解析时该单
    /// 处理失败（由批次层计数，不中断其余订单）。
    pub fn process(&self, workspace_id: &str, seller_timezone: &str) -> Result<ProcessedOrderRecord> {
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| {
                CodpulseError::date_parse(format!(
                    "Order {} has unparseable created_at '{}': {}",
                    self.id, self.created_at, e
                ))
            })?
            .with_timezone(&Utc);

        let local_day = timezone::local_day(created_at, seller_timezone)?;

        let notes: Vec<(String, String)> = self
            .note_attributes
            .iter()
            .map(|attr| (attr.name.clone(), note_value_to_string(&attr.value)))
            .collect();

        let attribution = attribution::extract(self.landing_site.as_deref(), Some(&notes));
        let channel = Channel::classify(&attribution);

        let product_names = join_nonempty(self.line_items.iter().filter_map(|i| i.title.as_deref()));
        let skus = join_nonempty(self.line_items.iter().filter_map(|i| i.sku.as_deref()));
        let total_items: i32 = self.line_items.iter().map(|i| i.quantity).sum();

        let discount_codes = join_nonempty(self.discount_codes.iter().map(|d| d.code.as_str()));

        Ok(ProcessedOrderRecord {
            workspace_id: workspace_id.to_string(),
            external_id: self.id.to_string(),
            order_number: self.name.clone(),
            created_at_utc: created_at,
            local_day,
            financial_status: self.financial_status.clone(),
            fulfillment_status: self.fulfillment_status.clone(),
            currency: self.currency.clone().unwrap_or_else(|| "USD".to_string()),
            total_price: parse_money(self.total_price.as_deref()),
            subtotal_price: parse_money(self.subtotal_price.as_deref()),
            total_discounts: parse_money(self.total_discounts.as_deref()),
            total_items,
            product_names,
            skus,
            discount_codes,
            landing_site: self.landing_site.clone(),
            attribution,
            channel,
        })
    }
}

fn note_value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn join_nonempty<'a>(items: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined: Vec<&str> = items.filter(|s| !s.is_empty()).collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_order() -> RawOrder {
        serde_json::from_value(serde_json::json!({
            "id": 450789469,
            "name": "#1001",
            "created_at": "2024-12-01T23:30:00-08:00",
            "financial_status": "pending",
            "fulfillment_status": null,
            "currency": "USD",
            "total_price": "200.00",
            "subtotal_price": "210.00",
            "total_discounts": "10.00",
            "landing_site": "/?utm_source=facebook&utm_campaign=BlackFriday",
            "note_attributes": [
                {"name": "fbclid", "value": "IwAR456"}
            ],
            "discount_codes": [{"code": "WELCOME10"}],
            "line_items": [
                {"title": "Leather Wallet", "sku": "LW-01", "quantity": 2},
                {"title": "Belt", "sku": "BT-03", "quantity": 1}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_process_extracts_totals_and_items() {
        let record = sample_order().process("W1", "Asia/Baghdad").unwrap();
        assert_eq!(record.external_id, "450789469");
        assert_eq!(record.total_price, 200.0);
        assert_eq!(record.subtotal_price, 210.0);
        assert_eq!(record.total_discounts, 10.0);
        assert_eq!(record.total_items, 3);
        assert_eq!(record.product_names.as_deref(), Some("Leather Wallet, Belt"));
        assert_eq!(record.skus.as_deref(), Some("LW-01, BT-03"));
        assert_eq!(record.discount_codes.as_deref(), Some("WELCOME10"));
    }

    #[test]
    fn test_process_buckets_by_seller_timezone() {
        // 23:30 UTC-8 = 07:30 UTC 次日 = 10:30 巴格达次日
        let record = sample_order().process("W1", "Asia/Baghdad").unwrap();
        assert_eq!(record.local_day, NaiveDate::from_ymd_opt(2024, 12, 2).unwrap());
    }

    #[test]
    fn test_process_merges_note_attribution() {
        let record = sample_order().process("W1", "Asia/Baghdad").unwrap();
        assert_eq!(record.attribution.utm_source.as_deref(), Some("facebook"));
        assert_eq!(record.attribution.utm_campaign.as_deref(), Some("BlackFriday"));
        assert_eq!(record.attribution.fbclid.as_deref(), Some("IwAR456"));
        assert_eq!(record.channel, Channel::Facebook);
    }

    #[test]
    fn test_process_rejects_bad_timestamp() {
        let mut order = sample_order();
        order.created_at = "yesterday".to_string();
        assert!(order.process("W1", "Asia/Baghdad").is_err());
    }

    #[test]
    fn test_process_rejects_bad_timezone() {
        let err = sample_order().process("W1", "Mars/Olympus").unwrap_err();
        assert!(matches!(err, CodpulseError::InvalidTimezone(_)));
    }

    #[test]
    fn test_parse_money_degrades_to_zero() {
        assert_eq!(parse_money(Some("12.50")), 12.5);
        assert_eq!(parse_money(Some("not-a-number")), 0.0);
        assert_eq!(parse_money(None), 0.0);
    }
}
