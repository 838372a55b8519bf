//! 存储层领域模型
//!
//! 实体（migration::entities）是表的镜像；这里是业务代码实际
//! 传递的形态，转换在 backend::converters 完成。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::attribution::{Attribution, Channel};
use crate::errors::{CodpulseError, Result};

/// 追踪事件（写入后不可变）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEventRecord {
    pub id: String,
    pub workspace_id: Option<String>,
    pub visitor_id: String,
    pub session_id: Option<String>,
    pub event_name: String,
    /// 模式开放的原始负载
    pub payload: Option<serde_json::Value>,
    pub attribution: Attribution,
    pub page_url: Option<String>,
    pub page_title: Option<String>,
    pub referrer: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub order_id: Option<String>,
    pub order_value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// 存储就绪的订单
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedOrderRecord {
    pub workspace_id: String,
    pub external_id: String,
    pub order_number: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    /// 卖家时区的日历日分桶
    pub local_day: NaiveDate,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub currency: String,
    pub total_price: f64,
    pub subtotal_price: f64,
    pub total_discounts: f64,
    pub total_items: i32,
    pub product_names: Option<String>,
    pub skus: Option<String>,
    pub discount_codes: Option<String>,
    pub landing_site: Option<String>,
    pub attribution: Attribution,
    pub channel: Channel,
}

/// 日销售汇总（(workspace, date, source) 唯一）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesRollup {
    pub workspace_id: String,
    pub date: NaiveDate,
    pub source: String,
    pub orders_count: i32,
    pub gross_revenue: f64,
    pub total_discounts: f64,
    pub net_revenue: f64,
    pub avg_order_value: f64,
}

/// 日广告花费行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAdSpendRow {
    pub workspace_id: String,
    pub date: NaiveDate,
    pub source: String,
    pub spend_native: f64,
    pub spend_local: f64,
    pub currency: Option<String>,
}

/// 日利润指标快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetricsRecord {
    pub workspace_id: String,
    pub date: NaiveDate,
    pub spend_native: f64,
    pub spend_local: f64,
    pub conversion_rate: f64,
    pub sales_count: i32,
    pub gross_revenue: f64,
    pub net_revenue: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub roi: Option<f64>,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
}

/// 工作区事件统计（GET /webhook/tracking 返回）
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkspaceEventStats {
    pub total_events: u64,
    pub events_today: u64,
    pub last_event_at: Option<DateTime<Utc>>,
}

// ============ 扇出侧模型 ============

/// Webhook 订阅端点（运行时视图）
#[derive(Debug, Clone)]
pub struct WebhookEndpoint {
    pub id: i64,
    pub workspace_id: String,
    pub url: String,
    pub secret: Option<String>,
    pub events: Vec<String>,
    pub is_active: bool,
    pub failure_count: i32,
}

impl WebhookEndpoint {
    /// 是否订阅了某事件名
    pub fn subscribes_to(&self, event_name: &str) -> bool {
        self.events.iter().any(|e| e == event_name || e == "*")
    }
}

/// 像素配置（运行时视图）
#[derive(Debug, Clone)]
pub struct PixelRecord {
    pub id: i64,
    pub workspace_id: String,
    pub platform: PixelPlatform,
    pub pixel_id: String,
    pub name: String,
    pub is_active: bool,
}

/// 广告平台枚举
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PixelPlatform {
    Facebook,
    Tiktok,
    Google,
}

impl PixelPlatform {
    /// 校验平台分配的像素 ID 格式
    ///
    /// - Facebook: 15–16 位纯数字
    /// - TikTok: `C` 前缀，总长 11–21 的字母数字
    /// - Google: `AW-` 前缀的字母数字标签
    pub fn validate_pixel_id(&self, pixel_id: &str) -> Result<()> {
        let ok = match self {
            PixelPlatform::Facebook => {
                (15..=16).contains(&pixel_id.len())
                    && pixel_id.chars().all(|c| c.is_ascii_digit())
            }
            PixelPlatform::Tiktok => {
                (11..=21).contains(&pixel_id.len())
                    && pixel_id.starts_with('C')
                    && pixel_id.chars().all(|c| c.is_ascii_alphanumeric())
            }
            PixelPlatform::Google => {
                pixel_id
                    .strip_prefix("AW-")
                    .is_some_and(|rest| {
                        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric())
                    })
            }
        };

        if ok {
            Ok(())
        } else {
            Err(CodpulseError::validation(format!(
                "Pixel id '{}' does not match the {} format",
                pixel_id,
                self.as_ref()
            )))
        }
    }
}

/// 单次投递的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
}

/// 一次 Webhook 投递尝试的完整记录（只追加）
#[derive(Debug, Clone)]
pub struct WebhookDeliveryLog {
    pub webhook_id: i64,
    pub event_type: String,
    pub payload: Option<String>,
    pub response_code: Option<i32>,
    /// 截断到配置上限
    pub response_body: Option<String>,
    pub status: DeliveryStatus,
    pub attempt_count: i32,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facebook_pixel_id_format() {
        let platform = PixelPlatform::Facebook;
        assert!(platform.validate_pixel_id("123456789012345").is_ok()); // 15 位
        assert!(platform.validate_pixel_id("1234567890123456").is_ok()); // 16 位
        assert!(platform.validate_pixel_id("12345678901234").is_err()); // 14 位
        assert!(platform.validate_pixel_id("12345678901234567").is_err()); // 17 位
        assert!(platform.validate_pixel_id("12345678901234a").is_err());
    }

    #[test]
    fn test_tiktok_pixel_id_format() {
        let platform = PixelPlatform::Tiktok;
        assert!(platform.validate_pixel_id("C4A7B2C9D1E").is_ok()); // 11 字符
        assert!(platform.validate_pixel_id("C4A7B2C9D1E8F6G3H0J5K").is_ok()); // 21 字符
        assert!(platform.validate_pixel_id("X4A7B2C9D1E").is_err()); // 前缀不对
        assert!(platform.validate_pixel_id("C4A7B2").is_err()); // 太短
        assert!(platform.validate_pixel_id("C4A7B2C9D1E8F6G3H0J5K9").is_err()); // 太长
    }

    #[test]
    fn test_google_pixel_id_format() {
        let platform = PixelPlatform::Google;
        assert!(platform.validate_pixel_id("AW-123456789").is_ok());
        assert!(platform.validate_pixel_id("AW-abc123XYZ").is_ok());
        assert!(platform.validate_pixel_id("AW-").is_err());
        assert!(platform.validate_pixel_id("GA-123456789").is_err());
    }

    #[test]
    fn test_platform_parse_case_insensitive() {
        use std::str::FromStr;
        assert_eq!(
            PixelPlatform::from_str("Facebook").unwrap(),
            PixelPlatform::Facebook
        );
        assert_eq!(
            PixelPlatform::from_str("TIKTOK").unwrap(),
            PixelPlatform::Tiktok
        );
        assert!(PixelPlatform::from_str("snapchat").is_err());
    }

    #[test]
    fn test_webhook_subscription_match() {
        let endpoint = WebhookEndpoint {
            id: 1,
            workspace_id: "W1".to_string(),
            url: "https://example.com/hook".to_string(),
            secret: None,
            events: vec!["Purchase".to_string(), "PageView".to_string()],
            is_active: true,
            failure_count: 0,
        };
        assert!(endpoint.subscribes_to("Purchase"));
        assert!(!endpoint.subscribes_to("AddToCart"));

        let wildcard = WebhookEndpoint {
            events: vec!["*".to_string()],
            ..endpoint
        };
        assert!(wildcard.subscribes_to("AddToCart"));
    }
}
