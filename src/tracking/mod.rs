//! 追踪事件入库前的构建与校验
//!
//! HTTP 层把原始 JSON 体和请求上下文（IP、UA）交给这里，换回一条
//! 存储就绪的 TrackingEventRecord。事件名是唯一的硬性必填字段；
//! 负载模式开放，核心只读它实际需要的字段。

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::attribution::Attribution;
use crate::errors::{CodpulseError, Result};
use crate::storage::models::TrackingEventRecord;

/// 合成访客 ID 的固定前缀，用于区分未识别流量
pub const ANON_VISITOR_PREFIX: &str = "anon_";

/// 请求上下文（由 HTTP 层提取）
#[derive(Debug, Clone, Default)]
pub struct IngestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 从入站 JSON 体构建事件记录
///
/// 事件名缺失/为空是校验错误（MISSING_EVENT），必须反馈给调用方；
/// 工作区缺失不是错误——匿名事件照常入库，只是不参与扇出。
pub fn build_event(body: &Value, context: IngestContext) -> Result<TrackingEventRecord> {
    let event_name = body
        .get("event")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CodpulseError::validation("Missing required field: event"))?;

    let workspace_id = body
        .get("workspaceId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let tracking = body.get("tracking");
    let page = body.get("page");
    let data = body.get("data");

    let visitor_id = str_field(tracking, "visitor_id")
        .unwrap_or_else(synthesize_visitor_id);
    let session_id = str_field(tracking, "session_id");

    let attribution = Attribution {
        utm_source: str_field(tracking, "utm_source"),
        utm_medium: str_field(tracking, "utm_medium"),
        utm_campaign: str_field(tracking, "utm_campaign"),
        utm_content: str_field(tracking, "utm_content"),
        utm_term: str_field(tracking, "utm_term"),
        fbclid: str_field(tracking, "fbclid"),
        gclid: str_field(tracking, "gclid"),
        ttclid: str_field(tracking, "ttclid"),
    };

    let page_url = str_field(page, "url").or_else(|| str_field(tracking, "landing_page"));
    let referrer = str_field(tracking, "referrer");

    let order_id = str_field(data, "order_id");
    let order_value = data
        .and_then(|d| d.get("value"))
        .and_then(numeric_value);

    Ok(TrackingEventRecord {
        id: Uuid::new_v4().to_string(),
        workspace_id,
        visitor_id,
        session_id,
        event_name: event_name.to_string(),
        payload: data.cloned(),
        attribution,
        page_url,
        page_title: str_field(page, "title"),
        referrer,
        ip_address: context.ip_address,
        user_agent: context.user_agent,
        order_id,
        order_value,
        created_at: Utc::now(),
    })
}

/// 合成访客 ID：固定前缀 + 毫秒时间戳 + 随机后缀
fn synthesize_visitor_id() -> String {
    use rand::RngExt;

    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    format!(
        "{}{}_{}",
        ANON_VISITOR_PREFIX,
        Utc::now().timestamp_millis(),
        suffix
    )
}

fn str_field(obj: Option<&Value>, key: &str) -> Option<String> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// 数值字段兼容字符串和数字两种写法（"100" 和 100）
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_event_minimal() {
        let body = json!({"event": "PageView"});
        let record = build_event(&body, IngestContext::default()).unwrap();

        assert_eq!(record.event_name, "PageView");
        assert!(record.workspace_id.is_none());
        assert!(record.visitor_id.starts_with(ANON_VISITOR_PREFIX));
        assert!(record.order_id.is_none());
    }

    #[test]
    fn test_build_event_missing_name_rejected() {
        for body in [json!({}), json!({"event": ""}), json!({"event": "   "})] {
            let err = build_event(&body, IngestContext::default()).unwrap_err();
            assert!(matches!(err, CodpulseError::Validation(_)));
        }
    }

    #[test]
    fn test_build_event_purchase_fields() {
        let body = json!({
            "event": "Purchase",
            "workspaceId": "W1",
            "tracking": {
                "visitor_id": "v_123",
                "session_id": "s_456",
                "utm_source": "facebook",
                "fbclid": "IwAR1",
                "landing_page": "https://shop.example.com/"
            },
            "data": {"order_id": "X1", "value": "100", "currency": "USD"},
            "page": {"url": "https://shop.example.com/checkout", "title": "Checkout"}
        });

        let record = build_event(&body, IngestContext::default()).unwrap();
        assert_eq!(record.workspace_id.as_deref(), Some("W1"));
        assert_eq!(record.visitor_id, "v_123");
        assert_eq!(record.order_id.as_deref(), Some("X1"));
        assert_eq!(record.order_value, Some(100.0));
        assert_eq!(record.attribution.utm_source.as_deref(), Some("facebook"));
        // page.url 优先于 tracking.landing_page
        assert_eq!(
            record.page_url.as_deref(),
            Some("https://shop.example.com/checkout")
        );
        assert_eq!(record.page_title.as_deref(), Some("Checkout"));
    }

    #[test]
    fn test_build_event_numeric_value_variants() {
        let body = json!({"event": "Purchase", "data": {"value": 49.9}});
        let record = build_event(&body, IngestContext::default()).unwrap();
        assert_eq!(record.order_value, Some(49.9));

        let body = json!({"event": "Purchase", "data": {"value": "not-a-number"}});
        let record = build_event(&body, IngestContext::default()).unwrap();
        assert_eq!(record.order_value, None);
    }

    #[test]
    fn test_synthesized_visitor_ids_are_unique() {
        let a = synthesize_visitor_id();
        let b = synthesize_visitor_id();
        assert_ne!(a, b);
        assert!(a.starts_with(ANON_VISITOR_PREFIX));
    }

    #[test]
    fn test_context_propagates() {
        let body = json!({"event": "PageView"});
        let record = build_event(
            &body,
            IngestContext {
                ip_address: Some("203.0.113.9".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
            },
        )
        .unwrap();

        assert_eq!(record.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(record.user_agent.as_deref(), Some("Mozilla/5.0"));
    }
}
