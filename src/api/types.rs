//! API 请求/响应类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::ProvidedTotals;
use crate::shopify::SyncReport;
use crate::storage::models::WorkspaceEventStats;

/// 错误响应体：{error, code}
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

// ============ 追踪端点 ============

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub success: bool,
    pub event_id: String,
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStatusQuery {
    pub workspace_id: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStatsResponse {
    pub status: &'static str,
    pub stats: StatsBody,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    pub total_events: u64,
    pub events_today: u64,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl From<WorkspaceEventStats> for StatsBody {
    fn from(stats: WorkspaceEventStats) -> Self {
        Self {
            total_events: stats.total_events,
            events_today: stats.events_today,
            last_event_at: stats.last_event_at,
        }
    }
}

/// 无 workspaceId 时返回的能力描述
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub supported_events: Vec<&'static str>,
}

impl CapabilitiesResponse {
    pub fn current() -> Self {
        Self {
            status: "ready",
            service: "codpulse-tracking",
            supported_events: vec![
                "PageView",
                "ViewContent",
                "AddToCart",
                "InitiateCheckout",
                "AddPaymentInfo",
                "Purchase",
                "Lead",
                "CompleteRegistration",
            ],
        }
    }
}

// ============ 订单同步端点 ============

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub store_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// 缺省时取 storeId
    pub workspace_id: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub data: SyncReportBody,
}

/// SyncReport 的 JSON 形态（字段名对齐 dashboard 的期望）
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SyncReportBody {
    pub total_orders: usize,
    pub total_revenue: f64,
    pub orders_created: usize,
    pub orders_updated: usize,
    pub orders_failed: usize,
    pub breakdown: BreakdownBody,
    pub sales_by_campaign: serde_json::Value,
    pub daily_summaries: serde_json::Value,
}

#[derive(Serialize, Clone, Debug)]
pub struct BreakdownBody {
    pub facebook: usize,
    pub organic: usize,
    pub other: usize,
}

impl From<&SyncReport> for SyncReportBody {
    fn from(report: &SyncReport) -> Self {
        Self {
            total_orders: report.total_orders,
            total_revenue: report.total_revenue,
            orders_created: report.orders_created,
            orders_updated: report.orders_updated,
            orders_failed: report.orders_failed,
            breakdown: BreakdownBody {
                facebook: report.breakdown.facebook,
                organic: report.breakdown.organic,
                other: report.breakdown.other,
            },
            sales_by_campaign: serde_json::to_value(&report.sales_by_campaign)
                .unwrap_or(serde_json::Value::Null),
            daily_summaries: serde_json::to_value(&report.daily_summaries)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub store_id: Option<String>,
    pub workspace_id: Option<String>,
    pub campaign: Option<String>,
    pub limit: Option<u64>,
}

// ============ 指标端点 ============

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u64>,
    pub workspace_id: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPostBody {
    pub date: Option<String>,
    pub workspace_id: Option<String>,
    #[serde(flatten)]
    pub totals: ProvidedTotals,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPutBody {
    pub date: Option<String>,
    pub workspace_id: Option<String>,
    pub conversion_rate: Option<f64>,
}

/// GET /metrics 的汇总块
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_spend_local: f64,
    pub total_sales_count: i64,
    pub total_gross_revenue: f64,
    pub total_net_profit: f64,
    pub roi: Option<f64>,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
}
