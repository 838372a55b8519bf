//! 日利润指标端点
//!
//! GET 查询区间行与汇总；POST 走 provided-totals 模式；
//! PUT 走 recompute 模式。两种写法都是幂等 upsert。

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use tracing::{error, info};

use super::error_response;
use crate::api::error_code::ApiErrorCode;
use crate::api::types::{MetricsPostBody, MetricsPutBody, MetricsQuery, MetricsSummary};
use crate::metrics::MetricsAggregator;
use crate::storage::SeaOrmStorage;
use crate::utils::parse_date_range_strict;

pub struct MetricsService {}

fn parse_required_date(date: Option<&str>) -> Result<NaiveDate, HttpResponse> {
    let Some(date) = date.filter(|s| !s.is_empty()) else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            ApiErrorCode::MissingField,
            "Missing required field: date",
        ));
    };
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidDateRange,
            format!("Invalid date format: '{}'. Expected YYYY-MM-DD", date),
        )
    })
}

impl MetricsService {
    /// GET /metrics
    pub async fn get_metrics(
        query: web::Query<MetricsQuery>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let workspace_id = query.workspace_id.as_deref().unwrap_or("default");

        let mut start_date = None;
        let mut end_date = None;
        if let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref()) {
            match parse_date_range_strict(start, end) {
                Ok((s, e)) => {
                    start_date = Some(s);
                    end_date = Some(e);
                }
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        ApiErrorCode::InvalidDateRange,
                        e.message(),
                    );
                }
            }
        }

        let rows = match storage
            .find_daily_metrics(workspace_id, start_date, end_date, query.limit)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                error!("Metrics: query failed: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::ProcessingError,
                    "Failed to query metrics",
                );
            }
        };

        // 汇总块的比率从总量重算，分母为零照样给 null
        let total_spend_local: f64 = rows.iter().map(|r| r.spend_local).sum();
        let total_sales_count: i64 = rows.iter().map(|r| r.sales_count as i64).sum();
        let total_gross_revenue: f64 = rows.iter().map(|r| r.gross_revenue).sum();
        let total_net_profit: f64 = rows.iter().map(|r| r.net_profit).sum();

        let summary = MetricsSummary {
            total_spend_local,
            total_sales_count,
            total_gross_revenue,
            total_net_profit,
            roi: (total_spend_local > 0.0)
                .then(|| total_net_profit / total_spend_local * 100.0),
            roas: (total_spend_local > 0.0).then(|| total_gross_revenue / total_spend_local),
            cpa: (total_sales_count > 0).then(|| total_spend_local / total_sales_count as f64),
        };

        HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "metrics": rows,
            "summary": summary,
        }))
    }

    /// POST /metrics — provided-totals 模式
    pub async fn post_metrics(
        body: web::Json<MetricsPostBody>,
        aggregator: web::Data<Arc<MetricsAggregator>>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let date = match parse_required_date(body.date.as_deref()) {
            Ok(date) => date,
            Err(response) => return response,
        };
        let workspace_id = body.workspace_id.as_deref().unwrap_or("default");

        let record = aggregator.from_provided(workspace_id, date, body.totals.clone());

        match storage.upsert_daily_metrics(&record).await {
            Ok(()) => {
                info!("Metrics: provided totals upserted for {} / {}", workspace_id, date);
                HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "metrics": record,
                }))
            }
            Err(e) => {
                error!("Metrics: upsert failed: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::ProcessingError,
                    "Failed to save metrics",
                )
            }
        }
    }

    /// PUT /metrics — recompute 模式
    pub async fn put_metrics(
        body: web::Json<MetricsPutBody>,
        aggregator: web::Data<Arc<MetricsAggregator>>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let date = match parse_required_date(body.date.as_deref()) {
            Ok(date) => date,
            Err(response) => return response,
        };
        let workspace_id = body.workspace_id.as_deref().unwrap_or("default");

        let record = match aggregator
            .recompute(
                workspace_id,
                date,
                body.conversion_rate,
                storage.get_ref().as_ref(),
            )
            .await
        {
            Ok(record) => record,
            Err(e) => {
                error!("Metrics: recompute failed: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::ProcessingError,
                    "Failed to recompute metrics",
                );
            }
        };

        match storage.upsert_daily_metrics(&record).await {
            Ok(()) => {
                info!("Metrics: recomputed for {} / {}", workspace_id, date);
                HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "metrics": record,
                }))
            }
            Err(e) => {
                error!("Metrics: upsert failed: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::ProcessingError,
                    "Failed to save metrics",
                )
            }
        }
    }
}

/// 指标路由
pub fn metrics_routes() -> actix_web::Scope {
    web::scope("/metrics")
        .route("", web::get().to(MetricsService::get_metrics))
        .route("", web::post().to(MetricsService::post_metrics))
        .route("", web::put().to(MetricsService::put_metrics))
}
