//! 追踪信标端点
//!
//! 落地页脚本从任意域名打进来，CORS 对所有来源开放（含 OPTIONS
//! 预检）。处理链：解析 → 校验 → 入库 → 非阻塞扇出入队 → 返回。
//! 响应只依赖入库结果，从不等待扇出。

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::{debug, error, info, warn};

use super::error_response;
use crate::api::error_code::ApiErrorCode;
use crate::api::types::{
    CapabilitiesResponse, TrackResponse, TrackingStatsResponse, TrackingStatusQuery,
};
use crate::config::get_config;
use crate::dispatch::{DispatchJob, DispatchPool};
use crate::storage::SeaOrmStorage;
use crate::tracking::{build_event, IngestContext};
use crate::utils::ip::extract_client_ip;

pub struct TrackingService {}

impl TrackingService {
    /// POST /webhook/tracking
    pub async fn post_event(
        req: HttpRequest,
        body: web::Bytes,
        storage: web::Data<Arc<SeaOrmStorage>>,
        pool: web::Data<DispatchPool>,
    ) -> impl Responder {
        // 畸形 JSON 与缺字段是两类错误，给调用方不同的机器码
        let payload: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                debug!("Tracking: invalid JSON body: {}", e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    ApiErrorCode::InvalidJson,
                    "Request body is not valid JSON",
                );
            }
        };

        let context = IngestContext {
            ip_address: extract_client_ip(&req),
            user_agent: req
                .headers()
                .get("user-agent")
                .and_then(|h| h.to_str().ok())
                .map(String::from),
        };

        let record = match build_event(&payload, context) {
            Ok(record) => record,
            Err(e) => {
                debug!("Tracking: event rejected: {}", e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    ApiErrorCode::MissingEvent,
                    e.message(),
                );
            }
        };

        if let Err(e) = storage.insert_tracking_event(&record).await {
            error!("Tracking: failed to persist event: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorCode::ProcessingError,
                "Failed to persist event",
            );
        }

        // 匿名事件不扇出；入队失败只记日志，不影响响应
        if let Some(ref workspace_id) = record.workspace_id {
            let job = DispatchJob {
                workspace_id: workspace_id.clone(),
                event_name: record.event_name.clone(),
                payload,
            };
            if let Err(e) = pool.enqueue(job) {
                warn!("Tracking: {}", e);
            }
        }

        info!(
            "Tracking: event '{}' ingested (workspace: {:?})",
            record.event_name, record.workspace_id
        );

        HttpResponse::Ok().json(TrackResponse {
            success: true,
            event_id: record.id,
            event: record.event_name,
            timestamp: record.created_at,
        })
    }

    /// GET /webhook/tracking
    ///
    /// 带 workspaceId 返回事件统计；不带时返回能力描述。
    pub async fn get_status(
        query: web::Query<TrackingStatusQuery>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let Some(ref workspace_id) = query.workspace_id else {
            return HttpResponse::Ok().json(CapabilitiesResponse::current());
        };

        let seller_timezone = get_config().shopify.seller_timezone.clone();
        match storage
            .workspace_event_stats(workspace_id, &seller_timezone)
            .await
        {
            Ok(stats) => HttpResponse::Ok().json(TrackingStatsResponse {
                status: "active",
                stats: stats.into(),
            }),
            Err(e) => {
                error!("Tracking: stats query failed for {}: {}", workspace_id, e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::ProcessingError,
                    "Failed to load tracking stats",
                )
            }
        }
    }
}

/// 追踪路由（CORS 对任意来源开放）
pub fn tracking_routes() -> impl actix_web::dev::HttpServiceFactory {
    let cors = Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .max_age(3600);

    web::scope("/webhook")
        .wrap(cors)
        .route("/tracking", web::post().to(TrackingService::post_event))
        .route("/tracking", web::get().to(TrackingService::get_status))
}
