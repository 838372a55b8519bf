//! 健康检查端点

use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::error;

use crate::storage::SeaOrmStorage;

/// 应用启动时间（用于 uptime 报告）
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    uptime_secs: i64,
    database: &'static str,
}

pub struct HealthService {}

impl HealthService {
    /// GET /health — 整体健康（含数据库探测）
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let uptime_secs = (Utc::now() - start_time.start_datetime).num_seconds();

        let db_ok = storage
            .get_db()
            .execute_unprepared("SELECT 1")
            .await
            .is_ok();

        if db_ok {
            HttpResponse::Ok().json(HealthBody {
                status: "ok",
                uptime_secs,
                database: "ok",
            })
        } else {
            error!("Health: database probe failed");
            HttpResponse::ServiceUnavailable().json(HealthBody {
                status: "degraded",
                uptime_secs,
                database: "unreachable",
            })
        }
    }

    /// GET /health/live — 进程存活
    pub async fn liveness_check() -> impl Responder {
        HttpResponse::Ok().json(serde_json::json!({"status": "alive"}))
    }

    /// GET /health/ready — 可服务（数据库可达）
    pub async fn readiness_check(storage: web::Data<Arc<SeaOrmStorage>>) -> impl Responder {
        match storage.get_db().execute_unprepared("SELECT 1").await {
            Ok(_) => HttpResponse::Ok().json(serde_json::json!({"status": "ready"})),
            Err(e) => {
                error!("Health: readiness probe failed: {}", e);
                HttpResponse::ServiceUnavailable()
                    .json(serde_json::json!({"status": "not_ready"}))
            }
        }
    }
}

/// 健康检查路由
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
}
