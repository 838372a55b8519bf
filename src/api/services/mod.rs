pub mod health;
pub mod metrics;
pub mod sync;
pub mod tracking;

pub use health::{health_routes, AppStartTime};
pub use metrics::metrics_routes;
pub use sync::sync_routes;
pub use tracking::tracking_routes;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;

use super::error_code::ApiErrorCode;
use super::types::ErrorBody;

/// 统一错误响应：{error, code}
pub fn error_response(status: StatusCode, code: ApiErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        error: message.into(),
        code: code.as_str().to_string(),
    })
}
