//! 订单同步端点
//!
//! POST 触发一次同步批任务（同步执行，返回完整报告）；
//! GET 查询已落库订单与聚合。

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use tracing::{error, info};

use super::error_response;
use crate::api::error_code::ApiErrorCode;
use crate::api::types::{OrdersQuery, SyncReportBody, SyncRequest, SyncResponse};
use crate::config::get_config;
use crate::errors::CodpulseError;
use crate::shopify::{OrderSynchronizer, ShopifyClient, StoreCredentials};
use crate::storage::backend::OrderQueryFilter;
use crate::storage::SeaOrmStorage;
use crate::utils::parse_date_range_strict;

pub struct SyncService {}

impl SyncService {
    /// POST /integrations/shopify/sync
    pub async fn post_sync(
        body: web::Json<SyncRequest>,
        client: web::Data<Arc<ShopifyClient>>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        // storeId / startDate / endDate 均必填
        let Some(store_id) = body.store_id.as_deref().filter(|s| !s.is_empty()) else {
            return error_response(
                StatusCode::BAD_REQUEST,
                ApiErrorCode::MissingField,
                "Missing required field: storeId",
            );
        };
        let (Some(start_date), Some(end_date)) = (body.start_date.as_deref(), body.end_date.as_deref())
        else {
            return error_response(
                StatusCode::BAD_REQUEST,
                ApiErrorCode::MissingField,
                "Missing required fields: startDate, endDate",
            );
        };

        if let Err(e) = parse_date_range_strict(start_date, end_date) {
            return error_response(StatusCode::BAD_REQUEST, ApiErrorCode::InvalidDateRange, e.message());
        }

        let config = get_config();
        let Some(access_token) = config.shopify.access_token.clone().filter(|t| !t.is_empty())
        else {
            return error_response(
                StatusCode::BAD_REQUEST,
                ApiErrorCode::NotConfigured,
                "Shopify access token is not configured",
            );
        };

        let workspace_id = body
            .workspace_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(store_id);

        let credentials = StoreCredentials {
            shop_domain: store_id.to_string(),
            access_token,
        };

        info!(
            "Sync: starting order sync for {} ({} .. {})",
            workspace_id, start_date, end_date
        );

        let synchronizer = OrderSynchronizer::new(config.shopify.seller_timezone.clone());
        let mut pages = client.order_pages(credentials, start_date, end_date);

        match synchronizer
            .sync(workspace_id, &mut pages, storage.get_ref().as_ref())
            .await
        {
            Ok(report) => HttpResponse::Ok().json(SyncResponse {
                success: true,
                message: format!(
                    "Synced {} orders ({} created, {} updated, {} failed)",
                    report.total_orders,
                    report.orders_created,
                    report.orders_updated,
                    report.orders_failed
                ),
                data: SyncReportBody::from(&report),
            }),
            Err(e @ CodpulseError::UpstreamApi(_)) => {
                error!("Sync: upstream failure: {}", e);
                error_response(StatusCode::BAD_GATEWAY, ApiErrorCode::UpstreamError, e.message())
            }
            Err(e) => {
                error!("Sync: failed: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::ProcessingError,
                    "Order sync failed",
                )
            }
        }
    }

    /// GET /integrations/shopify/sync
    pub async fn get_orders(
        query: web::Query<OrdersQuery>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let workspace_id = query
            .workspace_id
            .as_deref()
            .or(query.store_id.as_deref())
            .unwrap_or("default");

        let mut filter = OrderQueryFilter {
            campaign: query.campaign.clone(),
            limit: query.limit,
            ..Default::default()
        };

        if let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref()) {
            match parse_date_range_strict(start, end) {
                Ok((start_date, end_date)) => {
                    filter.start_date = Some(start_date);
                    filter.end_date = Some(end_date);
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

        match storage.find_orders(workspace_id, &filter).await {
            Ok(orders) => {
                let total_orders = orders.len();
                let total_revenue: f64 = orders.iter().map(|o| o.total_price).sum();

                HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "totalOrders": total_orders,
                    "totalRevenue": total_revenue,
                    "orders": orders,
                }))
            }
            Err(e) => {
                error!("Sync: order query failed: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::ProcessingError,
                    "Failed to query orders",
                )
            }
        }
    }
}

/// 同步路由
pub fn sync_routes() -> actix_web::Scope {
    web::scope("/integrations/shopify")
        .route("/sync", web::post().to(SyncService::post_sync))
        .route("/sync", web::get().to(SyncService::get_orders))
}
