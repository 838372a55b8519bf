//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    middleware::{Compress, DefaultHeaders},
    web, App, HttpServer,
};
use anyhow::Result;
use chrono::Utc;
use tracing::warn;

use crate::api::services::{
    health_routes, metrics_routes, sync_routes, tracking_routes, AppStartTime,
};
use crate::config::get_config;
use crate::dispatch::dispatcher::HttpTransport;
use crate::dispatch::{DispatchPool, EventDispatcher};
use crate::metrics::MetricsAggregator;
use crate::shopify::ShopifyClient;
use crate::storage::SeaOrmStorage;

/// Run the HTTP server
///
/// This function:
/// 1. Connects storage and runs migrations
/// 2. Starts the bounded dispatch worker pool
/// 3. Configures and starts the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    // Record application start time
    let app_start_time = AppStartTime {
        start_datetime: Utc::now(),
    };

    let config = get_config();

    let storage = Arc::new(SeaOrmStorage::init(&config).await.map_err(|e| {
        tracing::error!("Storage initialization failed: {}", e.format_colored());
        anyhow::anyhow!(e.format_simple())
    })?);
    warn!("Using storage backend: {}", storage.get_backend_name());

    // 扇出工作池：固定并发 + 有界队列 + 单次投递超时
    let transport = Arc::new(
        HttpTransport::new(Duration::from_secs(config.dispatch.delivery_timeout_secs))
            .map_err(|e| anyhow::anyhow!(e.format_simple()))?,
    );
    let dispatcher = Arc::new(EventDispatcher::new(
        Arc::clone(&storage) as Arc<dyn crate::dispatch::DispatchStore>,
        transport,
        config.shopify.seller_timezone.clone(),
        Duration::from_secs(config.dispatch.config_cache_ttl_secs),
        config.dispatch.response_body_cap,
    ));
    let dispatch_pool = DispatchPool::start(
        dispatcher,
        config.dispatch.workers,
        config.dispatch.queue_depth,
    );

    let shopify_client = Arc::new(
        ShopifyClient::new(&config.shopify).map_err(|e| anyhow::anyhow!(e.format_simple()))?,
    );
    let aggregator = Arc::new(MetricsAggregator::new(
        config.metrics.default_conversion_rate,
    ));

    let cpu_count = config.server.cpu_count.min(32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .app_data(web::Data::new(Arc::clone(&storage)))
            .app_data(web::Data::new(dispatch_pool.clone()))
            .app_data(web::Data::new(Arc::clone(&shopify_client)))
            .app_data(web::Data::new(Arc::clone(&aggregator)))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(tracking_routes())
            .service(sync_routes())
            .service(metrics_routes())
            .service(health_routes())
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(cpu_count)
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
