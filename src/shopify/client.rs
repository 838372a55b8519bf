//! 店铺平台 Admin REST 客户端
//!
//! 订单列表按页返回，下一页指针在响应的 Link 头里
//! （`<url>; rel="next"`），页数没有任何先验假设。
//! 分页被抽象成 OrderPageSource：抓取/解析与 upsert 解耦，
//! 游标可恢复，单元测试可以直接喂页序列。

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::models::RawOrder;
use crate::config::ShopifyConfig;
use crate::errors::{CodpulseError, Result};

/// 店铺访问凭证
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    /// 形如 my-shop.myshopify.com
    pub shop_domain: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Vec<RawOrder>,
}

/// 惰性页序列
///
/// 每次 next_page 返回一页订单；耗尽后返回 None。
/// 当前游标可随时取出，用于断点续抓。
#[async_trait]
pub trait OrderPageSource: Send {
    async fn next_page(&mut self) -> Result<Option<Vec<RawOrder>>>;

    /// 当前游标（完整的下一页 URL），起始页或耗尽后为 None
    fn cursor(&self) -> Option<&str>;
}

/// Admin REST 客户端
pub struct ShopifyClient {
    http: reqwest::Client,
    api_version: String,
    page_size: u32,
}

impl ShopifyClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CodpulseError::http_client(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_version: config.api_version.clone(),
            page_size: config.page_size,
        })
    }

    /// 构造某日期范围（闭区间）的订单页序列
    pub fn order_pages(
        &self,
        credentials: StoreCredentials,
        start_date: &str,
        end_date: &str,
    ) -> OrderPages<'_> {
        let initial_url = format!(
            "https://{}/admin/api/{}/orders.json?status=any&limit={}&created_at_min={}T00:00:00Z&created_at_max={}T23:59:59Z",
            credentials.shop_domain, self.api_version, self.page_size, start_date, end_date,
        );

        OrderPages {
            client: self,
            credentials,
            next_url: Some(initial_url),
            started: false,
        }
    }

    async fn fetch_page(
        &self,
        credentials: &StoreCredentials,
        url: &str,
    ) -> Result<(Vec<RawOrder>, Option<String>)> {
        debug!("Shopify: fetching orders page: {}", url);

        let response = self
            .http
            .get(url)
            .header("X-Shopify-Access-Token", &credentials.access_token)
            .send()
            .await
            .map_err(|e| CodpulseError::upstream_api(format!("Shopify request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Shopify: non-2xx response {}: {}", status, body);
            return Err(CodpulseError::upstream_api(format!(
                "Shopify API returned {}: {}",
                status,
                body.chars().take(256).collect::<String>()
            )));
        }

        let next_url = response
            .headers()
            .get("link")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_next_link);

        let envelope: OrdersEnvelope = response
            .json()
            .await
            .map_err(|e| CodpulseError::upstream_api(format!("Shopify response decode failed: {}", e)))?;

        Ok((envelope.orders, next_url))
    }
}

/// 具体的页迭代器实现（持有下一页 URL 作为游标）
pub struct OrderPages<'a> {
    client: &'a ShopifyClient,
    credentials: StoreCredentials,
    next_url: Option<String>,
    started: bool,
}

impl OrderPages<'_> {
    /// 从之前取出的游标恢复
    pub fn resume_from(mut self, cursor: String) -> Self {
        self.next_url = Some(cursor);
        self.started = true;
        self
    }
}

#[async_trait]
impl OrderPageSource for OrderPages<'_> {
    async fn next_page(&mut self) -> Result<Option<Vec<RawOrder>>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };
        self.started = true;

        let (orders, next) = self.client.fetch_page(&self.credentials, &url).await?;
        self.next_url = next;

        Ok(Some(orders))
    }

    fn cursor(&self) -> Option<&str> {
        if self.started {
            self.next_url.as_deref()
        } else {
            None
        }
    }
}

/// 解析 Link 头里 rel="next" 的 URL
///
/// Shopify 的 Link 头形如：
/// `<https://…/orders.json?page_info=abc>; rel="previous", <https://…?page_info=def>; rel="next"`
pub fn parse_next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let Some((target, params)) = part.trim().split_once(';') else {
            continue;
        };
        if params.contains("rel=\"next\"") {
            let url = target.trim().trim_start_matches('<').trim_end_matches('>');
            return Some(url.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_next_link_present() {
        let header = r#"<https://shop.myshopify.com/admin/api/2024-10/orders.json?page_info=prev>; rel="previous", <https://shop.myshopify.com/admin/api/2024-10/orders.json?page_info=next123>; rel="next""#;
        assert_eq!(
            parse_next_link(header).as_deref(),
            Some("https://shop.myshopify.com/admin/api/2024-10/orders.json?page_info=next123")
        );
    }

    #[test]
    fn test_parse_next_link_only_previous() {
        let header = r#"<https://shop.myshopify.com/admin/api/2024-10/orders.json?page_info=prev>; rel="previous""#;
        assert_eq!(parse_next_link(header), None);
    }

    #[test]
    fn test_parse_next_link_garbage() {
        assert_eq!(parse_next_link("not a link header"), None);
        assert_eq!(parse_next_link(""), None);
    }
}
