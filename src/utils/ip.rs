//! IP 地址处理工具
//!
//! 追踪信标经过 CDN / 反向代理到达，客户端真实 IP 从转发头提取。

use actix_web::HttpRequest;

/// 从请求头提取转发的客户端 IP（X-Forwarded-For 或 X-Real-IP）
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    extract_forwarded_ip_from_headers(req.headers()).or_else(|| {
        req.connection_info().peer_addr().map(|s| {
            // peer_addr 可能带端口
            s.split(':').next().unwrap_or(s).to_string()
        })
    })
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(
    headers: &actix_web::http::header::HeaderMap,
) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            // 其次 X-Real-IP
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}
