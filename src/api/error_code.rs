//! API 稳定机器码
//!
//! 校验与上游错误都带机器可读代码返回，dashboard 的 toast 原样
//! 保留代码供排障。内部堆栈不外露。

/// 机器可读错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// 追踪请求缺少事件名
    MissingEvent,
    /// 请求体不是合法 JSON
    InvalidJson,
    /// 缺少必填字段
    MissingField,
    /// 日期缺失、格式错误或起止颠倒
    InvalidDateRange,
    /// 像素 ID 不符合平台格式
    InvalidPixelId,
    /// 店铺凭证未配置
    NotConfigured,
    /// 上游平台 API 失败
    UpstreamError,
    /// 其他处理失败
    ProcessingError,
}

impl ApiErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorCode::MissingEvent => "MISSING_EVENT",
            ApiErrorCode::InvalidJson => "INVALID_JSON",
            ApiErrorCode::MissingField => "MISSING_FIELD",
            ApiErrorCode::InvalidDateRange => "INVALID_DATE_RANGE",
            ApiErrorCode::InvalidPixelId => "INVALID_PIXEL_ID",
            ApiErrorCode::NotConfigured => "NOT_CONFIGURED",
            ApiErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ApiErrorCode::ProcessingError => "PROCESSING_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ApiErrorCode::MissingEvent.as_str(), "MISSING_EVENT");
        assert_eq!(ApiErrorCode::InvalidJson.as_str(), "INVALID_JSON");
        assert_eq!(ApiErrorCode::UpstreamError.as_str(), "UPSTREAM_ERROR");
    }
}
