//! 出站负载签名
//!
//! 订阅方配置了密钥时，对 JSON 序列化后的负载计算 HMAC-SHA256，
//! 十六进制编码放进 X-Webhook-Signature 头；无密钥则不带签名头。

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 签名头名称
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// 计算负载的 hex HMAC-SHA256 签名
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// 校验签名（订阅方侧的参考实现，测试里也用它对拍）
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    sign_payload(secret, body) == signature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_deterministic() {
        let a = sign_payload("whsec_123", b"{\"event\":\"Purchase\"}");
        let b = sign_payload("whsec_123", b"{\"event\":\"Purchase\"}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA-256 hex
    }

    #[test]
    fn test_sign_depends_on_secret_and_body() {
        let base = sign_payload("secret_a", b"payload");
        assert_ne!(base, sign_payload("secret_b", b"payload"));
        assert_ne!(base, sign_payload("secret_a", b"payload2"));
    }

    #[test]
    fn test_verify_roundtrip() {
        let body = b"{\"event\":\"PageView\",\"value\":1}";
        let signature = sign_payload("s3cret", body);
        assert!(verify_signature("s3cret", body, &signature));
        assert!(!verify_signature("s3cret", b"tampered", &signature));
        assert!(!verify_signature("wrong", body, &signature));
    }
}
