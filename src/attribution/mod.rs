pub mod extractor;

pub use extractor::{extract, Attribution};

use serde::{Deserialize, Serialize};

/// 归因渠道分类
///
/// 同步报告的 breakdown 三桶：facebook（付费主渠道）/ organic / other。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Facebook,
    Organic,
    Other,
}

impl Channel {
    /// 从归因记录推导渠道
    ///
    /// 点击 ID 是最强信号；其次看 utm_source / utm_medium。
    pub fn classify(attribution: &Attribution) -> Self {
        if attribution.fbclid.is_some() {
            return Channel::Facebook;
        }

        let source = attribution
            .utm_source
            .as_deref()
            .unwrap_or("")
            .to_lowercase();

        const FACEBOOK_SOURCES: [&str; 5] = ["facebook", "fb", "instagram", "ig", "meta"];
        if FACEBOOK_SOURCES.contains(&source.as_str()) {
            return Channel::Facebook;
        }

        // 无任何归因信号的直接流量算自然流量
        if attribution.is_empty() || source == "organic" {
            return Channel::Organic;
        }

        Channel::Other
    }
}
