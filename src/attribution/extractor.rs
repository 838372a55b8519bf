//! 营销归因提取
//!
//! 从订单的落地页 URL 和 note_attributes 键值对中提取 UTM 参数
//! 与平台点击 ID。note 字段由结账时的归因脚本写入，比会话开始时
//! 记录的落地 URL 更可靠，逐键覆盖 URL 解析出的值。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// 单个订单/事件的归因记录，所有字段可空
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub fbclid: Option<String>,
    pub gclid: Option<String>,
    pub ttclid: Option<String>,
}

const TRACKED_KEYS: [&str; 8] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "fbclid",
    "gclid",
    "ttclid",
];

impl Attribution {
    /// 所有字段均为空
    pub fn is_empty(&self) -> bool {
        self.utm_source.is_none()
            && self.utm_medium.is_none()
            && self.utm_campaign.is_none()
            && self.utm_content.is_none()
            && self.utm_term.is_none()
            && self.fbclid.is_none()
            && self.gclid.is_none()
            && self.ttclid.is_none()
    }

    fn from_map(map: HashMap<String, String>) -> Self {
        let mut map = map;
        Self {
            utm_source: map.remove("utm_source"),
            utm_medium: map.remove("utm_medium"),
            utm_campaign: map.remove("utm_campaign"),
            utm_content: map.remove("utm_content"),
            utm_term: map.remove("utm_term"),
            fbclid: map.remove("fbclid"),
            gclid: map.remove("gclid"),
            ttclid: map.remove("ttclid"),
        }
    }
}

/// 从落地页 URL 和 note 键值对提取归因
///
/// 合并规则：先算 URL 图，再算 note 图，note 逐键覆盖 URL——
/// 只出现在 URL 里的键必须保留。
pub fn extract(landing_url: Option<&str>, notes: Option<&[(String, String)]>) -> Attribution {
    let mut merged = extract_from_url(landing_url);

    if let Some(notes) = notes {
        for (key, value) in notes {
            let key = key.trim().to_lowercase();
            if TRACKED_KEYS.contains(&key.as_str()) && !value.is_empty() {
                merged.insert(key, value.clone());
            }
        }
    }

    Attribution::from_map(merged)
}

/// 从 URL query 提取归因键值
///
/// 非法或相对 URL 不报错：有 query 片段就按原始 query 解析，
/// 否则降级为空图。
fn extract_from_url(landing_url: Option<&str>) -> HashMap<String, String> {
    let Some(raw) = landing_url else {
        return HashMap::new();
    };

    let query = match Url::parse(raw) {
        Ok(url) => url.query().map(String::from),
        // Shopify 的 landing_site 常是相对路径（"/collections/all?utm_source=…"）
        Err(_) => raw.split_once('?').map(|(_, q)| q.to_string()),
    };

    let Some(query) = query else {
        return HashMap::new();
    };

    let mut map = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let key = key.to_lowercase();
        if TRACKED_KEYS.contains(&key.as_str()) && !value.is_empty() {
            map.insert(key, value.into_owned());
        }
    }
    map
}
