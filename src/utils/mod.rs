pub mod ip;
pub mod timezone;

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{CodpulseError, Result};

/// 解析日期参数，支持 RFC3339 和 YYYY-MM-DD 两种格式
pub fn parse_date_param(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

/// 严格解析日期范围，解析失败或起止颠倒时返回错误
///
/// 与静默回退不同，日期格式错误必须反馈给调用方。
pub fn parse_date_range_strict(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate)> {
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|_| {
        CodpulseError::validation(format!(
            "Invalid start date format: '{}'. Expected YYYY-MM-DD",
            start
        ))
    })?;
    let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d").map_err(|_| {
        CodpulseError::validation(format!(
            "Invalid end date format: '{}'. Expected YYYY-MM-DD",
            end
        ))
    })?;
    if start_date > end_date {
        return Err(CodpulseError::validation(
            "Start date must not be later than end date",
        ));
    }
    Ok((start_date, end_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param_formats() {
        assert!(parse_date_param("2024-12-01").is_some());
        assert!(parse_date_param("2024-12-01T10:30:00Z").is_some());
        assert!(parse_date_param("12/01/2024").is_none());
    }

    #[test]
    fn test_parse_date_range_strict() {
        let (s, e) = parse_date_range_strict("2024-12-01", "2024-12-31").unwrap();
        assert_eq!(s, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(e, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        assert!(parse_date_range_strict("2024-13-01", "2024-12-31").is_err());
        assert!(parse_date_range_strict("2024-12-31", "2024-12-01").is_err());
    }
}
