//! 时区换算工具
//!
//! 所有下游组件的日分桶都经过这里：订单和事件按卖家本地时区的
//! 日历日归组，而不是来源平台的时区。必须走 tzdb 换算——平台
//! 报表时区与卖家时区之间的实际偏移随季节变化，固定偏移会把
//! 午夜附近的订单归错日。

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{CodpulseError, Result};

/// 解析 IANA 时区名，未知名称返回 InvalidTimezone
///
/// 调用方不得在失败时静默回退到 UTC 做日分桶。
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|_| {
        CodpulseError::invalid_timezone(format!("Unknown IANA timezone name: '{}'", name))
    })
}

/// 将时刻换算为指定时区的本地挂钟时间
pub fn to_local(instant: DateTime<Utc>, tz_name: &str) -> Result<NaiveDateTime> {
    let tz = resolve_timezone(tz_name)?;
    Ok(instant.with_timezone(&tz).naive_local())
}

/// 时刻在指定时区的日历日（时分秒截断到零点）
pub fn local_day(instant: DateTime<Utc>, tz_name: &str) -> Result<NaiveDate> {
    let tz = resolve_timezone(tz_name)?;
    Ok(instant.with_timezone(&tz).date_naive())
}

/// 两个时区在当前时刻的带符号小时差（b - a）
///
/// 仅用于诊断展示，不落库。
pub fn hour_offset_between(tz_a: &str, tz_b: &str) -> Result<i32> {
    offset_between_at(Utc::now(), tz_a, tz_b)
}

/// 两个时区在给定时刻的带符号小时差（b - a）
pub fn offset_between_at(instant: DateTime<Utc>, tz_a: &str, tz_b: &str) -> Result<i32> {
    let a = resolve_timezone(tz_a)?;
    let b = resolve_timezone(tz_b)?;

    let offset_a = a.offset_from_utc_datetime(&instant.naive_utc()).fix().local_minus_utc();
    let offset_b = b.offset_from_utc_datetime(&instant.naive_utc()).fix().local_minus_utc();

    Ok((offset_b - offset_a) / 3600)
}

/// 判断时区当前是否处于夏令时
///
/// 比较当前 UTC 偏移与当年 1 月 15 日的偏移：北半球冬季偏移即
/// 标准偏移，当前偏移更大说明在观察 DST。对南半球参考账户是
/// 尽力而为的近似。
pub fn is_observing_dst(tz_name: &str) -> Result<bool> {
    let tz = resolve_timezone(tz_name)?;
    let now = Utc::now();

    let january = Utc
        .with_ymd_and_hms(now.year(), 1, 15, 12, 0, 0)
        .single()
        .unwrap_or(now);

    let current = tz.offset_from_utc_datetime(&now.naive_utc()).fix().local_minus_utc();
    let winter = tz
        .offset_from_utc_datetime(&january.naive_utc())
        .fix()
        .local_minus_utc();

    Ok(current > winter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_timezone_rejects_unknown() {
        assert!(resolve_timezone("America/Los_Angeles").is_ok());
        assert!(resolve_timezone("Not/AZone").is_err());
        assert!(resolve_timezone("").is_err());

        let err = resolve_timezone("Mars/Olympus").unwrap_err();
        assert!(matches!(err, CodpulseError::InvalidTimezone(_)));
    }

    #[test]
    fn test_local_day_crosses_midnight() {
        // 23:30（UTC-8 平台时区）= 次日 07:30 UTC = 次日巴格达时间
        let instant = Utc.with_ymd_and_hms(2024, 12, 2, 7, 30, 0).unwrap();

        let platform_day = local_day(instant, "America/Los_Angeles").unwrap();
        let seller_day = local_day(instant, "Asia/Baghdad").unwrap();

        assert_eq!(platform_day, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(seller_day, NaiveDate::from_ymd_opt(2024, 12, 2).unwrap());
    }

    #[test]
    fn test_to_local_wall_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        // 巴格达无夏令时，全年 UTC+3
        let local = to_local(instant, "Asia/Baghdad").unwrap();
        assert_eq!(local.format("%H:%M").to_string(), "15:00");
    }

    #[test]
    fn test_offset_between_fixed_zones() {
        // 两个都无 DST 的时区，任何时刻偏移恒定
        let summer = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(offset_between_at(summer, "UTC", "Asia/Baghdad").unwrap(), 3);
        assert_eq!(offset_between_at(winter, "UTC", "Asia/Baghdad").unwrap(), 3);
    }

    #[test]
    fn test_offset_between_varies_with_dst() {
        let summer = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        // 洛杉矶夏季 UTC-7，冬季 UTC-8
        assert_eq!(
            offset_between_at(summer, "America/Los_Angeles", "Asia/Baghdad").unwrap(),
            10
        );
        assert_eq!(
            offset_between_at(winter, "America/Los_Angeles", "Asia/Baghdad").unwrap(),
            11
        );
    }

    #[test]
    fn test_is_observing_dst_fixed_zone() {
        // 无 DST 的时区永远返回 false
        assert!(!is_observing_dst("Asia/Baghdad").unwrap());
        assert!(!is_observing_dst("UTC").unwrap());
    }
}
