//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层和计费引擎只接收 `i64` Unix millis。

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// 解析日期字符串并转为当日零点 millis
pub fn parse_day_start(date: &str, tz: Tz) -> AppResult<i64> {
    parse_date(date).map(|d| day_start_millis(d, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2024-01-31").is_ok());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("31/01/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_day_start_millis_utc() {
        let date = parse_date("2024-01-01").unwrap();
        assert_eq!(day_start_millis(date, UTC), 1_704_067_200_000);
    }

    #[test]
    fn test_day_end_is_next_day_start() {
        let date = parse_date("2024-01-01").unwrap();
        assert_eq!(
            day_end_millis(date, UTC),
            day_start_millis(parse_date("2024-01-02").unwrap(), UTC)
        );
    }
}
