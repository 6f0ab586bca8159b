//! Calendar-month arithmetic over Unix-millis timestamps
//!
//! Policy: adding N months clamps the day to the last valid day of the
//! target month (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year).
//! The time-of-day component is preserved. All arithmetic is done in UTC.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use shared::error::{AppError, AppResult, ErrorCode};

const MS_PER_DAY: i64 = 86_400_000;

/// Last valid day of a month (handles leap years)
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Add N calendar months to a millis timestamp, clamping the day
pub fn add_months_ms(ts: i64, months: u32) -> i64 {
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(ts) else {
        return ts;
    };
    let total = dt.year() * 12 + dt.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = dt.day().min(last_day_of_month(year, month));

    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return ts;
    };
    date.and_time(dt.time()).and_utc().timestamp_millis()
}

/// Millis of the first instant of a month (UTC)
pub fn month_start_ms(year: i32, month: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// (year, month) of a millis timestamp (UTC)
pub fn month_of_ms(ts: i64) -> (i32, u32) {
    let dt = DateTime::<Utc>::from_timestamp_millis(ts).unwrap_or_default();
    (dt.year(), dt.month())
}

/// Parse a payment-month label: "March 2024" or "2024-03"
pub fn parse_month_label(label: &str) -> AppResult<(i32, u32)> {
    let trimmed = label.trim();
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", trimmed), "%d %B %Y") {
        return Ok((date.year(), date.month()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d") {
        return Ok((date.year(), date.month()));
    }
    Err(AppError::with_message(
        ErrorCode::InvalidFormat,
        format!("Invalid payment month '{}' (expected e.g. \"March 2024\")", label),
    ))
}

/// Days → millis
pub fn days_to_ms(days: i64) -> i64 {
    days * MS_PER_DAY
}

/// Floor a timestamp to the start of its UTC day
pub fn day_floor_ms(ts: i64) -> i64 {
    ts - ts.rem_euclid(MS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(y: i32, m: u32, d: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_add_months_plain() {
        assert_eq!(add_months_ms(ms(2024, 1, 1), 1), ms(2024, 2, 1));
        assert_eq!(add_months_ms(ms(2024, 1, 15), 3), ms(2024, 4, 15));
        assert_eq!(add_months_ms(ms(2024, 3, 1), 12), ms(2025, 3, 1));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        // Pinned policy: Jan 31 + 1 month = last valid day of February
        assert_eq!(add_months_ms(ms(2024, 1, 31), 1), ms(2024, 2, 29)); // leap year
        assert_eq!(add_months_ms(ms(2025, 1, 31), 1), ms(2025, 2, 28));
        assert_eq!(add_months_ms(ms(2024, 10, 31), 1), ms(2024, 11, 30));
    }

    #[test]
    fn test_add_months_year_rollover() {
        assert_eq!(add_months_ms(ms(2024, 11, 15), 3), ms(2025, 2, 15));
        assert_eq!(add_months_ms(ms(2024, 12, 31), 6), ms(2025, 6, 30));
    }

    #[test]
    fn test_add_months_preserves_time_of_day() {
        let ts = ms(2024, 1, 10) + 13 * 3_600_000 + 45 * 60_000;
        let shifted = add_months_ms(ts, 1);
        assert_eq!(shifted, ms(2024, 2, 10) + 13 * 3_600_000 + 45 * 60_000);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2025, 2), 28);
        assert_eq!(last_day_of_month(2024, 12), 31);
        assert_eq!(last_day_of_month(2024, 4), 30);
    }

    #[test]
    fn test_month_start_and_of() {
        let start = month_start_ms(2024, 3);
        assert_eq!(start, ms(2024, 3, 1));
        assert_eq!(month_of_ms(start), (2024, 3));
        assert_eq!(month_of_ms(ms(2024, 3, 31)), (2024, 3));
    }

    #[test]
    fn test_parse_month_label_english() {
        assert_eq!(parse_month_label("March 2024").unwrap(), (2024, 3));
        assert_eq!(parse_month_label("January 2024").unwrap(), (2024, 1));
        assert_eq!(parse_month_label("  December 2025 ").unwrap(), (2025, 12));
    }

    #[test]
    fn test_parse_month_label_numeric() {
        assert_eq!(parse_month_label("2024-03").unwrap(), (2024, 3));
        assert_eq!(parse_month_label("2025-12").unwrap(), (2025, 12));
    }

    #[test]
    fn test_parse_month_label_invalid() {
        let err = parse_month_label("Marchtober 2024").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(parse_month_label("2024").is_err());
        assert!(parse_month_label("").is_err());
    }

    #[test]
    fn test_days_to_ms() {
        assert_eq!(days_to_ms(1), 86_400_000);
        assert_eq!(days_to_ms(7), 7 * 86_400_000);
    }

    #[test]
    fn test_day_floor() {
        let noon = ms(2024, 3, 15) + 12 * 3_600_000;
        assert_eq!(day_floor_ms(noon), ms(2024, 3, 15));
        assert_eq!(day_floor_ms(ms(2024, 3, 15)), ms(2024, 3, 15));
    }
}
