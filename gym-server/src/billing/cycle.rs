//! Cycle construction and lazy derivation
//!
//! Cycles are only ever created here: the first cycle is seeded lazily from
//! the member's start date, later cycles are appended contiguously (never
//! skipping a window) when time or a targeted payment month requires them.
//! Nothing advances cycles on read; overdue periods are computed on demand
//! by the summary module.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::member::{Member, PaymentCycle};

use super::calendar::{add_months_ms, month_of_ms, month_start_ms, parse_month_label};
use super::duration::months_for_label;
use super::money;
use super::summary::cycle_status;

/// Upper bound on chain extension in one operation (20 years of monthly
/// cycles); a targeted month further out is a client error, not a loop.
const MAX_CHAIN_LEN: usize = 240;

/// Which cycle "covers" a payment-month label. Deployment-level
/// configuration, injected from [`crate::core::Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthPolicy {
    /// A cycle covers month M iff M equals the cycle's start month
    CalendarMonth,
    /// A cycle covers month M iff start <= M < end (M = month start)
    #[default]
    CycleWindow,
}

impl std::str::FromStr for MonthPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calendar_month" => Ok(Self::CalendarMonth),
            "cycle_window" => Ok(Self::CycleWindow),
            other => Err(AppError::with_message(
                ErrorCode::ConfigError,
                format!(
                    "Invalid month allocation policy '{}' (expected calendar_month or cycle_window)",
                    other
                ),
            )),
        }
    }
}

/// Construct a cycle: end date = start + months (calendar arithmetic,
/// day clamped), fee snapshot taken at creation time.
pub fn build_cycle(start: i64, months: u32, fee: f64) -> PaymentCycle {
    let months = months.max(1);
    let fee = money::to_f64(money::to_decimal(fee).max(rust_decimal::Decimal::ZERO));
    PaymentCycle {
        start_date: start,
        end_date: add_months_ms(start, months),
        cycle_months: months,
        fee,
        paid_amount: 0.0,
        remaining_amount: fee,
        status: cycle_status(fee),
        payments: Vec::new(),
    }
}

/// Guarantee at least one cycle exists, seeded from the member's start date
/// (or `now` when absent), and fill in a missing end date on the last cycle.
/// Calling this twice in a row is a no-op the second time.
pub fn ensure_cycles(member: &mut Member, now: i64) {
    if member.payment_cycles.is_empty() {
        let start = if member.start_date > 0 {
            member.start_date
        } else {
            now
        };
        let months = months_for_label(&member.duration);
        member.payment_cycles.push(build_cycle(start, months, member.fee));
        return;
    }

    if let Some(last) = member.payment_cycles.last_mut()
        && last.end_date <= last.start_date
    {
        last.end_date = add_months_ms(last.start_date, last.cycle_months.max(1));
    }
}

fn covers(cycle: &PaymentCycle, year: i32, month: u32, policy: MonthPolicy) -> bool {
    match policy {
        MonthPolicy::CalendarMonth => month_of_ms(cycle.start_date) == (year, month),
        MonthPolicy::CycleWindow => {
            let m = month_start_ms(year, month);
            cycle.start_date <= m && m < cycle.end_date
        }
    }
}

/// Find or create the cycle whose window covers the given month label,
/// extending the chain forward cycle-by-cycle from the last existing cycle.
/// Returns the covering cycle's index.
///
/// Fails with `PaymentMonthOutOfRange` when the target month lies before the
/// first cycle or can never be covered under the active policy.
pub fn ensure_cycle_for_month(
    member: &mut Member,
    label: &str,
    policy: MonthPolicy,
    now: i64,
) -> AppResult<usize> {
    let (year, month) = parse_month_label(label)?;
    ensure_cycles(member, now);

    if let Some(idx) = member
        .payment_cycles
        .iter()
        .position(|c| covers(c, year, month, policy))
    {
        return Ok(idx);
    }

    // Target before the first cycle → nothing to extend backwards into
    let first = &member.payment_cycles[0];
    let before_first = match policy {
        MonthPolicy::CalendarMonth => (year, month) < month_of_ms(first.start_date),
        MonthPolicy::CycleWindow => month_start_ms(year, month) < first.start_date,
    };
    if before_first {
        return Err(AppError::with_message(
            ErrorCode::PaymentMonthOutOfRange,
            format!("Payment month '{}' is before the member's first cycle", label),
        ));
    }

    let months = months_for_label(&member.duration);
    loop {
        let last = member
            .payment_cycles
            .last()
            .ok_or_else(|| AppError::internal("cycle chain unexpectedly empty"))?;

        // The chain is contiguous; once a new cycle starts past the target
        // month without covering it, the month is unreachable (possible under
        // the calendar_month policy with multi-month cycles).
        if month_of_ms(last.start_date) > (year, month) {
            return Err(AppError::with_message(
                ErrorCode::PaymentMonthOutOfRange,
                format!(
                    "Payment month '{}' is not covered by any cycle window",
                    label
                ),
            ));
        }

        if member.payment_cycles.len() >= MAX_CHAIN_LEN {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Payment month '{}' is too far in the future", label),
            ));
        }

        let next = build_cycle(last.end_date, months, member.fee);
        member.payment_cycles.push(next);

        let idx = member.payment_cycles.len() - 1;
        if covers(&member.payment_cycles[idx], year, month, policy) {
            return Ok(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::test_support::member_fixture;
    use chrono::NaiveDate;

    fn ms(y: i32, m: u32, d: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_build_cycle() {
        let cycle = build_cycle(ms(2024, 1, 1), 1, 1000.0);
        assert_eq!(cycle.start_date, ms(2024, 1, 1));
        assert_eq!(cycle.end_date, ms(2024, 2, 1));
        assert_eq!(cycle.cycle_months, 1);
        assert_eq!(cycle.fee, 1000.0);
        assert_eq!(cycle.paid_amount, 0.0);
        assert_eq!(cycle.remaining_amount, 1000.0);
    }

    #[test]
    fn test_build_cycle_zero_fee_is_paid() {
        let cycle = build_cycle(ms(2024, 1, 1), 1, 0.0);
        assert_eq!(cycle.remaining_amount, 0.0);
        assert_eq!(cycle.status, shared::models::member::PaymentStatus::Paid);
    }

    #[test]
    fn test_ensure_cycles_seeds_first_cycle() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 15));

        assert_eq!(member.payment_cycles.len(), 1);
        assert_eq!(member.payment_cycles[0].start_date, ms(2024, 1, 1));
        assert_eq!(member.payment_cycles[0].end_date, ms(2024, 2, 1));
    }

    #[test]
    fn test_ensure_cycles_is_idempotent() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 15));
        let snapshot = serde_json::to_value(&member.payment_cycles).unwrap();

        ensure_cycles(&mut member, ms(2024, 6, 1));
        assert_eq!(serde_json::to_value(&member.payment_cycles).unwrap(), snapshot);
    }

    #[test]
    fn test_ensure_cycles_fills_missing_end_date() {
        let mut member = member_fixture(1000.0, "3 Months", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 1));
        member.payment_cycles[0].end_date = 0;

        ensure_cycles(&mut member, ms(2024, 1, 2));
        assert_eq!(member.payment_cycles[0].end_date, ms(2024, 4, 1));
    }

    #[test]
    fn test_ensure_cycle_for_month_existing_window() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 1));

        let idx = ensure_cycle_for_month(
            &mut member,
            "January 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 10),
        )
        .unwrap();
        assert_eq!(idx, 0);
        assert_eq!(member.payment_cycles.len(), 1);
    }

    #[test]
    fn test_ensure_cycle_for_month_extends_chain_without_skipping() {
        // Only cycle ends 2024-02-01; targeting March must create Feb AND Mar
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 1));

        let idx = ensure_cycle_for_month(
            &mut member,
            "March 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 10),
        )
        .unwrap();

        assert_eq!(member.payment_cycles.len(), 3);
        assert_eq!(idx, 2);
        assert_eq!(member.payment_cycles[1].start_date, ms(2024, 2, 1));
        assert_eq!(member.payment_cycles[2].start_date, ms(2024, 3, 1));
        assert_eq!(member.payment_cycles[2].end_date, ms(2024, 4, 1));
        // The skipped-over February cycle still owes its full fee
        assert_eq!(member.payment_cycles[1].remaining_amount, 1000.0);
    }

    #[test]
    fn test_ensure_cycle_for_month_before_first_cycle_fails() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 3, 1));
        ensure_cycles(&mut member, ms(2024, 3, 1));

        let err = ensure_cycle_for_month(
            &mut member,
            "January 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 3, 10),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMonthOutOfRange);
    }

    #[test]
    fn test_ensure_cycle_for_month_calendar_policy_unreachable() {
        // 3-month cycles starting January: chain starts are Jan, Apr, Jul...
        // Under calendar_month, "February" can never be a cycle's start month.
        let mut member = member_fixture(900.0, "3 Months", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 1));

        let err = ensure_cycle_for_month(
            &mut member,
            "February 2024",
            MonthPolicy::CalendarMonth,
            ms(2024, 1, 10),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMonthOutOfRange);
    }

    #[test]
    fn test_ensure_cycle_for_month_calendar_policy_start_month() {
        let mut member = member_fixture(900.0, "3 Months", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 1));

        let idx = ensure_cycle_for_month(
            &mut member,
            "April 2024",
            MonthPolicy::CalendarMonth,
            ms(2024, 1, 10),
        )
        .unwrap();
        assert_eq!(idx, 1);
        assert_eq!(member.payment_cycles[1].start_date, ms(2024, 4, 1));
    }

    #[test]
    fn test_ensure_cycle_for_month_mid_month_start_window() {
        // Cycle starting Jan 15 does not cover "January" under cycle_window
        // (the month-start instant lies before the cycle)
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 15));
        ensure_cycles(&mut member, ms(2024, 1, 15));

        let err = ensure_cycle_for_month(
            &mut member,
            "January 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 20),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMonthOutOfRange);

        // ...but it does cover February (Feb 1 falls inside [Jan 15, Feb 15))
        let idx = ensure_cycle_for_month(
            &mut member,
            "February 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 20),
        )
        .unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_new_cycles_snapshot_current_fee() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        ensure_cycles(&mut member, ms(2024, 1, 1));

        // Fee raised after the first cycle was created
        member.fee = 1200.0;
        let idx = ensure_cycle_for_month(
            &mut member,
            "February 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 10),
        )
        .unwrap();

        assert_eq!(member.payment_cycles[0].fee, 1000.0);
        assert_eq!(member.payment_cycles[idx].fee, 1200.0);
    }

    #[test]
    fn test_month_policy_from_str() {
        assert_eq!(
            "cycle_window".parse::<MonthPolicy>().unwrap(),
            MonthPolicy::CycleWindow
        );
        assert_eq!(
            "calendar_month".parse::<MonthPolicy>().unwrap(),
            MonthPolicy::CalendarMonth
        );
        assert!("fifo".parse::<MonthPolicy>().is_err());
    }
}
