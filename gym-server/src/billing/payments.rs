//! Recording incoming payments against the member ledger

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::member::{Actor, EntryKind, Member, PaymentEntry};

use super::allocate::{apply_to_cycles, apply_to_single_cycle};
use super::cycle::{ensure_cycle_for_month, ensure_cycles, MonthPolicy};
use super::money;
use super::summary::{refresh_reminder_state, sync_summary, total_remaining};

/// Inputs for one incoming payment
#[derive(Debug, Clone, Default)]
pub struct PaymentArgs {
    pub amount: f64,
    /// Target month label; `None` → FIFO allocation
    pub payment_month: Option<String>,
    pub payment_mode: Option<String>,
    pub note: Option<String>,
    /// Promised follow-up date (millis) for a partial payment
    pub promise_date: Option<i64>,
    /// The explicit pay endpoint demands a promise for partial payments;
    /// the enrollment path does not.
    pub require_promise_for_partial: bool,
}

/// Record a payment: allocate across cycles, append the ledger entry with a
/// post-state snapshot, and re-derive the summary and reminder flags.
///
/// The aggregate must only be persisted when this returns `Ok`; on error the
/// in-memory copy is discarded, so no partial state survives.
pub fn record_payment(
    member: &mut Member,
    args: PaymentArgs,
    policy: MonthPolicy,
    by: &Actor,
    at: i64,
) -> AppResult<()> {
    if !args.amount.is_finite() || args.amount <= 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidPaymentAmount,
            format!("Payment amount must be positive, got {}", args.amount),
        ));
    }
    // Day granularity: a promise for the payment's own day is still valid
    if let Some(promise) = args.promise_date
        && promise < super::calendar::day_floor_ms(at)
    {
        return Err(AppError::new(ErrorCode::PromiseDateInPast));
    }

    ensure_cycles(member, at);

    // Resolve the target and decide partiality before any money moves, so a
    // rejected payment leaves the cycle balances untouched
    let target_idx = match args.payment_month.as_deref() {
        Some(label) => Some(ensure_cycle_for_month(member, label, policy, at)?),
        None => None,
    };
    let scope_remaining = match target_idx {
        Some(idx) => member.payment_cycles[idx].remaining_amount,
        None => total_remaining(member),
    };
    let partial = money::to_decimal(scope_remaining) - money::to_decimal(args.amount)
        >= money::MONEY_TOLERANCE;

    if partial && args.require_promise_for_partial && args.promise_date.is_none() {
        return Err(AppError::new(ErrorCode::PromiseDateRequired));
    }

    let note = args.note.as_deref();
    let outcome = match target_idx {
        Some(idx) => {
            apply_to_single_cycle(member, idx, args.amount, EntryKind::Payment, by, note, at)
        }
        None => apply_to_cycles(member, args.amount, EntryKind::Payment, by, note, at),
    };

    let unapplied = money::sub_floor0(args.amount, outcome.applied);

    sync_summary(member);

    member.payment_history.push(PaymentEntry {
        amount: args.amount,
        unapplied_amount: unapplied,
        kind: EntryKind::Payment,
        fee: member.fee,
        paid_amount: member.paid_amount,
        remaining_amount: member.remaining_amount,
        payment_status: member.payment_status,
        by: by.clone(),
        at,
        note: args.note,
        payment_month: args.payment_month,
        payment_mode: args.payment_mode,
        promise_date: if partial { args.promise_date } else { None },
        allocations: outcome.allocations,
    });

    refresh_reminder_state(member);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::test_support::{member_fixture, ms};
    use shared::models::member::{PaymentStatus, ReminderStatus};

    fn pay(amount: f64) -> PaymentArgs {
        PaymentArgs {
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_payment_settles_cycle_and_member() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();

        record_payment(
            &mut member,
            pay(1000.0),
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap();

        assert_eq!(member.payment_cycles.len(), 1);
        assert_eq!(member.paid_amount, 1000.0);
        assert_eq!(member.remaining_amount, 0.0);
        assert_eq!(member.payment_status, PaymentStatus::Paid);
        assert_eq!(member.payment_history.len(), 1);
        assert_eq!(member.payment_history[0].allocations.len(), 1);
        assert_eq!(member.payment_history[0].unapplied_amount, 0.0);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();

        for bad in [0.0, -50.0, f64::NAN, f64::INFINITY] {
            let err = record_payment(
                &mut member,
                pay(bad),
                MonthPolicy::CycleWindow,
                &actor,
                ms(2024, 1, 2),
            )
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidPaymentAmount);
        }
        assert!(member.payment_history.is_empty());
    }

    #[test]
    fn test_partial_payment_requires_promise_on_pay_flow() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();

        let err = record_payment(
            &mut member,
            PaymentArgs {
                amount: 300.0,
                require_promise_for_partial: true,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PromiseDateRequired);
        // rejected before any money moved
        assert_eq!(member.payment_cycles[0].paid_amount, 0.0);
        assert!(member.payment_history.is_empty());
    }

    #[test]
    fn test_partial_payment_with_promise_marks_promised() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();
        let at = ms(2024, 1, 2);

        record_payment(
            &mut member,
            PaymentArgs {
                amount: 300.0,
                promise_date: Some(ms(2024, 1, 20)),
                require_promise_for_partial: true,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            at,
        )
        .unwrap();

        assert_eq!(member.reminder_status, ReminderStatus::Promised);
        assert_eq!(member.promised_payment_date, Some(ms(2024, 1, 20)));
        assert_eq!(member.remaining_amount, 700.0);
    }

    #[test]
    fn test_promise_date_before_payment_rejected() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();

        let err = record_payment(
            &mut member,
            PaymentArgs {
                amount: 300.0,
                promise_date: Some(ms(2023, 12, 1)),
                require_promise_for_partial: true,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PromiseDateInPast);
    }

    #[test]
    fn test_targeted_month_funds_future_cycle_only() {
        // Scenario C: only cycle ends 2024-02-01; paying "March 2024" extends
        // the chain and funds March, leaving February fully owed
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();

        record_payment(
            &mut member,
            PaymentArgs {
                amount: 1000.0,
                payment_month: Some("March 2024".to_string()),
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 10),
        )
        .unwrap();

        assert_eq!(member.payment_cycles.len(), 3);
        assert_eq!(member.payment_cycles[2].remaining_amount, 0.0);
        assert_eq!(member.payment_cycles[1].remaining_amount, 1000.0);
        assert_eq!(member.remaining_amount, 2000.0);
        assert_eq!(
            member.payment_history[0].payment_month.as_deref(),
            Some("March 2024")
        );
    }

    #[test]
    fn test_overpayment_recorded_as_unapplied() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();

        record_payment(
            &mut member,
            pay(1500.0),
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap();

        let entry = &member.payment_history[0];
        assert_eq!(entry.amount, 1500.0);
        assert_eq!(entry.unapplied_amount, 500.0);
        assert_eq!(member.remaining_amount, 0.0);
    }

    #[test]
    fn test_full_payment_ignores_promise_date() {
        let mut member = member_fixture(1000.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();

        record_payment(
            &mut member,
            PaymentArgs {
                amount: 1000.0,
                promise_date: Some(ms(2024, 2, 1)),
                require_promise_for_partial: true,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap();

        assert_eq!(member.reminder_status, ReminderStatus::None);
        assert!(member.payment_history[0].promise_date.is_none());
    }
}
