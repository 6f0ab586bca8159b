//! Historical adjustment and reversal
//!
//! An adjustment redistributes a delta across exactly the cycles the original
//! entry funded, in their recorded order. Feasibility is computed before any
//! mutation: either the whole delta fits or the operation fails with no
//! partial state.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::member::{Actor, EntryKind, Member, PaymentEntry};

use super::allocate::{apply_to_cycle_raw, apply_to_cycles};
use super::cycle::ensure_cycles;
use super::money::{self, MONEY_TOLERANCE};
use super::summary::{refresh_reminder_state, sync_summary};

/// One staged cycle mutation: (cycle index, allocation index, signed delta)
type PlanItem = (usize, usize, Decimal);

fn plan_delta(member: &Member, entry: &PaymentEntry, delta: Decimal) -> AppResult<Vec<PlanItem>> {
    let mut plan = Vec::new();
    let mut left = delta.abs();

    for (alloc_idx, alloc) in entry.allocations.iter().enumerate() {
        if left < MONEY_TOLERANCE {
            break;
        }
        let cycle_idx = member
            .payment_cycles
            .iter()
            .position(|c| c.start_date == alloc.start_date && c.end_date == alloc.end_date)
            .ok_or_else(|| AppError::internal("allocation references a missing cycle"))?;
        let cycle = &member.payment_cycles[cycle_idx];

        let room = if delta > Decimal::ZERO {
            // Top up: bounded by the cycle's unpaid capacity
            (money::to_decimal(cycle.fee) - money::to_decimal(cycle.paid_amount))
                .max(Decimal::ZERO)
        } else {
            // Pull back: bounded by what this entry put on the cycle and by
            // the cycle's current paid amount
            money::to_decimal(alloc.amount).min(money::to_decimal(cycle.paid_amount))
        };

        let take = left.min(room);
        if take >= MONEY_TOLERANCE {
            let signed = if delta > Decimal::ZERO { take } else { -take };
            plan.push((cycle_idx, alloc_idx, signed));
            left -= take;
        }
    }

    if left >= MONEY_TOLERANCE {
        return Err(AppError::with_message(
            ErrorCode::CycleLimitExceeded,
            "Adjustment delta does not fit the cycles this entry funded",
        ));
    }
    Ok(plan)
}

/// Change a recorded payment entry's amount by `new_amount - old_amount`,
/// re-applying the delta across the same cycles it originally funded.
///
/// Only entries of type `payment` may be adjusted. Fails atomically with
/// `CycleLimitExceeded` when the delta cannot be fully placed.
/// Returns the applied delta.
pub fn adjust_history_entry(
    member: &mut Member,
    index: usize,
    new_amount: f64,
    by: &Actor,
    note: Option<&str>,
    at: i64,
) -> AppResult<f64> {
    if !new_amount.is_finite() || new_amount < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidPaymentAmount,
            format!("Adjusted amount must be non-negative, got {}", new_amount),
        ));
    }

    let entry = member
        .payment_history
        .get(index)
        .ok_or_else(|| AppError::new(ErrorCode::PaymentEntryNotFound))?;
    if entry.kind != EntryKind::Payment {
        return Err(AppError::new(ErrorCode::AdjustNotAllowed));
    }

    let delta = money::to_decimal(new_amount) - money::to_decimal(entry.amount);
    if delta.abs() < MONEY_TOLERANCE {
        return Ok(0.0);
    }

    // Stage first; nothing below may fail once cycles start mutating
    let plan = plan_delta(member, entry, delta)?;

    for (cycle_idx, alloc_idx, signed) in plan {
        apply_to_cycle_raw(
            &mut member.payment_cycles[cycle_idx],
            money::to_f64(signed),
            EntryKind::Adjustment,
            by,
            note,
            at,
        );
        let alloc = &mut member.payment_history[index].allocations[alloc_idx];
        alloc.amount = money::add(alloc.amount, money::to_f64(signed)).max(0.0);
    }

    member.payment_history[index].amount = new_amount;
    sync_summary(member);
    Ok(money::to_f64(delta))
}

/// Delete a ledger entry of type `payment`: reverse its allocations, remove
/// it from the list, then append a compensating `adjustment` entry. The
/// history shrinks by one but the monetary effects stay auditable.
/// Returns the reversed amount.
pub fn delete_history_entry(
    member: &mut Member,
    index: usize,
    by: &Actor,
    note: Option<String>,
    at: i64,
) -> AppResult<f64> {
    let entry = member
        .payment_history
        .get(index)
        .ok_or_else(|| AppError::new(ErrorCode::PaymentEntryNotFound))?;
    if entry.kind != EntryKind::Payment {
        return Err(AppError::new(ErrorCode::AdjustNotAllowed));
    }

    let original_amount = entry.amount;
    let original_unapplied = entry.unapplied_amount;
    let mut reversed_allocations = entry.allocations.clone();

    adjust_history_entry(member, index, 0.0, by, Some("Payment reversal"), at)?;
    member.payment_history.remove(index);

    for alloc in reversed_allocations.iter_mut() {
        alloc.amount = -alloc.amount;
    }

    member.payment_history.push(PaymentEntry {
        amount: -original_amount,
        unapplied_amount: -original_unapplied,
        kind: EntryKind::Adjustment,
        fee: member.fee,
        paid_amount: member.paid_amount,
        remaining_amount: member.remaining_amount,
        payment_status: member.payment_status,
        by: by.clone(),
        at,
        note: note.or_else(|| Some("Reversal of deleted payment".to_string())),
        payment_month: None,
        payment_mode: None,
        promise_date: None,
        allocations: reversed_allocations,
    });

    refresh_reminder_state(member);
    Ok(original_amount)
}

/// Manual adjustment not tied to any history entry.
///
/// Positive amounts flow through the FIFO allocator (tagged `adjustment`);
/// negative amounts reduce only the current (last) cycle's paid amount,
/// never older cycles.
pub fn apply_manual_adjustment(
    member: &mut Member,
    amount: f64,
    by: &Actor,
    note: Option<String>,
    at: i64,
) -> AppResult<()> {
    if !amount.is_finite() || money::to_decimal(amount).abs() < MONEY_TOLERANCE {
        return Err(AppError::with_message(
            ErrorCode::InvalidPaymentAmount,
            format!("Adjustment amount must be non-zero, got {}", amount),
        ));
    }

    ensure_cycles(member, at);

    let (allocations, unapplied) = if amount > 0.0 {
        let outcome = apply_to_cycles(
            member,
            amount,
            EntryKind::Adjustment,
            by,
            note.as_deref(),
            at,
        );
        let unapplied = money::sub_floor0(amount, outcome.applied);
        (outcome.allocations, unapplied)
    } else {
        let cycle = member
            .current_cycle()
            .ok_or_else(|| AppError::internal("cycle chain unexpectedly empty"))?;
        let reduce = money::to_decimal(amount).abs();
        if reduce > money::to_decimal(cycle.paid_amount) + MONEY_TOLERANCE {
            return Err(AppError::with_message(
                ErrorCode::CycleLimitExceeded,
                "Reduction exceeds the current cycle's paid amount",
            ));
        }
        let last_idx = member.payment_cycles.len() - 1;
        let cycle = &mut member.payment_cycles[last_idx];
        apply_to_cycle_raw(
            cycle,
            money::to_f64(-reduce),
            EntryKind::Adjustment,
            by,
            note.as_deref(),
            at,
        );
        let alloc = shared::models::member::CycleAllocation {
            start_date: cycle.start_date,
            end_date: cycle.end_date,
            amount: money::to_f64(-reduce),
        };
        (vec![alloc], 0.0)
    };

    sync_summary(member);

    member.payment_history.push(PaymentEntry {
        amount,
        unapplied_amount: unapplied,
        kind: EntryKind::Adjustment,
        fee: member.fee,
        paid_amount: member.paid_amount,
        remaining_amount: member.remaining_amount,
        payment_status: member.payment_status,
        by: by.clone(),
        at,
        note,
        payment_month: None,
        payment_mode: None,
        promise_date: None,
        allocations,
    });

    refresh_reminder_state(member);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::cycle::MonthPolicy;
    use crate::billing::payments::{record_payment, PaymentArgs};
    use crate::billing::test_support::{member_fixture, ms};
    use shared::models::member::PaymentStatus;

    fn member_with_payment(fee: f64, paid: f64) -> Member {
        let mut member = member_fixture(fee, "1 Month", ms(2024, 1, 1));
        record_payment(
            &mut member,
            PaymentArgs {
                amount: paid,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &Actor::system(),
            ms(2024, 1, 2),
        )
        .unwrap();
        member
    }

    #[test]
    fn test_adjust_up_tops_up_funded_cycle() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();

        let delta =
            adjust_history_entry(&mut member, 0, 700.0, &actor, None, ms(2024, 1, 3)).unwrap();

        assert_eq!(delta, 300.0);
        assert_eq!(member.payment_cycles[0].paid_amount, 700.0);
        assert_eq!(member.payment_cycles[0].remaining_amount, 300.0);
        assert_eq!(member.payment_history[0].amount, 700.0);
        assert_eq!(member.payment_history[0].allocations[0].amount, 700.0);
        // the cycle carries an adjustment sub-entry
        assert_eq!(
            member.payment_cycles[0].payments.last().unwrap().kind,
            EntryKind::Adjustment
        );
    }

    #[test]
    fn test_adjust_down_pulls_back() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();

        adjust_history_entry(&mut member, 0, 100.0, &actor, None, ms(2024, 1, 3)).unwrap();

        assert_eq!(member.payment_cycles[0].paid_amount, 100.0);
        assert_eq!(member.payment_cycles[0].remaining_amount, 900.0);
        assert_eq!(member.payment_history[0].amount, 100.0);
    }

    #[test]
    fn test_round_trip_to_zero_restores_pre_payment_state() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();

        adjust_history_entry(&mut member, 0, 0.0, &actor, None, ms(2024, 1, 3)).unwrap();

        assert_eq!(member.payment_cycles[0].paid_amount, 0.0);
        assert_eq!(member.payment_cycles[0].remaining_amount, 1000.0);
        assert_eq!(member.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_adjust_beyond_cycle_capacity_fails_atomically() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();
        let before = serde_json::to_value(&member.payment_cycles).unwrap();

        // 1600 > fee: the extra 600 has nowhere to go within the funded cycle
        let err = adjust_history_entry(&mut member, 0, 1600.0, &actor, None, ms(2024, 1, 3))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleLimitExceeded);

        // no partial mutation retained
        assert_eq!(serde_json::to_value(&member.payment_cycles).unwrap(), before);
        assert_eq!(member.payment_history[0].amount, 400.0);
    }

    #[test]
    fn test_adjusting_an_adjustment_entry_fails() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();
        apply_manual_adjustment(&mut member, 50.0, &actor, None, ms(2024, 1, 4)).unwrap();

        let idx = member.payment_history.len() - 1;
        let err =
            adjust_history_entry(&mut member, idx, 100.0, &actor, None, ms(2024, 1, 5)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AdjustNotAllowed);
    }

    #[test]
    fn test_adjust_missing_index() {
        let mut member = member_with_payment(1000.0, 400.0);
        let err = adjust_history_entry(&mut member, 9, 100.0, &Actor::system(), None, 0)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentEntryNotFound);
    }

    #[test]
    fn test_delta_spans_multiple_funded_cycles() {
        // One payment funding two cycles, then pulled back across both
        let mut member = member_fixture(500.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();
        crate::billing::cycle::ensure_cycle_for_month(
            &mut member,
            "February 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 1),
        )
        .unwrap();
        record_payment(
            &mut member,
            PaymentArgs {
                amount: 800.0,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap();
        assert_eq!(member.payment_cycles[0].paid_amount, 500.0);
        assert_eq!(member.payment_cycles[1].paid_amount, 300.0);

        // 800 → 200: redistribution follows allocation order; the first
        // cycle gives back its full 500, the remainder comes from the second
        adjust_history_entry(&mut member, 0, 200.0, &actor, None, ms(2024, 1, 3)).unwrap();

        assert_eq!(member.payment_cycles[0].paid_amount, 0.0);
        assert_eq!(member.payment_cycles[1].paid_amount, 200.0);
        assert_eq!(member.remaining_amount, 800.0);
    }

    #[test]
    fn test_delete_entry_reverses_and_compensates() {
        // Scenario E: a payment that funded two cycles
        let mut member = member_fixture(500.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();
        crate::billing::cycle::ensure_cycle_for_month(
            &mut member,
            "February 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 1),
        )
        .unwrap();
        record_payment(
            &mut member,
            PaymentArgs {
                amount: 800.0,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap();

        let reversed =
            delete_history_entry(&mut member, 0, &actor, None, ms(2024, 1, 5)).unwrap();

        assert_eq!(reversed, 800.0);
        // both cycles back to untouched
        assert_eq!(member.payment_cycles[0].paid_amount, 0.0);
        assert_eq!(member.payment_cycles[0].remaining_amount, 500.0);
        assert_eq!(member.payment_cycles[1].paid_amount, 0.0);
        // original entry removed, one compensating adjustment appended
        assert_eq!(member.payment_history.len(), 1);
        let comp = &member.payment_history[0];
        assert_eq!(comp.kind, EntryKind::Adjustment);
        assert_eq!(comp.amount, -800.0);
        assert_eq!(comp.allocations.len(), 2);
        assert_eq!(comp.allocations[0].amount, -500.0);
        assert_eq!(comp.allocations[1].amount, -300.0);
    }

    #[test]
    fn test_delete_adjustment_entry_fails() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();
        apply_manual_adjustment(&mut member, 50.0, &actor, None, ms(2024, 1, 4)).unwrap();

        let idx = member.payment_history.len() - 1;
        let err = delete_history_entry(&mut member, idx, &actor, None, ms(2024, 1, 5)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AdjustNotAllowed);
    }

    #[test]
    fn test_manual_adjustment_positive_goes_fifo() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();

        apply_manual_adjustment(&mut member, 200.0, &actor, None, ms(2024, 1, 6)).unwrap();

        assert_eq!(member.payment_cycles[0].paid_amount, 600.0);
        let entry = member.payment_history.last().unwrap();
        assert_eq!(entry.kind, EntryKind::Adjustment);
        assert_eq!(entry.amount, 200.0);
        assert_eq!(entry.allocations.len(), 1);
    }

    #[test]
    fn test_manual_adjustment_negative_hits_current_cycle_only() {
        let mut member = member_fixture(500.0, "1 Month", ms(2024, 1, 1));
        let actor = Actor::system();
        crate::billing::cycle::ensure_cycle_for_month(
            &mut member,
            "February 2024",
            MonthPolicy::CycleWindow,
            ms(2024, 1, 1),
        )
        .unwrap();
        record_payment(
            &mut member,
            PaymentArgs {
                amount: 800.0,
                ..Default::default()
            },
            MonthPolicy::CycleWindow,
            &actor,
            ms(2024, 1, 2),
        )
        .unwrap();

        apply_manual_adjustment(&mut member, -100.0, &actor, None, ms(2024, 1, 7)).unwrap();

        // older cycle untouched, current cycle reduced
        assert_eq!(member.payment_cycles[0].paid_amount, 500.0);
        assert_eq!(member.payment_cycles[1].paid_amount, 200.0);
    }

    #[test]
    fn test_manual_negative_adjustment_beyond_current_paid_fails() {
        let mut member = member_with_payment(1000.0, 400.0);
        let actor = Actor::system();

        let err =
            apply_manual_adjustment(&mut member, -600.0, &actor, None, ms(2024, 1, 7)).unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleLimitExceeded);
        assert_eq!(member.payment_cycles[0].paid_amount, 400.0);
    }
}
