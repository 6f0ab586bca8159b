//! Summary synchronization and due-now computation
//!
//! `paid_amount` / `remaining_amount` / `payment_status` on the member are
//! derived mirrors of the cycle list and must be recomputed after any
//! structural change: every mutating operation ends with [`sync_summary`]
//! before the aggregate is persisted.

use shared::models::member::{EntryKind, Member, MemberStatus, PaymentStatus, ReminderStatus};

use super::calendar::add_months_ms;
use super::money;

/// Status of a single cycle, derived from its remaining balance
pub fn cycle_status(remaining: f64) -> PaymentStatus {
    if money::is_settled(remaining) {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    }
}

/// Sum of remaining amounts across all cycles
pub fn total_remaining(member: &Member) -> f64 {
    member
        .payment_cycles
        .iter()
        .fold(0.0, |acc, c| money::add(acc, c.remaining_amount))
}

/// Recompute the member-level summary from the cycle list.
///
/// - `paid_amount` mirrors the current (latest) cycle's paid amount
/// - `remaining_amount` is the sum across all cycles
/// - `payment_status` follows the §fee rule: an explicitly requested
///   "Free Trial" survives only while the fee is 0
pub fn sync_summary(member: &mut Member) {
    for cycle in member.payment_cycles.iter_mut() {
        cycle.remaining_amount = money::sub_floor0(cycle.fee, cycle.paid_amount);
        cycle.status = cycle_status(cycle.remaining_amount);
    }

    member.paid_amount = member.current_cycle().map(|c| c.paid_amount).unwrap_or(0.0);
    member.remaining_amount = total_remaining(member);

    member.payment_status =
        if member.payment_status == PaymentStatus::FreeTrial && member.fee == 0.0 {
            PaymentStatus::FreeTrial
        } else if money::is_settled(member.remaining_amount) {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };

    refresh_reminder_state(member);
}

/// Re-derive the promise/reminder flags from the ledger.
///
/// A settled balance always clears the promise. Otherwise the most recent
/// still-pending payment entry carrying a promise date backs the flag; a
/// stale Promised flag with no supporting entry is cleared.
pub fn refresh_reminder_state(member: &mut Member) {
    if money::is_settled(member.remaining_amount) {
        member.reminder_status = ReminderStatus::None;
        member.promised_payment_date = None;
        return;
    }

    let backing = member
        .payment_history
        .iter()
        .rev()
        .find(|e| {
            e.kind == EntryKind::Payment
                && e.promise_date.is_some()
                && !money::is_settled(e.remaining_amount)
        })
        .and_then(|e| e.promise_date);

    match backing {
        Some(date) => {
            member.reminder_status = ReminderStatus::Promised;
            member.promised_payment_date = Some(date);
        }
        None => {
            member.reminder_status = ReminderStatus::None;
            member.promised_payment_date = None;
        }
    }
}

/// How many full cycle-lengths have elapsed past the current cycle's end.
///
/// Each elapsed cycle-length is one more unbilled period assumed still owed
/// at the current cycle's fee rate. Cycles are not materialized here; that
/// only happens on an actual payment or restart.
pub fn overdue_cycles(member: &Member, now: i64) -> u32 {
    if member.member_status != MemberStatus::Active {
        return 0;
    }
    let Some(current) = member.current_cycle() else {
        return 0;
    };
    if current.end_date > now {
        return 0;
    }

    let months = current.cycle_months.max(1);
    let mut cursor = current.end_date;
    let mut count = 0u32;
    loop {
        let next = add_months_ms(cursor, months);
        if next <= now {
            count += 1;
            cursor = next;
        } else {
            return count;
        }
    }
}

/// Outstanding balance including rollover from elapsed-but-unfunded periods
pub fn due_now_amount(member: &Member, now: i64) -> f64 {
    if member.member_status != MemberStatus::Active {
        return member.remaining_amount;
    }
    let overdue = overdue_cycles(member, now);
    let fee = member.current_cycle().map(|c| c.fee).unwrap_or(member.fee);
    money::add(member.remaining_amount, money::to_f64(
        money::to_decimal(fee) * rust_decimal::Decimal::from(overdue),
    ))
}
