//! Member lifecycle transitions
//!
//! Active ⇄ Inactive, restart with a fresh cycle, and manual end-date
//! extension. Every transition appends an activity entry and ends with a
//! summary sync.

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::member::{
    ActivityEntry, Actor, CycleAllocation, EntryKind, Member, MemberStatus, PaymentEntry,
    ReminderStatus,
};

use super::allocate::apply_to_cycle_raw;
use super::calendar::days_to_ms;
use super::cycle::{build_cycle, ensure_cycles};
use super::duration::{months_for_label, normalize};
use super::money;
use super::summary::sync_summary;

/// A fresh cycle can start ahead of "now" by at most this much
const MAX_FUTURE_START_MS: i64 = 366 * 86_400_000;

/// Options for activating/restarting with a brand-new cycle
#[derive(Debug, Clone, Default)]
pub struct FreshCycleOptions {
    /// Start of the new cycle; defaults to now
    pub start_date: Option<i64>,
    /// New per-cycle fee; defaults to the member's current fee
    pub fee: Option<f64>,
    /// New duration label; defaults to the member's current duration
    pub duration: Option<String>,
    /// Waive outstanding dues on existing cycles
    pub clear_dues: bool,
}

fn push_activity(member: &mut Member, action: &str, by: &Actor, at: i64, changes: serde_json::Value) {
    member.activity_history.push(ActivityEntry {
        action: action.to_string(),
        by: by.clone(),
        at,
        changes: Some(changes),
    });
}

/// Active → Inactive. Cycle data is untouched; `inactive_since` drives the
/// resume shift later. No-op when already inactive.
pub fn deactivate(member: &mut Member, by: &Actor, at: i64) -> AppResult<()> {
    if member.member_status == MemberStatus::Inactive {
        return Ok(());
    }

    member.member_status = MemberStatus::Inactive;
    member.inactive_since = Some(at);
    member.updated_by = by.clone();

    push_activity(
        member,
        "deactivate",
        by,
        at,
        json!({ "member_status": { "from": "Active", "to": "Inactive" } }),
    );
    sync_summary(member);
    Ok(())
}

/// Inactive → Active.
///
/// Default (resume): the current cycle's end date shifts forward by the
/// wall-clock duration the member was inactive, so the pause does not count
/// against the billing window. With `fresh`, a brand-new cycle is appended
/// instead (see [`restart`]).
pub fn activate(
    member: &mut Member,
    fresh: Option<FreshCycleOptions>,
    by: &Actor,
    at: i64,
) -> AppResult<()> {
    if let Some(opts) = fresh {
        return restart(member, opts, by, at);
    }
    if member.member_status == MemberStatus::Active {
        return Ok(());
    }

    ensure_cycles(member, at);
    let paused_ms = member.inactive_since.map(|since| (at - since).max(0));
    if let Some(pause) = paused_ms
        && let Some(cycle) = member.current_cycle_mut()
    {
        cycle.end_date += pause;
    }

    member.member_status = MemberStatus::Active;
    member.inactive_since = None;
    member.updated_by = by.clone();

    push_activity(
        member,
        "activate",
        by,
        at,
        json!({
            "member_status": { "from": "Inactive", "to": "Active" },
            "paused_ms": paused_ms,
        }),
    );
    sync_summary(member);
    Ok(())
}

/// Waive all outstanding dues: each unpaid cycle is topped up to its fee via
/// an `adjustment` sub-entry, and one compensating ledger entry records the
/// total so the waiver stays auditable.
fn waive_outstanding(member: &mut Member, by: &Actor, at: i64) {
    let mut total = 0.0;
    let mut allocations = Vec::new();

    for cycle in member.payment_cycles.iter_mut() {
        if money::is_settled(cycle.remaining_amount) {
            continue;
        }
        let waived = cycle.remaining_amount;
        apply_to_cycle_raw(
            cycle,
            waived,
            EntryKind::Adjustment,
            by,
            Some("Dues waived"),
            at,
        );
        allocations.push(CycleAllocation {
            start_date: cycle.start_date,
            end_date: cycle.end_date,
            amount: waived,
        });
        total = money::add(total, waived);
    }

    if allocations.is_empty() {
        return;
    }

    sync_summary(member);
    member.payment_history.push(PaymentEntry {
        amount: total,
        unapplied_amount: 0.0,
        kind: EntryKind::Adjustment,
        fee: member.fee,
        paid_amount: member.paid_amount,
        remaining_amount: member.remaining_amount,
        payment_status: member.payment_status,
        by: by.clone(),
        at,
        note: Some("Outstanding dues waived".to_string()),
        payment_month: None,
        payment_mode: None,
        promise_date: None,
        allocations,
    });
}

/// Restart the membership with a fresh cycle, independent of current status.
/// Optionally waives previous dues; always ends Active with reminder state
/// cleared.
pub fn restart(
    member: &mut Member,
    opts: FreshCycleOptions,
    by: &Actor,
    at: i64,
) -> AppResult<()> {
    let start = opts.start_date.unwrap_or(at);
    if start <= 0 || start > at + MAX_FUTURE_START_MS {
        return Err(AppError::with_message(
            ErrorCode::InvalidStartDate,
            "Restart date must fall within a year of today",
        ));
    }
    if let Some(fee) = opts.fee
        && (!fee.is_finite() || fee < 0.0)
    {
        return Err(AppError::validation(format!(
            "Fee must be non-negative, got {}",
            fee
        )));
    }

    let duration = match opts.duration.as_deref() {
        Some(label) => normalize(label)?.to_string(),
        None => member.duration.clone(),
    };

    let old_fee = member.fee;
    let old_duration = member.duration.clone();
    let old_start = member.start_date;

    if opts.clear_dues {
        waive_outstanding(member, by, at);
    }

    member.fee = opts.fee.unwrap_or(member.fee);
    member.duration = duration;
    member.start_date = start;

    let months = months_for_label(&member.duration);
    member
        .payment_cycles
        .push(build_cycle(start, months, member.fee));

    member.member_status = MemberStatus::Active;
    member.inactive_since = None;
    member.reminder_status = ReminderStatus::None;
    member.promised_payment_date = None;
    member.updated_by = by.clone();

    push_activity(
        member,
        "restart",
        by,
        at,
        json!({
            "start_date": { "from": old_start, "to": start },
            "fee": { "from": old_fee, "to": member.fee },
            "duration": { "from": old_duration, "to": member.duration },
            "cleared_dues": opts.clear_dues,
        }),
    );
    sync_summary(member);
    Ok(())
}

/// Push only the current cycle's end date forward by N days: a manual
/// goodwill extension with no new cycle and no payment effect.
pub fn extend_current_cycle(
    member: &mut Member,
    days: i64,
    note: Option<String>,
    by: &Actor,
    at: i64,
) -> AppResult<()> {
    if days <= 0 {
        return Err(AppError::validation(format!(
            "Extension days must be positive, got {}",
            days
        )));
    }

    ensure_cycles(member, at);
    let cycle = member
        .current_cycle_mut()
        .ok_or_else(|| AppError::internal("cycle chain unexpectedly empty"))?;
    let old_end = cycle.end_date;
    cycle.end_date += days_to_ms(days);
    let new_end = cycle.end_date;
    member.updated_by = by.clone();

    push_activity(
        member,
        "extend",
        by,
        at,
        json!({
            "days": days,
            "end_date": { "from": old_end, "to": new_end },
            "note": note,
        }),
    );
    sync_summary(member);
    Ok(())
}

/// Dispatch a status change request
pub fn set_status(
    member: &mut Member,
    status: MemberStatus,
    fresh: Option<FreshCycleOptions>,
    by: &Actor,
    at: i64,
) -> AppResult<()> {
    match status {
        MemberStatus::Inactive => deactivate(member, by, at),
        MemberStatus::Active => activate(member, fresh, by, at),
    }
}
