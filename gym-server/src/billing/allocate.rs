//! Payment allocation across cycles
//!
//! Allocation is greedy and chronological: oldest unpaid cycle first, each
//! cycle filled to its fee before the next one sees a cent. A targeted
//! allocation funds exactly one cycle and never spills over: backdated
//! payments must not disturb the FIFO order of everything else.

use rust_decimal::Decimal;
use shared::models::member::{Actor, CycleAllocation, CyclePayment, EntryKind, Member, PaymentCycle};

use super::money::{self, MONEY_TOLERANCE};
use super::summary::cycle_status;

/// Result of applying an amount to the cycle chain
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// Portion actually placed on cycles; may be less than the requested
    /// amount when cycles run out
    pub applied: f64,
    /// Exactly which cycle windows received funds (the reversal key)
    pub allocations: Vec<CycleAllocation>,
}

/// Apply a signed delta to one cycle and record the allocation on its
/// low-level ledger. Callers guarantee the delta keeps `paid_amount >= 0`.
pub(crate) fn apply_to_cycle_raw(
    cycle: &mut PaymentCycle,
    delta: f64,
    kind: EntryKind,
    by: &Actor,
    note: Option<&str>,
    at: i64,
) {
    cycle.paid_amount = money::add(cycle.paid_amount, delta).max(0.0);
    cycle.remaining_amount = money::sub_floor0(cycle.fee, cycle.paid_amount);
    cycle.status = cycle_status(cycle.remaining_amount);
    cycle.payments.push(CyclePayment {
        amount: delta,
        kind,
        by: by.clone(),
        at,
        note: note.map(|n| n.to_string()),
    });
}

/// Greedily allocate `amount` across cycles in chronological order, skipping
/// fully-paid cycles, until the amount is exhausted or no cycles remain.
pub fn apply_to_cycles(
    member: &mut Member,
    amount: f64,
    kind: EntryKind,
    by: &Actor,
    note: Option<&str>,
    at: i64,
) -> AllocationOutcome {
    let mut left = money::to_decimal(amount);
    let mut allocations = Vec::new();

    for cycle in member.payment_cycles.iter_mut() {
        if left < MONEY_TOLERANCE {
            break;
        }
        let remaining = money::to_decimal(cycle.remaining_amount);
        if remaining < MONEY_TOLERANCE {
            continue;
        }

        let take = left.min(remaining);
        apply_to_cycle_raw(cycle, money::to_f64(take), kind, by, note, at);
        allocations.push(CycleAllocation {
            start_date: cycle.start_date,
            end_date: cycle.end_date,
            amount: money::to_f64(take),
        });
        left -= take;
    }

    AllocationOutcome {
        applied: money::to_f64(money::to_decimal(amount) - left.max(Decimal::ZERO)),
        allocations,
    }
}

/// Allocate only against one specific cycle, capping at that cycle's
/// remaining balance. Excess is left unapplied, never spilled.
pub fn apply_to_single_cycle(
    member: &mut Member,
    cycle_index: usize,
    amount: f64,
    kind: EntryKind,
    by: &Actor,
    note: Option<&str>,
    at: i64,
) -> AllocationOutcome {
    let Some(cycle) = member.payment_cycles.get_mut(cycle_index) else {
        return AllocationOutcome {
            applied: 0.0,
            allocations: Vec::new(),
        };
    };

    let take = money::to_decimal(amount).min(money::to_decimal(cycle.remaining_amount));
    if take < MONEY_TOLERANCE {
        return AllocationOutcome {
            applied: 0.0,
            allocations: Vec::new(),
        };
    }

    apply_to_cycle_raw(cycle, money::to_f64(take), kind, by, note, at);
    AllocationOutcome {
        applied: money::to_f64(take),
        allocations: vec![CycleAllocation {
            start_date: cycle.start_date,
            end_date: cycle.end_date,
            amount: money::to_f64(take),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::cycle::build_cycle;
    use crate::billing::test_support::{member_fixture, ms};
    use shared::models::member::PaymentStatus;

    fn member_with_cycles(fee: f64, count: usize) -> Member {
        let mut member = member_fixture(fee, "1 Month", ms(2024, 1, 1));
        let mut start = ms(2024, 1, 1);
        for _ in 0..count {
            let cycle = build_cycle(start, 1, fee);
            start = cycle.end_date;
            member.payment_cycles.push(cycle);
        }
        member
    }

    #[test]
    fn test_fifo_fills_oldest_first() {
        let mut member = member_with_cycles(1000.0, 3);
        let actor = Actor::system();

        let outcome = apply_to_cycles(
            &mut member,
            1500.0,
            EntryKind::Payment,
            &actor,
            None,
            ms(2024, 3, 1),
        );

        assert_eq!(outcome.applied, 1500.0);
        assert_eq!(outcome.allocations.len(), 2);
        assert_eq!(outcome.allocations[0].amount, 1000.0);
        assert_eq!(outcome.allocations[1].amount, 500.0);

        assert_eq!(member.payment_cycles[0].paid_amount, 1000.0);
        assert_eq!(member.payment_cycles[0].status, PaymentStatus::Paid);
        assert_eq!(member.payment_cycles[1].paid_amount, 500.0);
        assert_eq!(member.payment_cycles[1].remaining_amount, 500.0);
        assert_eq!(member.payment_cycles[2].paid_amount, 0.0);
    }

    #[test]
    fn test_fifo_skips_fully_paid_cycles() {
        let mut member = member_with_cycles(1000.0, 2);
        let actor = Actor::system();
        member.payment_cycles[0].paid_amount = 1000.0;
        member.payment_cycles[0].remaining_amount = 0.0;
        member.payment_cycles[0].status = PaymentStatus::Paid;

        let outcome = apply_to_cycles(
            &mut member,
            400.0,
            EntryKind::Payment,
            &actor,
            None,
            ms(2024, 2, 1),
        );

        assert_eq!(outcome.applied, 400.0);
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(outcome.allocations[0].start_date, ms(2024, 2, 1));
        assert_eq!(member.payment_cycles[1].paid_amount, 400.0);
    }

    #[test]
    fn test_overpayment_leaves_unapplied_remainder() {
        let mut member = member_with_cycles(1000.0, 1);
        let actor = Actor::system();

        let outcome = apply_to_cycles(
            &mut member,
            1600.0,
            EntryKind::Payment,
            &actor,
            None,
            ms(2024, 1, 5),
        );

        // Only 1000 fits; 600 has no cycle to absorb it
        assert_eq!(outcome.applied, 1000.0);
        assert_eq!(member.payment_cycles[0].remaining_amount, 0.0);
    }

    #[test]
    fn test_each_allocation_records_cycle_sub_entry() {
        let mut member = member_with_cycles(500.0, 2);
        let actor = Actor::new(7, "Reception");

        apply_to_cycles(
            &mut member,
            700.0,
            EntryKind::Payment,
            &actor,
            Some("card"),
            ms(2024, 1, 5),
        );

        assert_eq!(member.payment_cycles[0].payments.len(), 1);
        assert_eq!(member.payment_cycles[0].payments[0].amount, 500.0);
        assert_eq!(member.payment_cycles[0].payments[0].kind, EntryKind::Payment);
        assert_eq!(member.payment_cycles[0].payments[0].by.name, "Reception");
        assert_eq!(member.payment_cycles[1].payments[0].amount, 200.0);
    }

    #[test]
    fn test_single_cycle_caps_at_remaining_and_never_spills() {
        let mut member = member_with_cycles(1000.0, 2);
        let actor = Actor::system();
        member.payment_cycles[1].paid_amount = 400.0;
        member.payment_cycles[1].remaining_amount = 600.0;

        let outcome = apply_to_single_cycle(
            &mut member,
            1,
            900.0,
            EntryKind::Payment,
            &actor,
            None,
            ms(2024, 2, 10),
        );

        assert_eq!(outcome.applied, 600.0);
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(member.payment_cycles[1].remaining_amount, 0.0);
        // the older cycle is untouched, no spill
        assert_eq!(member.payment_cycles[0].paid_amount, 0.0);
    }

    #[test]
    fn test_single_cycle_out_of_bounds_applies_nothing() {
        let mut member = member_with_cycles(1000.0, 1);
        let actor = Actor::system();

        let outcome = apply_to_single_cycle(
            &mut member,
            5,
            100.0,
            EntryKind::Payment,
            &actor,
            None,
            ms(2024, 1, 5),
        );
        assert_eq!(outcome.applied, 0.0);
        assert!(outcome.allocations.is_empty());
    }

    #[test]
    fn test_invariant_paid_plus_remaining_equals_fee() {
        let mut member = member_with_cycles(333.33, 3);
        let actor = Actor::system();

        apply_to_cycles(&mut member, 500.0, EntryKind::Payment, &actor, None, 0);

        for cycle in &member.payment_cycles {
            assert!(
                crate::billing::money::money_eq(
                    crate::billing::money::add(cycle.paid_amount, cycle.remaining_amount),
                    cycle.fee
                ),
                "paid {} + remaining {} != fee {}",
                cycle.paid_amount,
                cycle.remaining_amount,
                cycle.fee
            );
        }
    }
}
