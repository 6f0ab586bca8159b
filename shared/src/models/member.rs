//! Member Model
//!
//! The Member aggregate: identity fields plus the payment-cycle ledger the
//! billing engine operates on. All timestamps are Unix millis (i64), money is
//! f64 rounded to 2 decimal places by the billing money helpers.
//!
//! Nested arrays (`payment_cycles`, `payment_history`, `activity_history`)
//! are persisted as JSON TEXT columns; the aggregate is always loaded,
//! mutated in memory and saved whole.

use serde::{Deserialize, Serialize};

pub use super::actor::Actor;

/// Member lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl Default for MemberStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Payment status, derived from the cycle ledger (never authoritative on its
/// own). "Free Trial" only when explicitly requested and the fee is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Pending,
    #[serde(rename = "Free Trial")]
    FreeTrial,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Whether the member has promised a future payment date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderStatus {
    None,
    Promised,
}

impl Default for ReminderStatus {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Ledger entry kind: a real payment or a correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "payment")]
    Payment,
    #[serde(rename = "adjustment")]
    Adjustment,
}

/// How much of a ledger entry landed on one cycle window.
/// This list is the only link between a history entry and the cycles it
/// affected; it is the reversal key for adjustment and deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleAllocation {
    pub start_date: i64,
    pub end_date: i64,
    pub amount: f64,
}

/// Low-level allocation record on a cycle (mirror of the ledger, per cycle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyclePayment {
    pub amount: f64,
    pub kind: EntryKind,
    pub by: Actor,
    pub at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One billing period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCycle {
    pub start_date: i64,
    /// `start_date` + `cycle_months` calendar months (day clamped)
    pub end_date: i64,
    pub cycle_months: u32,
    /// Fee snapshot at cycle creation; may differ from the member's current
    /// fee after a fee change
    pub fee: f64,
    pub paid_amount: f64,
    /// fee − paid_amount, floored at 0
    pub remaining_amount: f64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub payments: Vec<CyclePayment>,
}

/// Append-only, user-facing ledger entry (payment or adjustment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// Signed: positive for a payment, negative for a pure reduction
    pub amount: f64,
    /// Portion that could not be allocated to any cycle (overpayment beyond
    /// outstanding dues). Recorded, never auto-reconciled.
    #[serde(default)]
    pub unapplied_amount: f64,
    pub kind: EntryKind,
    // Snapshot of the member's summary at the time of entry
    pub fee: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub payment_status: PaymentStatus,
    pub by: Actor,
    pub at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Free-text month label the payment was targeted at, e.g. "March 2024"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
    /// Promised follow-up date for a partial payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promise_date: Option<i64>,
    #[serde(default)]
    pub allocations: Vec<CycleAllocation>,
}

/// Audit log entry for structural field changes and lifecycle actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: String,
    pub by: Actor,
    pub at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<serde_json::Value>,
}

/// Member aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_notes: Option<String>,
    pub membership_type: String,
    /// Date the current cycle chain begins (may be redone on restart)
    pub start_date: i64,
    /// When the member first joined, distinct from `start_date`
    pub registration_date: i64,
    /// Normalized duration label: "1 Month" | "3 Months" | "6 Months" | "1 Year"
    pub duration: String,
    /// Amount charged per cycle
    pub fee: f64,
    /// Derived: current (latest) cycle's paid amount
    pub paid_amount: f64,
    /// Derived: sum of remaining amounts across all cycles
    pub remaining_amount: f64,
    pub payment_status: PaymentStatus,
    pub member_status: MemberStatus,
    pub reminder_status: ReminderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promised_payment_date: Option<i64>,
    /// Set when status moves to Inactive; drives the resume shift
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive_since: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_trainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_trainer: Option<String>,
    pub created_by: Actor,
    pub updated_by: Actor,
    /// Ordered, insertion order = chronological order; last element is the
    /// current cycle. Cycles are never deleted.
    #[serde(default)]
    pub payment_cycles: Vec<PaymentCycle>,
    /// Append-only user-facing ledger
    #[serde(default)]
    pub payment_history: Vec<PaymentEntry>,
    #[serde(default)]
    pub activity_history: Vec<ActivityEntry>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Member {
    /// The current (latest) cycle, if any cycles exist
    pub fn current_cycle(&self) -> Option<&PaymentCycle> {
        self.payment_cycles.last()
    }

    pub fn current_cycle_mut(&mut self) -> Option<&mut PaymentCycle> {
        self.payment_cycles.last_mut()
    }
}

/// Create member payload. Date fields are "YYYY-MM-DD" strings converted to
/// millis at the handler layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCreate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub health_notes: Option<String>,
    pub membership_type: Option<String>,
    pub start_date: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub fee: f64,
    /// Amount received at enrollment, allocated through the billing engine
    #[serde(default)]
    pub paid_amount: f64,
    /// Pass "Free Trial" together with fee = 0 to request a free trial
    pub payment_status: Option<String>,
    pub personal_trainer: Option<String>,
    pub assigned_trainer: Option<String>,
    pub payment_note: Option<String>,
}

/// Update member payload: the explicit allow-list of updatable fields.
/// Payments never flow through here; use the pay endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub health_notes: Option<String>,
    pub membership_type: Option<String>,
    pub start_date: Option<String>,
    pub duration: Option<String>,
    pub fee: Option<f64>,
    pub personal_trainer: Option<String>,
    pub assigned_trainer: Option<String>,
}

/// Record a payment against a member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    /// Target a specific month ("March 2024" or "2024-03"); omitted → FIFO
    pub payment_month: Option<String>,
    pub payment_mode: Option<String>,
    pub note: Option<String>,
    /// Required when the payment is partial ("YYYY-MM-DD")
    pub promise_date: Option<String>,
}

/// Adjust a recorded payment entry to a new amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustPaymentRequest {
    pub amount: f64,
    pub note: Option<String>,
}

/// Manual adjustment not tied to any history entry. Positive amounts flow
/// through the FIFO allocator; negative amounts reduce only the current cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualAdjustmentRequest {
    pub amount: f64,
    pub note: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Change member status (pause / resume / activate with a fresh cycle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: MemberStatus,
    /// On activation: append a brand-new cycle instead of resuming the
    /// current one
    #[serde(default)]
    pub fresh_cycle: bool,
    /// With `fresh_cycle`: waive outstanding dues on existing cycles
    #[serde(default = "default_true")]
    pub clear_dues: bool,
    pub start_date: Option<String>,
    pub fee: Option<f64>,
    pub duration: Option<String>,
}

/// Restart the membership with a fresh cycle (independent of status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartRequest {
    pub start_date: Option<String>,
    pub fee: Option<f64>,
    pub duration: Option<String>,
    #[serde(default = "default_true")]
    pub clear_dues: bool,
}

/// Push the current cycle's end date forward by N days
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendRequest {
    pub days: i64,
    pub note: Option<String>,
}
