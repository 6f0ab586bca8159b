//! Billing Cycle Engine
//!
//! The core of the system: pure in-memory functions over the [`Member`]
//! aggregate. Handlers load the aggregate, call into this module, and persist
//! the whole aggregate only when the operation returns `Ok`, so no partial
//! state ever reaches the database.
//!
//! # Module structure
//!
//! - [`duration`]: duration-label normalization and cycle-length resolution
//! - [`calendar`]: calendar-month arithmetic (day clamped to month end)
//! - [`cycle`]: cycle construction and lazy derivation
//! - [`allocate`]: FIFO / targeted payment allocation
//! - [`payments`]: recording incoming payments
//! - [`adjust`]: historical adjustment, reversal, manual adjustments
//! - [`lifecycle`]: status transitions, restart, extension
//! - [`summary`]: derived summary sync, overdue and due-now computation
//! - [`money`]: decimal-precision money helpers
//!
//! [`Member`]: shared::models::member::Member

pub mod adjust;
pub mod allocate;
pub mod calendar;
pub mod cycle;
pub mod duration;
pub mod lifecycle;
pub mod money;
pub mod payments;
pub mod summary;

pub use cycle::MonthPolicy;
pub use payments::PaymentArgs;
