//! The aggregation engine: pure, synchronous computation over an immutable
//! snapshot. No I/O, no suspension points, no ambient state; determinism
//! and idempotence stand in for locking.

pub mod builder;
pub mod classify;
pub mod expand;
pub mod income;
pub mod merge;
pub mod services;

pub use builder::{build_ledger, build_row, ledger_warnings};
pub use classify::{classify, with_kind};
pub use expand::{expand_rules, recurring_spend};
pub use income::{effective_entry, effective_total};
pub use merge::{is_duplicate, merged_transactions};
pub use services::{LedgerService, ServiceError, ServiceResult};
