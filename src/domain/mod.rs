//! Canonical domain model: the single internal shape every engine step
//! consumes. Legacy field names and loose amounts are absorbed once at the
//! ingest boundary, never here.

pub mod common;
pub mod debt;
pub mod income;
pub mod ledger;
pub mod recurring;
pub mod transaction;

pub use common::PeriodKey;
pub use debt::DebtAccount;
pub use income::IncomeEntry;
pub use ledger::{CardAggregates, LedgerRow, Snapshot};
pub use recurring::{Frequency, RecurringRule, RuleOverride};
pub use transaction::{Transaction, TxnKind, VirtualOrigin};
