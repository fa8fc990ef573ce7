//! Consumer-facing façade over the aggregation engine. Dashboards and
//! reports read through here; they never recompute aggregates themselves.

use crate::core::{builder, expand, income, merge};
use crate::domain::common::PeriodKey;
use crate::domain::income::IncomeEntry;
use crate::domain::ledger::{LedgerRow, Snapshot};
use crate::domain::transaction::Transaction;
use crate::ingest::HouseholdFile;
use crate::storage::StorageBackend;

use super::ServiceResult;

pub struct LedgerService;

impl LedgerService {
    /// Canonical transaction list for one month: deduplicated, newest first.
    pub fn merged_transactions(snapshot: &Snapshot, period: PeriodKey) -> Vec<Transaction> {
        merge::merged_transactions(period, &snapshot.transactions, &snapshot.recurring_rules)
    }

    /// Full ledger, one row per known period, ascending.
    pub fn ledger(snapshot: &Snapshot) -> Vec<LedgerRow> {
        builder::build_ledger(snapshot)
    }

    /// Consistency warnings for a freshly built ledger.
    pub fn ledger_warnings(snapshot: &Snapshot, rows: &[LedgerRow]) -> Vec<String> {
        builder::ledger_warnings(snapshot, rows)
    }

    /// Income configuration in force for `period`. Falls back to the
    /// snapshot default, then to an empty entry.
    pub fn effective_income(snapshot: &Snapshot, period: PeriodKey) -> IncomeEntry {
        income::effective_entry(period, &snapshot.income_history)
            .or(snapshot.default_income.as_ref())
            .cloned()
            .unwrap_or_else(|| IncomeEntry::new(period))
    }

    /// Expected recurring outflow for `period`, overrides honored.
    pub fn recurring_spend(snapshot: &Snapshot, period: PeriodKey) -> f64 {
        expand::recurring_spend(period, &snapshot.recurring_rules)
    }

    /// Parses a caller-supplied period string. Rejecting bad input here is
    /// the one place the engine errors instead of degrading.
    pub fn parse_period(raw: &str) -> ServiceResult<PeriodKey> {
        Ok(raw.parse()?)
    }

    /// Loads a stored household and normalizes it into an engine snapshot,
    /// running any pending one-shot migrations.
    pub fn open(
        storage: &dyn StorageBackend,
        name: &str,
        active_period: Option<PeriodKey>,
    ) -> ServiceResult<Snapshot> {
        let file = storage.load(name)?;
        Ok(file.into_snapshot(active_period))
    }

    /// Persists canonical state back at the current schema version. Ledger
    /// rows are derived and are deliberately not part of what is written.
    pub fn persist(
        storage: &dyn StorageBackend,
        snapshot: &Snapshot,
        name: &str,
    ) -> ServiceResult<()> {
        storage.save(&HouseholdFile::from_snapshot(snapshot), name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::recurring::RecurringRule;

    fn snapshot() -> Snapshot {
        let mut rule = RecurringRule::new("Rent", 50.0, "Rent", 1);
        rule.start_month = Some("2025-01".parse().unwrap());
        Snapshot {
            transactions: vec![Transaction::manual(
                NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
                -82.0,
                "Groceries",
                "Woolworths",
            )],
            income_history: vec![
                IncomeEntry::new("2024-01".parse().unwrap()).with_source("salary", 5000.0),
            ],
            recurring_rules: vec![rule],
            debts: Vec::new(),
            active_period: Some("2025-03".parse().unwrap()),
            default_income: None,
        }
    }

    #[test]
    fn merged_view_and_ledger_agree_on_counts() {
        let snapshot = snapshot();
        let period = "2025-03".parse().unwrap();
        let merged = LedgerService::merged_transactions(&snapshot, period);
        let rows = LedgerService::ledger(&snapshot);
        let row = rows.iter().find(|r| r.period == period).unwrap();
        assert_eq!(merged.len(), row.transaction_count);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn effective_income_defaults_to_empty_entry() {
        let period = "2025-03".parse().unwrap();
        let entry = LedgerService::effective_income(&Snapshot::default(), period);
        assert_eq!(entry.total(), 0.0);
    }

    #[test]
    fn parse_period_rejects_garbage() {
        assert!(LedgerService::parse_period("2025-03").is_ok());
        assert!(LedgerService::parse_period("Q3 2025").is_err());
    }
}
