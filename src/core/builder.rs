//! The monthly ledger builder: folds merged transactions, income history,
//! recurring rules, and debt schedules into one aggregated row per period.

use std::collections::BTreeSet;

use tracing::warn;

use super::{classify, expand, income, merge};
use crate::domain::common::PeriodKey;
use crate::domain::ledger::{CardAggregates, LedgerRow, Snapshot};
use crate::domain::transaction::TxnKind;

const CENT_TOLERANCE: f64 = 0.01;

/// Builds the full ledger: one row per period known to the snapshot,
/// ascending. Pure and deterministic; recomputed whole on every input
/// change, never incrementally patched.
pub fn build_ledger(snapshot: &Snapshot) -> Vec<LedgerRow> {
    candidate_periods(snapshot)
        .into_iter()
        .map(|period| build_row(snapshot, period))
        .collect()
}

/// Every period that can carry activity: each transaction's month, each
/// income entry's month, each active rule's start month, and the currently
/// viewed month so the "current month" view is never empty.
fn candidate_periods(snapshot: &Snapshot) -> BTreeSet<PeriodKey> {
    let mut periods = BTreeSet::new();
    for txn in &snapshot.transactions {
        periods.insert(txn.period);
    }
    for entry in &snapshot.income_history {
        periods.insert(entry.period);
    }
    for rule in snapshot.recurring_rules.iter().filter(|r| r.active) {
        if let Some(start) = rule.start_month {
            periods.insert(start);
        }
    }
    if let Some(active) = snapshot.active_period {
        periods.insert(active);
    }
    periods
}

/// Aggregates a single period.
///
/// Missing fields are treated as zero and a malformed record is excluded
/// from the sums it cannot contribute to; one bad transaction never aborts
/// the rest of the month.
pub fn build_row(snapshot: &Snapshot, period: PeriodKey) -> LedgerRow {
    let merged =
        merge::merged_transactions(period, &snapshot.transactions, &snapshot.recurring_rules);
    let debt_payments: f64 = snapshot.debts.iter().map(|d| d.monthly_repayment).sum();
    let recurring_spend = expand::recurring_spend(period, &snapshot.recurring_rules);
    let total_income = income::effective_total(
        period,
        &snapshot.income_history,
        snapshot.default_income.as_ref(),
    );

    let mut expense_sum = 0.0;
    let mut card = CardAggregates::default();
    for txn in &merged {
        let kind = classify::classify(txn);
        // Transfers and payments-to-card must never leak into expenses; they
        // are money moving, not money spent.
        if kind == TxnKind::Expense && !txn.is_transfer() {
            expense_sum += txn.amount;
        }
        match kind {
            TxnKind::Transfer => card.transfers += txn.abs_amount(),
            TxnKind::Payment => card.payments_to_card += txn.abs_amount(),
            TxnKind::Expense if txn.is_card_source() && !txn.is_transfer() => {
                card.gross_spend += txn.abs_amount()
            }
            TxnKind::Refund if txn.is_card_source() => card.refunds += txn.abs_amount(),
            TxnKind::Income if txn.is_card_source() => card.income += txn.amount,
            _ => {}
        }
    }
    card.net_spend = card.gross_spend - card.refunds;

    let total_expenses = expense_sum.abs() + debt_payments;
    let net_savings = total_income - total_expenses;
    let savings_rate = if total_income > 0.0 {
        net_savings / total_income * 100.0
    } else {
        0.0
    };

    LedgerRow {
        period,
        total_income,
        total_expenses,
        recurring_spend,
        debt_payments,
        net_savings,
        savings_rate,
        transaction_count: merged.len(),
        card,
    }
}

/// Recomputes each row's expense total by an independent pass (per-record
/// absolute values instead of the signed sum) and flags any mismatch above a
/// cent for human review.
///
/// A heuristic dedup failure or a sign-convention violation surfaces here as
/// a warning, never as an error.
pub fn ledger_warnings(snapshot: &Snapshot, rows: &[LedgerRow]) -> Vec<String> {
    let mut warnings = Vec::new();
    for row in rows {
        let merged =
            merge::merged_transactions(row.period, &snapshot.transactions, &snapshot.recurring_rules);
        let debt_payments: f64 = snapshot.debts.iter().map(|d| d.monthly_repayment).sum();
        let independent: f64 = merged
            .iter()
            .filter(|txn| classify::classify(txn) == TxnKind::Expense && !txn.is_transfer())
            .map(|txn| txn.abs_amount())
            .sum::<f64>()
            + debt_payments;
        if (independent - row.total_expenses).abs() > CENT_TOLERANCE {
            let message = format!(
                "expense totals diverge for {}: {:.2} vs {:.2}",
                row.period, row.total_expenses, independent
            );
            warn!("{message}");
            warnings.push(message);
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::debt::DebtAccount;
    use crate::domain::income::IncomeEntry;
    use crate::domain::recurring::RecurringRule;
    use crate::domain::transaction::Transaction;

    fn period(raw: &str) -> PeriodKey {
        raw.parse().unwrap()
    }

    fn txn(day: u32, amount: f64, category: &str, description: &str) -> Transaction {
        Transaction {
            id: format!("{category}-{description}-{amount}"),
            date: NaiveDate::from_ymd_opt(2025, 3, day),
            period: period("2025-03"),
            amount,
            kind: None,
            category: category.into(),
            description: description.into(),
            source: "amex".into(),
            reference: None,
            is_manual_category: false,
            origin: None,
        }
    }

    fn scenario_snapshot() -> Snapshot {
        Snapshot {
            transactions: vec![
                txn(3, -1800.0, "Rent", "REA PAYMENT"),
                txn(9, -700.0, "Groceries", "Woolworths"),
                txn(14, -500.0, "Dining Out", "restaurants"),
                txn(20, -500.0, "Transfers", "to savings"),
            ],
            income_history: vec![
                IncomeEntry::new(period("2024-01")).with_source("salary", 5000.0),
            ],
            recurring_rules: Vec::new(),
            debts: vec![DebtAccount::new("Car loan", 800.0)],
            active_period: None,
            default_income: None,
        }
    }

    #[test]
    fn aggregates_income_expenses_and_debt() {
        let rows = build_ledger(&scenario_snapshot());
        let row = rows.last().unwrap();
        assert_eq!(row.period, period("2025-03"));
        assert_eq!(row.total_income, 5000.0);
        assert_eq!(row.total_expenses, 3800.0);
        assert_eq!(row.net_savings, 1200.0);
        assert!((row.savings_rate - 24.0).abs() < 1e-9);
        assert_eq!(row.transaction_count, 4);
    }

    #[test]
    fn conservation_holds_for_every_row() {
        let mut snapshot = scenario_snapshot();
        snapshot.recurring_rules.push({
            let mut rule = RecurringRule::new("Gym", 25.0, "Health", 1);
            rule.start_month = Some(period("2025-01"));
            rule
        });
        for row in build_ledger(&snapshot) {
            assert_eq!(row.net_savings, row.total_income - row.total_expenses);
            assert!(row.total_expenses >= 0.0);
        }
    }

    #[test]
    fn transfers_are_excluded_from_expenses_but_tracked() {
        let rows = build_ledger(&scenario_snapshot());
        let row = rows.last().unwrap();
        assert_eq!(row.card.transfers, 500.0);
        // 3000 of transaction spend + 800 debt, the 500 transfer excluded.
        assert_eq!(row.total_expenses, 3800.0);
    }

    #[test]
    fn card_sub_aggregates_split_by_source_and_kind() {
        let mut snapshot = scenario_snapshot();
        snapshot.transactions.push(txn(11, 120.0, "Dining Out", "meal credit"));
        let mut manual = txn(12, -40.0, "Misc", "cash buy");
        manual.source = "manual".into();
        snapshot.transactions.push(manual);
        snapshot
            .transactions
            .push(txn(15, 2100.0, "Bills Payments", "amex payment received"));

        let rows = build_ledger(&snapshot);
        let row = rows.last().unwrap();
        assert_eq!(row.card.gross_spend, 3000.0);
        assert_eq!(row.card.refunds, 120.0);
        assert_eq!(row.card.net_spend, 2880.0);
        assert_eq!(row.card.payments_to_card, 2100.0);
        // The manual expense still counts toward the household total.
        assert_eq!(row.total_expenses, 3040.0 + 800.0);
    }

    #[test]
    fn virtual_and_real_rent_count_once() {
        let mut snapshot = scenario_snapshot();
        let mut rent = RecurringRule::new("Rent", 1800.0, "Rent", 3);
        rent.start_month = Some(period("2025-01"));
        snapshot.recurring_rules.push(rent);
        let row = build_ledger(&snapshot).pop().unwrap();
        // The real REA PAYMENT suppresses the virtual; expenses unchanged.
        assert_eq!(row.total_expenses, 3800.0);
        assert_eq!(row.recurring_spend, 1800.0);
    }

    #[test]
    fn active_period_is_always_represented() {
        let snapshot = Snapshot {
            active_period: Some(period("2025-06")),
            ..Snapshot::default()
        };
        let rows = build_ledger(&snapshot);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.period, period("2025-06"));
        assert_eq!(row.transaction_count, 0);
        assert_eq!(row.savings_rate, 0.0);
    }

    #[test]
    fn rows_cover_rule_starts_and_sort_ascending() {
        let mut snapshot = scenario_snapshot();
        let mut rule = RecurringRule::new("Insurance", 90.0, "Insurance", 1);
        rule.start_month = Some(period("2024-11"));
        snapshot.recurring_rules.push(rule);
        let rows = build_ledger(&snapshot);
        let periods: Vec<String> = rows.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(periods, vec!["2024-01", "2024-11", "2025-03"]);
    }

    #[test]
    fn warnings_flag_mixed_sign_expense_months() {
        let mut snapshot = scenario_snapshot();
        // An explicit expense stored positive defeats the signed convention;
        // |sum| and sum-of-|amounts| diverge and the check must notice.
        let mut bad = txn(18, 300.0, "Groceries", "refunded shop");
        bad.kind = Some(TxnKind::Expense);
        snapshot.transactions.push(bad);
        let rows = build_ledger(&snapshot);
        let warnings = ledger_warnings(&snapshot, &rows);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("2025-03"));
    }

    #[test]
    fn clean_ledgers_produce_no_warnings() {
        let snapshot = scenario_snapshot();
        let rows = build_ledger(&snapshot);
        assert!(ledger_warnings(&snapshot, &rows).is_empty());
    }
}
