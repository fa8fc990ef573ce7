use serde::{Deserialize, Serialize};

use crate::domain::common::PeriodKey;
use crate::domain::debt::DebtAccount;
use crate::domain::income::IncomeEntry;
use crate::domain::recurring::RecurringRule;
use crate::domain::transaction::Transaction;

/// Card-provenance subtotals kept for reconciliation views. They never feed
/// `net_savings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardAggregates {
    pub gross_spend: f64,
    pub refunds: f64,
    pub net_spend: f64,
    pub payments_to_card: f64,
    pub transfers: f64,
    pub income: f64,
}

/// Aggregated financial summary for one period; the engine's output unit.
///
/// Rows are derived state, recomputed from their inputs on every change and
/// never persisted independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    pub period: PeriodKey,
    pub total_income: f64,
    /// Transaction expenses plus debt payments; transfers excluded.
    pub total_expenses: f64,
    pub recurring_spend: f64,
    pub debt_payments: f64,
    pub net_savings: f64,
    pub savings_rate: f64,
    pub transaction_count: usize,
    pub card: CardAggregates,
}

/// Immutable input bundle handed to the ledger builder.
///
/// Persistence loads one consistent snapshot per invocation; the engine only
/// ever reads it. No ambient state, no incremental mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub income_history: Vec<IncomeEntry>,
    pub recurring_rules: Vec<RecurringRule>,
    pub debts: Vec<DebtAccount>,
    /// Currently viewed month. Always represented in the ledger, even with no
    /// transactions yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_period: Option<PeriodKey>,
    /// Income assumed when the history has no entries at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_income: Option<IncomeEntry>,
}

impl Snapshot {
    pub fn new(transactions: Vec<Transaction>, recurring_rules: Vec<RecurringRule>) -> Self {
        Self {
            transactions,
            recurring_rules,
            ..Self::default()
        }
    }
}
