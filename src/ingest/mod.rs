//! Normalization boundary: raw import/legacy records in, canonical domain
//! shapes out. Every historical field spelling is absorbed here, once, so the
//! engine never branches on field names.

pub mod amount;
pub mod migrate;

pub use amount::RawAmount;
pub use migrate::RawRule;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::common::PeriodKey;
use crate::domain::debt::DebtAccount;
use crate::domain::income::IncomeEntry;
use crate::domain::ledger::Snapshot;
use crate::domain::transaction::{
    Transaction, TxnKind, DEFAULT_SOURCE, TRANSFERS_CATEGORY, UNCATEGORIZED,
};

/// Current persisted schema. Version 1 predates the signed-amount
/// convention; opening it triggers the one-shot sign-healing pass.
pub const SCHEMA_VERSION: u32 = 2;

fn legacy_schema_version() -> u32 {
    1
}

/// An imported or stored transaction before normalization. Mirrors the
/// import interface shape plus the legacy store's field spellings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTransaction {
    pub id: Option<String>,
    pub date: Option<String>,
    #[serde(alias = "periodKey", alias = "monthKey")]
    pub period_key: Option<String>,
    pub amount: RawAmount,
    pub kind: Option<String>,
    /// Legacy importer hint; only `"income"` ever carried meaning.
    #[serde(rename = "type")]
    pub txn_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub merchant: Option<String>,
    pub item: Option<String>,
    pub reference: Option<String>,
    pub source: Option<String>,
    #[serde(alias = "isManualCategory")]
    pub is_manual_category: bool,
}

impl From<Transaction> for RawTransaction {
    fn from(txn: Transaction) -> Self {
        Self {
            id: Some(txn.id),
            date: txn.date.map(|d| d.to_string()),
            period_key: Some(txn.period.to_string()),
            amount: RawAmount::Number(txn.amount),
            kind: txn.kind.map(|k| k.label().to_string()),
            txn_type: None,
            category: Some(txn.category),
            description: Some(txn.description),
            merchant: None,
            item: None,
            reference: txn.reference,
            source: Some(txn.source),
            is_manual_category: txn.is_manual_category,
        }
    }
}

/// An income-history entry as stored: a date plus free-form named components.
///
/// Legacy spellings (`periodKey`, `monthKey`) land in the flattened map and
/// are picked out during normalization; `alias` does not combine with
/// `flatten`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIncomeEntry {
    pub date: Option<String>,
    #[serde(flatten)]
    pub sources: BTreeMap<String, RawAmount>,
}

impl From<IncomeEntry> for RawIncomeEntry {
    fn from(entry: IncomeEntry) -> Self {
        Self {
            date: Some(entry.period.to_string()),
            sources: entry
                .sources
                .into_iter()
                .map(|(name, value)| (name, RawAmount::Number(value)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDebt {
    pub name: Option<String>,
    #[serde(alias = "currentBalance")]
    pub current_balance: RawAmount,
    #[serde(alias = "monthlyRepayment", alias = "repayment")]
    pub monthly_repayment: RawAmount,
    #[serde(alias = "interestRate")]
    pub interest_rate: RawAmount,
}

impl From<DebtAccount> for RawDebt {
    fn from(debt: DebtAccount) -> Self {
        Self {
            name: Some(debt.name),
            current_balance: RawAmount::Number(debt.current_balance),
            monthly_repayment: RawAmount::Number(debt.monthly_repayment),
            interest_rate: RawAmount::Number(debt.interest_rate),
        }
    }
}

/// Persisted bundle for one household: everything the engine consumes, in
/// raw stored shape. `schema_version` gates one-shot migrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdFile {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
    #[serde(default, alias = "manualExpenses", alias = "recurringExpenses")]
    pub recurring_rules: Vec<RawRule>,
    #[serde(default, alias = "incomeHistory")]
    pub income_history: Vec<RawIncomeEntry>,
    #[serde(default)]
    pub debts: Vec<RawDebt>,
}

impl Default for HouseholdFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            transactions: Vec::new(),
            recurring_rules: Vec::new(),
            income_history: Vec::new(),
            debts: Vec::new(),
        }
    }
}

impl HouseholdFile {
    /// Converts the stored bundle into the canonical engine snapshot,
    /// running one-shot migrations when the stored schema predates them.
    pub fn into_snapshot(self, active_period: Option<PeriodKey>) -> Snapshot {
        let mut transactions = normalize_transactions(self.transactions);
        if self.schema_version < SCHEMA_VERSION {
            migrate::heal_legacy_signs(&mut transactions);
        }
        let transactions = migrate::dedupe_imports(transactions);

        let recurring_rules = self
            .recurring_rules
            .into_iter()
            .map(migrate::migrate_rule)
            .collect();

        let mut income_history: Vec<IncomeEntry> = self
            .income_history
            .into_iter()
            .filter_map(normalize_income)
            .collect();
        income_history.sort_by_key(|entry| entry.period);

        let debts = self.debts.into_iter().map(normalize_debt).collect();

        Snapshot {
            transactions,
            income_history,
            recurring_rules,
            debts,
            active_period,
            default_income: None,
        }
    }

    /// Captures canonical state back into the stored shape at the current
    /// schema version. Virtual transactions are synthesized on every read
    /// and are never written back.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            transactions: snapshot
                .transactions
                .iter()
                .filter(|txn| !txn.is_virtual())
                .cloned()
                .map(RawTransaction::from)
                .collect(),
            recurring_rules: snapshot
                .recurring_rules
                .iter()
                .cloned()
                .map(RawRule::from)
                .collect(),
            income_history: snapshot
                .income_history
                .iter()
                .cloned()
                .map(RawIncomeEntry::from)
                .collect(),
            debts: snapshot.debts.iter().cloned().map(RawDebt::from).collect(),
        }
    }
}

/// Normalizes one raw record. Returns `None` when no period information
/// exists at all; such records cannot contribute to any monthly aggregate.
pub fn normalize_transaction(raw: RawTransaction) -> Option<Transaction> {
    let date = raw
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    let period = raw
        .period_key
        .as_deref()
        .and_then(|p| p.parse().ok())
        .or_else(|| raw.date.as_deref().and_then(PeriodKey::from_date_str))
        .or_else(|| date.map(PeriodKey::from_date))?;

    let category = raw
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    let mut kind = raw.kind.as_deref().and_then(TxnKind::parse_label);
    // The old importer tagged income with a bare `type` field. Transfers
    // outrank it, so the hint only applies off the transfer category.
    if kind.is_none()
        && raw.txn_type.as_deref() == Some("income")
        && category != TRANSFERS_CATEGORY
    {
        kind = Some(TxnKind::Income);
    }

    let description = [&raw.description, &raw.merchant, &raw.item]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string();

    Some(Transaction {
        id: raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        date,
        period,
        amount: raw.amount.normalize(),
        kind,
        category,
        description,
        source: raw
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        reference: raw.reference.filter(|r| !r.trim().is_empty()),
        is_manual_category: raw.is_manual_category,
        origin: None,
    })
}

pub fn normalize_transactions(raws: Vec<RawTransaction>) -> Vec<Transaction> {
    let total = raws.len();
    let normalized: Vec<Transaction> = raws
        .into_iter()
        .filter_map(normalize_transaction)
        .collect();
    let dropped = total - normalized.len();
    if dropped > 0 {
        debug!(dropped, "excluded records with no period information");
    }
    normalized
}

fn normalize_income(raw: RawIncomeEntry) -> Option<IncomeEntry> {
    let mut raw_sources = raw.sources;
    let legacy_key = raw_sources
        .remove("periodKey")
        .or_else(|| raw_sources.remove("monthKey"));
    let period = raw
        .date
        .as_deref()
        .and_then(PeriodKey::from_date_str)
        .or_else(|| match legacy_key {
            Some(RawAmount::Text(text)) => PeriodKey::from_date_str(&text),
            _ => None,
        })?;

    // Stored totals drift; the entry's total is always recomputed from its
    // components. Stray identifiers are not components either.
    raw_sources.remove("total");
    raw_sources.remove("id");
    let sources: BTreeMap<String, f64> = raw_sources
        .into_iter()
        .map(|(name, value)| (name, value.normalize()))
        .collect();
    Some(IncomeEntry { period, sources })
}

fn normalize_debt(raw: RawDebt) -> DebtAccount {
    DebtAccount {
        name: raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Debt".to_string()),
        current_balance: raw.current_balance.normalize(),
        monthly_repayment: raw.monthly_repayment.normalize(),
        interest_rate: raw.interest_rate.normalize(),
    }
}
