//! One-shot upgrades applied when a stored household file is opened: the
//! legacy recurring-rule schema, the signed-amount convention, and the
//! import duplicate key.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::amount::RawAmount;
use crate::core::classify;
use crate::domain::recurring::{Frequency, RecurringRule, RuleOverride};
use crate::domain::transaction::{
    Transaction, TxnKind, BILLS_PAYMENTS_CATEGORY, DEBT_CATEGORY, INCOME_CATEGORY,
    TRANSFERS_CATEGORY,
};

/// Placeholder category written by early versions for hand-entered rules.
const LEGACY_PLACEHOLDER_CATEGORY: &str = "Manual";
const DEFAULT_RULE_CATEGORY: &str = "Recurring";

/// A recurring-expense rule as stored, in either the current or the legacy
/// shape. Legacy spellings are absorbed via aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawRule {
    pub id: Option<String>,
    pub description: Option<String>,
    pub amount: RawAmount,
    pub category: Option<String>,
    pub day: Option<u32>,
    pub active: Option<bool>,
    #[serde(alias = "startMonth", alias = "startPeriodKey")]
    pub start_month: Option<String>,
    #[serde(alias = "endMonth", alias = "endPeriodKey")]
    pub end_month: Option<String>,
    pub frequency: Option<Frequency>,
    pub overrides: Option<BTreeMap<String, RuleOverride>>,
}

impl From<RecurringRule> for RawRule {
    fn from(rule: RecurringRule) -> Self {
        Self {
            id: Some(rule.id),
            description: Some(rule.description),
            amount: RawAmount::Number(rule.amount),
            category: Some(rule.category),
            day: Some(rule.day),
            active: Some(rule.active),
            start_month: rule.start_month.map(|p| p.to_string()),
            end_month: rule.end_month.map(|p| p.to_string()),
            frequency: Some(rule.frequency),
            overrides: Some(
                rule.overrides
                    .into_iter()
                    .map(|(period, o)| (period.to_string(), o))
                    .collect(),
            ),
        }
    }
}

/// Upgrades a stored rule to the current schema.
///
/// Idempotent: a rule already carrying both `frequency` and an `overrides`
/// key (even empty) is treated as current and passes through unchanged.
pub fn migrate_rule(raw: RawRule) -> RecurringRule {
    let is_current = raw.frequency.is_some() && raw.overrides.is_some();

    let mut category = raw
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RULE_CATEGORY.to_string());
    if !is_current && category == LEGACY_PLACEHOLDER_CATEGORY {
        category = DEFAULT_RULE_CATEGORY.to_string();
    }

    let mut overrides = BTreeMap::new();
    for (key, entry) in raw.overrides.unwrap_or_default() {
        match key.parse() {
            Ok(period) => {
                overrides.insert(period, entry);
            }
            Err(_) => debug!(%key, "dropping override keyed to an unparseable period"),
        }
    }

    RecurringRule {
        id: raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        description: raw.description.unwrap_or_default(),
        amount: raw.amount.normalize(),
        category,
        day: raw.day.unwrap_or(1),
        active: raw.active.unwrap_or(true),
        start_month: raw.start_month.as_deref().and_then(|p| p.parse().ok()),
        end_month: raw.end_month.as_deref().and_then(|p| p.parse().ok()),
        frequency: raw.frequency.unwrap_or_default(),
        overrides,
    }
}

/// Corrects legacy records stored before the signed-amount convention: a
/// positive amount with no explicit kind and no income-like signal is an
/// expense that was stored unsigned. Returns how many records were flipped.
///
/// Runs once per store, gated on the file's schema version, never per read.
pub fn heal_legacy_signs(transactions: &mut [Transaction]) -> usize {
    let mut healed = 0;
    for txn in transactions.iter_mut() {
        if txn.amount <= 0.0 || txn.kind.is_some() {
            continue;
        }
        let special = [
            INCOME_CATEGORY,
            TRANSFERS_CATEGORY,
            DEBT_CATEGORY,
            BILLS_PAYMENTS_CATEGORY,
        ];
        if special.contains(&txn.category.as_str()) {
            continue;
        }
        if classify::has_income_keyword(&txn.description.to_lowercase()) {
            continue;
        }
        txn.amount = -txn.amount;
        txn.kind = Some(TxnKind::Expense);
        healed += 1;
    }
    if healed > 0 {
        debug!(healed, "flipped legacy unsigned expenses to the signed convention");
    }
    healed
}

/// Composite identity used to drop re-imported statement rows: the statement
/// reference when present, else date, amount to the cent, normalized
/// description, and provenance.
pub fn import_key(txn: &Transaction) -> String {
    if let Some(reference) = txn.reference.as_deref().filter(|r| !r.trim().is_empty()) {
        return format!("ref:{}", reference.trim());
    }
    let date = txn
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| txn.period.to_string());
    let description = txn
        .description
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    format!("{date}|{:.2}|{description}|{}", txn.amount, txn.source)
}

/// Keeps the first occurrence per import key, in input order.
pub fn dedupe_imports(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(transactions.len());
    for txn in transactions {
        let key = import_key(&txn);
        if seen.insert(key) {
            kept.push(txn);
        } else {
            debug!(id = %txn.id, "dropping re-imported duplicate");
        }
    }
    kept
}
