//! "Effective as of" resolution over the income history.

use crate::domain::common::PeriodKey;
use crate::domain::income::IncomeEntry;

/// Finds the entry in force for `period`: the latest entry dated on or
/// before it, because an income change persists until superseded. Periods
/// before the first entry fall back to the earliest one; `None` only when
/// the history is empty.
pub fn effective_entry(period: PeriodKey, history: &[IncomeEntry]) -> Option<&IncomeEntry> {
    history
        .iter()
        .filter(|entry| entry.period <= period)
        .max_by_key(|entry| entry.period)
        .or_else(|| history.iter().min_by_key(|entry| entry.period))
}

/// Monthly income total in force for `period`, with `fallback` covering an
/// empty history.
pub fn effective_total(
    period: PeriodKey,
    history: &[IncomeEntry],
    fallback: Option<&IncomeEntry>,
) -> f64 {
    effective_entry(period, history)
        .or(fallback)
        .map(IncomeEntry::total)
        .unwrap_or(0.0)
}
