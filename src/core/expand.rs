//! Expansion of recurring-expense rules into per-month virtual transactions.

use tracing::trace;

use crate::domain::common::PeriodKey;
use crate::domain::recurring::RecurringRule;
use crate::domain::transaction::{Transaction, TxnKind, VirtualOrigin};

/// Produces the virtual transactions that should appear in `period`.
///
/// Each rule yields at most one candidate: inactive rules, periods outside
/// the rule's bounds, and periods disabled by override all yield none. The
/// synthesized amount is sign-flipped to the expense convention.
pub fn expand_rules(period: PeriodKey, rules: &[RecurringRule]) -> Vec<Transaction> {
    rules
        .iter()
        .filter_map(|rule| expand_rule(period, rule))
        .collect()
}

fn expand_rule(period: PeriodKey, rule: &RecurringRule) -> Option<Transaction> {
    if !rule.active || !rule.covers(period) {
        return None;
    }
    if rule.override_for(period).is_some_and(|o| o.disabled) {
        trace!(rule = %rule.id, %period, "rule disabled for period by override");
        return None;
    }
    Some(Transaction {
        // Display id only. Lookups go through `origin`; rule ids may contain
        // dashes, which makes this composite ambiguous to split.
        id: format!("manual-{}-{}", rule.id, period),
        date: Some(period.date_with_day(rule.day)),
        period,
        amount: -rule.effective_amount(period),
        kind: Some(TxnKind::Expense),
        category: rule.effective_category(period).to_string(),
        description: rule.description.clone(),
        source: "manual".into(),
        reference: None,
        is_manual_category: true,
        origin: Some(VirtualOrigin {
            base_id: rule.id.clone(),
            period,
        }),
    })
}

/// Total expected recurring outflow for `period` as a positive magnitude,
/// honoring amount overrides and skipping disabled months.
pub fn recurring_spend(period: PeriodKey, rules: &[RecurringRule]) -> f64 {
    rules
        .iter()
        .filter(|rule| rule.active && rule.covers(period))
        .filter(|rule| !rule.override_for(period).is_some_and(|o| o.disabled))
        .map(|rule| rule.effective_amount(period))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recurring::RuleOverride;

    fn period(raw: &str) -> PeriodKey {
        raw.parse().unwrap()
    }

    fn rent_rule() -> RecurringRule {
        let mut rule = RecurringRule::new("Rent", 50.0, "Rent", 3);
        rule.id = "rent".into();
        rule.start_month = Some(period("2025-01"));
        rule
    }

    #[test]
    fn expands_one_virtual_transaction_inside_bounds() {
        let txns = expand_rules(period("2025-03"), &[rent_rule()]);
        assert_eq!(txns.len(), 1);
        let txn = &txns[0];
        assert_eq!(txn.amount, -50.0);
        assert_eq!(txn.category, "Rent");
        assert_eq!(txn.kind, Some(TxnKind::Expense));
        assert_eq!(txn.id, "manual-rent-2025-03");
        assert_eq!(txn.date.unwrap().to_string(), "2025-03-03");
        let origin = txn.origin.as_ref().unwrap();
        assert_eq!(origin.base_id, "rent");
        assert_eq!(origin.period, period("2025-03"));
    }

    #[test]
    fn respects_start_and_end_bounds() {
        let mut rule = rent_rule();
        rule.end_month = Some(period("2025-04"));
        assert!(expand_rules(period("2024-12"), std::slice::from_ref(&rule)).is_empty());
        assert_eq!(expand_rules(period("2025-04"), std::slice::from_ref(&rule)).len(), 1);
        assert!(expand_rules(period("2025-05"), std::slice::from_ref(&rule)).is_empty());
    }

    #[test]
    fn inactive_rules_expand_to_nothing() {
        let mut rule = rent_rule();
        rule.active = false;
        assert!(expand_rules(period("2025-03"), &[rule]).is_empty());
    }

    #[test]
    fn disabled_override_skips_only_that_period() {
        let mut rule = rent_rule();
        rule.disable_period(period("2025-03"));
        assert!(expand_rules(period("2025-03"), std::slice::from_ref(&rule)).is_empty());
        assert_eq!(expand_rules(period("2025-02"), std::slice::from_ref(&rule)).len(), 1);
    }

    #[test]
    fn overrides_replace_amount_and_category() {
        let mut rule = rent_rule();
        rule.overrides.insert(
            period("2025-03"),
            RuleOverride {
                amount: Some(65.0),
                category: Some("Housing".into()),
                disabled: false,
            },
        );
        let txns = expand_rules(period("2025-03"), std::slice::from_ref(&rule));
        assert_eq!(txns[0].amount, -65.0);
        assert_eq!(txns[0].category, "Housing");
        let unchanged = expand_rules(period("2025-02"), std::slice::from_ref(&rule));
        assert_eq!(unchanged[0].amount, -50.0);
    }

    #[test]
    fn day_past_month_end_clamps() {
        let mut rule = rent_rule();
        rule.day = 31;
        let txns = expand_rules(period("2025-02"), &[rule]);
        assert_eq!(txns[0].date.unwrap().to_string(), "2025-02-28");
    }

    #[test]
    fn at_most_one_candidate_per_rule_per_period() {
        let rule = rent_rule();
        for raw in ["2025-01", "2025-03", "2026-07"] {
            let txns = expand_rules(period(raw), std::slice::from_ref(&rule));
            let count = txns
                .iter()
                .filter(|t| t.origin.as_ref().is_some_and(|o| o.base_id == rule.id))
                .count();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn recurring_spend_honors_overrides_and_disables() {
        let mut rent = rent_rule();
        rent.overrides.insert(
            period("2025-03"),
            RuleOverride {
                amount: Some(65.0),
                ..RuleOverride::default()
            },
        );
        let mut gym = RecurringRule::new("Gym", 25.0, "Health", 1);
        gym.disable_period(period("2025-03"));
        let rules = vec![rent, gym];
        assert_eq!(recurring_spend(period("2025-03"), &rules), 65.0);
        assert_eq!(recurring_spend(period("2025-02"), &rules), 75.0);
    }
}
