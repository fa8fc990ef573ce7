//! Cash-flow kind classification.

use once_cell::sync::Lazy;

use crate::domain::transaction::{
    Transaction, TxnKind, BILLS_PAYMENTS_CATEGORY, DEBT_CATEGORY, INCOME_CATEGORY,
    TRANSFERS_CATEGORY,
};

/// Statement/payment wording seen on card and bank feeds.
static PAYMENT_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "direct debit",
        "bpay",
        "card payment",
        "amex payment",
        "payment received",
        "payment thank you",
        "autopay",
    ]
});

/// Wording that marks money arriving. Only trusted alongside a positive
/// amount; a negative "salary sacrifice" stays an expense.
static INCOME_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "salary",
        "payroll",
        "wages",
        "deposit",
        "transfer in",
        "tax refund",
        "bonus",
    ]
});

pub(crate) fn has_payment_keyword(text: &str) -> bool {
    PAYMENT_KEYWORDS.iter().any(|kw| text.contains(kw))
}

pub(crate) fn has_income_keyword(text: &str) -> bool {
    INCOME_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// Resolves a transaction's cash-flow kind.
///
/// An explicit kind is returned unchanged, so re-running classification can
/// never flip an already-classified record. Otherwise: categories outrank
/// description keywords, which outrank sign defaults. The ordering keeps a
/// salary deposit from reading as a generic refund.
pub fn classify(txn: &Transaction) -> TxnKind {
    if let Some(kind) = txn.kind {
        return kind;
    }
    if txn.category == TRANSFERS_CATEGORY {
        return TxnKind::Transfer;
    }
    if txn.category == INCOME_CATEGORY {
        return TxnKind::Income;
    }
    if txn.category == DEBT_CATEGORY || txn.category == BILLS_PAYMENTS_CATEGORY {
        return TxnKind::Payment;
    }
    let description = txn.description.to_lowercase();
    if has_payment_keyword(&description) {
        return TxnKind::Payment;
    }
    if has_income_keyword(&description) && txn.amount > 0.0 {
        return TxnKind::Income;
    }
    if txn.amount < 0.0 {
        TxnKind::Expense
    } else if txn.amount > 0.0 {
        // Unexplained positive amounts default to returns/credits.
        TxnKind::Refund
    } else {
        TxnKind::Expense
    }
}

/// Returns the transaction with its kind resolved. A no-op for records that
/// already carry one.
pub fn with_kind(mut txn: Transaction) -> Transaction {
    txn.kind = Some(classify(&txn));
    txn
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::common::PeriodKey;

    fn txn(amount: f64, category: &str, description: &str) -> Transaction {
        Transaction {
            id: "t1".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 5),
            period: "2025-03".parse::<PeriodKey>().unwrap(),
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

    #[test]
    fn explicit_kind_is_returned_unchanged() {
        let mut t = txn(-45.0, "Groceries", "Woolworths");
        t.kind = Some(TxnKind::Refund);
        assert_eq!(classify(&t), TxnKind::Refund);
        assert_eq!(classify(&with_kind(t)), TxnKind::Refund);
    }

    #[test]
    fn classification_is_idempotent() {
        let t = txn(120.0, "Dining Out", "Unknown");
        let once = with_kind(t);
        let twice = with_kind(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn transfers_category_wins_over_everything() {
        let t = txn(500.0, "Transfers", "salary deposit");
        assert_eq!(classify(&t), TxnKind::Transfer);
    }

    #[test]
    fn income_category_beats_keywords_and_sign() {
        assert_eq!(classify(&txn(-10.0, "Income", "adjustment")), TxnKind::Income);
    }

    #[test]
    fn debt_and_bills_categories_classify_as_payment() {
        assert_eq!(classify(&txn(1200.0, "Debt", "statement")), TxnKind::Payment);
        assert_eq!(
            classify(&txn(300.0, "Bills Payments", "council rates")),
            TxnKind::Payment
        );
    }

    #[test]
    fn payment_keywords_beat_income_keywords() {
        let t = txn(850.0, "Misc", "BPAY salary card payment");
        assert_eq!(classify(&t), TxnKind::Payment);
    }

    #[test]
    fn income_keyword_requires_positive_amount() {
        assert_eq!(classify(&txn(4200.0, "Misc", "ACME Payroll")), TxnKind::Income);
        assert_eq!(classify(&txn(-42.0, "Misc", "payroll giving")), TxnKind::Expense);
    }

    #[test]
    fn sign_defaults_apply_last() {
        assert_eq!(classify(&txn(-45.0, "Groceries", "")), TxnKind::Expense);
        assert_eq!(classify(&txn(120.0, "Dining Out", "Unknown")), TxnKind::Refund);
        assert_eq!(classify(&txn(0.0, "Misc", "")), TxnKind::Expense);
    }
}
