use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::PeriodKey;

/// Category label that marks money moving between own accounts.
pub const TRANSFERS_CATEGORY: &str = "Transfers";
/// Category label carrying explicit income intent.
pub const INCOME_CATEGORY: &str = "Income";
/// Categories that mark statement/debt payments rather than spend.
pub const DEBT_CATEGORY: &str = "Debt";
pub const BILLS_PAYMENTS_CATEGORY: &str = "Bills Payments";
/// Fallback category for records the matcher could not place.
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Provenance assumed for imported records that carry no source tag.
pub const DEFAULT_SOURCE: &str = "amex";

/// Cash-flow classification of a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Expense,
    Income,
    Payment,
    Refund,
    Transfer,
}

impl TxnKind {
    /// Lenient label parse for loosely stored records; unknown labels are
    /// treated as unclassified rather than an error.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            "payment" => Some(Self::Payment),
            "refund" => Some(Self::Refund),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Payment => "payment",
            Self::Refund => "refund",
            Self::Transfer => "transfer",
        }
    }
}

/// Links a virtual transaction back to the recurring rule that produced it.
///
/// Carried as a first-class struct so callers never reverse-parse the display
/// id, which is ambiguous when rule ids themselves contain dashes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VirtualOrigin {
    pub base_id: String,
    pub period: PeriodKey,
}

/// A single financial event in canonical shape.
///
/// Sign convention: expenses are negative, income/refunds/payments positive.
/// Every aggregate depends on it; legacy records violating it are corrected
/// once at the ingest boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    /// Calendar date when known. Period-only records keep `None` and sort
    /// after dated ones.
    pub date: Option<NaiveDate>,
    pub period: PeriodKey,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TxnKind>,
    pub category: String,
    pub description: String,
    pub source: String,
    /// Statement reference from the importer, when one exists. Feeds the
    /// import duplicate key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub is_manual_category: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<VirtualOrigin>,
}

impl Transaction {
    /// Creates a manually entered transaction with a fresh identifier.
    pub fn manual(
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date: Some(date),
            period: PeriodKey::from_date(date),
            amount,
            kind: None,
            category: category.into(),
            description: description.into(),
            source: "manual".into(),
            reference: None,
            is_manual_category: true,
            origin: None,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.origin.is_some()
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    /// True when the record moves money between own accounts, by kind or by
    /// category. Such records are excluded from expense totals.
    pub fn is_transfer(&self) -> bool {
        self.kind == Some(TxnKind::Transfer) || self.category == TRANSFERS_CATEGORY
    }

    /// Card provenance covers both live imports (`amex`) and CSV backfills
    /// (`amex_csv`).
    pub fn is_card_source(&self) -> bool {
        self.source.starts_with("amex")
    }
}
