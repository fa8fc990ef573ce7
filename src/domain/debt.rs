use serde::{Deserialize, Serialize};

/// A liability whose scheduled repayment counts as monthly spend.
///
/// Balance and rate are carried for payoff views; the ledger engine only
/// reads `monthly_repayment`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtAccount {
    pub name: String,
    #[serde(default)]
    pub current_balance: f64,
    #[serde(default)]
    pub monthly_repayment: f64,
    #[serde(default)]
    pub interest_rate: f64,
}

impl DebtAccount {
    pub fn new(name: impl Into<String>, monthly_repayment: f64) -> Self {
        Self {
            name: name.into(),
            current_balance: 0.0,
            monthly_repayment,
            interest_rate: 0.0,
        }
    }
}
