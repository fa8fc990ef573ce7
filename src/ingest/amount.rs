use serde::{Deserialize, Serialize};

/// A loosely typed amount as it arrives from imports or legacy stores: a
/// number, a currency-formatted string, or nothing at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawAmount {
    /// Collapses to a finite signed value. Dirty import data must not crash
    /// anything downstream, so every non-numeric shape becomes zero.
    pub fn normalize(&self) -> f64 {
        match self {
            RawAmount::Number(value) if value.is_finite() => *value,
            RawAmount::Number(_) => 0.0,
            RawAmount::Text(raw) => parse_loose(raw),
            RawAmount::Missing => 0.0,
        }
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

/// Strips currency formatting and parses what is left. `"$1,234.56"` becomes
/// `1234.56`; junk becomes `0.0`.
fn parse_loose(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
