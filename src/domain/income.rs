use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::common::PeriodKey;

/// A point-in-time income configuration, effective from its period onward
/// until superseded by a later entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeEntry {
    pub period: PeriodKey,
    /// Named salary/other components. Household member names are data here,
    /// not schema.
    #[serde(default)]
    pub sources: BTreeMap<String, f64>,
}

impl IncomeEntry {
    pub fn new(period: PeriodKey) -> Self {
        Self {
            period,
            sources: BTreeMap::new(),
        }
    }

    pub fn with_source(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.sources.insert(name.into(), amount);
        self
    }

    /// Total monthly income, always recomputed from components so a stale
    /// stored total cannot drift.
    pub fn total(&self) -> f64 {
        self.sources.values().sum()
    }
}
