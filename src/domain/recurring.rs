use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::PeriodKey;

/// How often a rule generates occurrences. Only monthly cadence exists today;
/// the field makes stored rules self-describing for future cadences.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
}

/// Per-period exception attached to a rule without mutating its template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

/// User-defined template that generates at most one virtual transaction per
/// valid, non-disabled month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringRule {
    pub id: String,
    pub description: String,
    /// Positive magnitude; the expander flips the sign to the expense
    /// convention.
    pub amount: f64,
    pub category: String,
    /// Day-of-month for the synthesized date.
    #[serde(default = "default_day")]
    pub day: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<PeriodKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_month: Option<PeriodKey>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub overrides: BTreeMap<PeriodKey, RuleOverride>,
}

fn default_day() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

impl RecurringRule {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        day: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
            category: category.into(),
            day,
            active: true,
            start_month: None,
            end_month: None,
            frequency: Frequency::Monthly,
            overrides: BTreeMap::new(),
        }
    }

    pub fn override_for(&self, period: PeriodKey) -> Option<&RuleOverride> {
        self.overrides.get(&period)
    }

    /// True when `period` falls inside the rule's inclusive validity bounds.
    pub fn covers(&self, period: PeriodKey) -> bool {
        if let Some(start) = self.start_month {
            if period < start {
                return false;
            }
        }
        if let Some(end) = self.end_month {
            if period > end {
                return false;
            }
        }
        true
    }

    /// Effective positive magnitude for `period`, honoring an amount override.
    pub fn effective_amount(&self, period: PeriodKey) -> f64 {
        self.override_for(period)
            .and_then(|o| o.amount)
            .unwrap_or(self.amount)
    }

    /// Effective category for `period`, honoring a category override.
    pub fn effective_category(&self, period: PeriodKey) -> &str {
        self.override_for(period)
            .and_then(|o| o.category.as_deref())
            .unwrap_or(&self.category)
    }

    /// "Deleting for one month" writes a disabled override; the template is
    /// never removed.
    pub fn disable_period(&mut self, period: PeriodKey) {
        self.overrides.entry(period).or_default().disabled = true;
    }
}
