use crate::config::BandsConfig;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length of every pricing slot in minutes
pub const SLOT_MINUTES: i64 = 30;

/// Length of every pricing slot
pub fn slot_length() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

/// A fixed 30-minute pricing period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSlot {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    /// Published unit rate including VAT, in minor units (pence/kWh)
    pub value_inc_vat: f64,
}

impl RateSlot {
    /// Unit price in major units (GBP/kWh); may be negative
    pub fn price(&self) -> f64 {
        self.value_inc_vat / 100.0
    }

    /// Whether `instant` falls inside `[valid_from, valid_to)`
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.valid_from <= instant && instant < self.valid_to
    }

    /// Provider-shaped record for this slot
    pub fn to_raw(&self) -> serde_json::Value {
        serde_json::json!({
            "valid_from": self.valid_from.to_rfc3339_opts(SecondsFormat::Secs, true),
            "valid_to": self.valid_to.to_rfc3339_opts(SecondsFormat::Secs, true),
            "value_inc_vat": self.value_inc_vat,
        })
    }
}

/// Chronologically ordered slots with unique start times
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlotSeries {
    slots: Vec<RateSlot>,
}

impl SlotSeries {
    /// Build a series from arbitrary slots: sorted by start, later duplicates win
    pub fn from_slots<I: IntoIterator<Item = RateSlot>>(slots: I) -> Self {
        let by_start = slots
            .into_iter()
            .fold(BTreeMap::new(), |mut acc, slot| {
                acc.insert(slot.valid_from, slot);
                acc
            });
        Self {
            slots: by_start.into_values().collect(),
        }
    }

    pub fn as_slice(&self) -> &[RateSlot] {
        &self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RateSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn first(&self) -> Option<&RateSlot> {
        self.slots.first()
    }

    pub fn last(&self) -> Option<&RateSlot> {
        self.slots.last()
    }

    /// End of the last published slot
    pub fn covered_until(&self) -> Option<DateTime<Utc>> {
        self.slots.last().map(|s| s.valid_to)
    }

    /// Slots starting in `[from, from + span)`
    pub fn upcoming(&self, from: DateTime<Utc>, span: Duration) -> Self {
        let until = from + span;
        Self {
            slots: self
                .slots
                .iter()
                .filter(|s| from <= s.valid_from && s.valid_from < until)
                .cloned()
                .collect(),
        }
    }

    /// Provider-shaped records for every slot
    pub fn to_raw(&self) -> Vec<serde_json::Value> {
        self.slots.iter().map(RateSlot::to_raw).collect()
    }
}

impl<'a> IntoIterator for &'a SlotSeries {
    type Item = &'a RateSlot;
    type IntoIter = std::slice::Iter<'a, RateSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

/// Coarse price classification for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBand {
    Negative,
    Low,
    Medium,
    High,
}

impl PriceBand {
    /// Classify a GBP/kWh price against the configured thresholds
    pub fn classify(price: f64, bands: &BandsConfig) -> Self {
        if price < 0.0 {
            Self::Negative
        } else if price < bands.low_below {
            Self::Low
        } else if price < bands.medium_below {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "NEGATIVE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}
