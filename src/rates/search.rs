//! Current-slot lookup and cheapest contiguous window search

use super::types::{RateSlot, SlotSeries};
use chrono::{DateTime, Duration, Utc};

/// Slots per hour of run time
const SLOTS_PER_HOUR: usize = 2;

/// Sums within this many minor units of each other count as equal
const COST_EPSILON: f64 = 1e-9;

/// The slot covering `now`, or `None` before the first slot, after the last,
/// or inside a gap.
pub fn locate(series: &SlotSeries, now: DateTime<Utc>) -> Option<&RateSlot> {
    let slots = series.as_slice();
    // Fixed-width slots sorted by start are also sorted by end
    let idx = slots.partition_point(|s| s.valid_to <= now);
    slots.get(idx).filter(|s| s.covers(now))
}

/// Cheapest contiguous block found by [`find_cheapest_window`]
#[derive(Debug, Clone, PartialEq)]
pub struct CheapestWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Sum of slot prices in major units (GBP/kWh summed per slot)
    pub total_cost: f64,
    pub slot_count: usize,
}

impl CheapestWindow {
    /// Mean unit price across the window
    pub fn average_price(&self) -> f64 {
        if self.slot_count == 0 {
            return 0.0;
        }
        self.total_cost / self.slot_count as f64
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Result of a window search
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Found(CheapestWindow),
    /// Fewer candidate slots than the requested run needs
    InsufficientData { required: usize, available: usize },
}

impl WindowOutcome {
    pub fn window(&self) -> Option<&CheapestWindow> {
        match self {
            Self::Found(w) => Some(w),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Find the cheapest block of `duration_hours` that starts within
/// `horizon_hours` of `now`. Equal-cost blocks resolve to the earliest start.
pub fn find_cheapest_window(
    series: &SlotSeries,
    duration_hours: u32,
    horizon_hours: u32,
    now: DateTime<Utc>,
) -> WindowOutcome {
    let required = duration_hours as usize * SLOTS_PER_HOUR;
    let horizon_end = now + Duration::hours(i64::from(horizon_hours));
    let candidates: Vec<&RateSlot> = series
        .iter()
        .filter(|s| now <= s.valid_from && s.valid_from < horizon_end)
        .collect();

    if required == 0 || candidates.len() < required {
        return WindowOutcome::InsufficientData {
            required,
            available: candidates.len(),
        };
    }

    let mut running: f64 = candidates[..required]
        .iter()
        .map(|s| s.value_inc_vat)
        .sum();
    let mut best_sum = running;
    let mut best_start = 0;

    for entering in required..candidates.len() {
        let leaving = candidates[entering - required];
        running += candidates[entering].value_inc_vat - leaving.value_inc_vat;
        if running < best_sum - COST_EPSILON {
            best_sum = running;
            best_start = entering + 1 - required;
        }
    }

    let first = candidates[best_start];
    let last = candidates[best_start + required - 1];
    // Recompute exactly rather than reporting the drifted running sum
    let total_minor: f64 = candidates[best_start..best_start + required]
        .iter()
        .map(|s| s.value_inc_vat)
        .sum();

    WindowOutcome::Found(CheapestWindow {
        start: first.valid_from,
        end: last.valid_to,
        total_cost: total_minor / 100.0,
        slot_count: required,
    })
}
