//! Refresh timing helpers
//!
//! The current rate changes on every slot boundary, and new prices appear
//! shortly after the daily release. Callers sleep until whichever of these
//! comes next.

use crate::rates::SLOT_MINUTES;
use crate::staleness::StalenessPolicy;
use chrono::{DateTime, Duration, DurationRound, Utc};

/// Next `:00` or `:30` strictly after `now`
pub fn next_slot_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let slot = Duration::minutes(SLOT_MINUTES);
    match now.duration_trunc(slot) {
        Ok(floor) => floor + slot,
        Err(_) => now + slot,
    }
}

/// When to refetch for newly published prices: today's release plus `delay`,
/// or tomorrow's if that moment has already passed
pub fn next_publish_fetch(
    now: DateTime<Utc>,
    policy: &StalenessPolicy,
    delay: Duration,
) -> DateTime<Utc> {
    let today = policy.release_on_day_of(now) + delay;
    if today > now {
        return today;
    }
    policy.release_on_day_of(now + Duration::hours(24)) + delay
}
