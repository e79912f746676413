//! Publish-time-aware cache staleness
//!
//! The provider publishes the next day's prices once a day at a fixed time.
//! A cached entry written before today's publish instant becomes stale the
//! moment that instant passes; anything else is fresh. Cache keys are
//! expected to be day-scoped, so crossing midnight invalidates them anyway.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Daily-release staleness rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    release_time: NaiveTime,
    timezone: Tz,
}

impl StalenessPolicy {
    /// Release time expressed as a UTC time of day
    pub const fn new(release_time: NaiveTime) -> Self {
        Self {
            release_time,
            timezone: Tz::UTC,
        }
    }

    /// Release time expressed in the provider's local zone
    pub const fn with_timezone(release_time: NaiveTime, timezone: Tz) -> Self {
        Self {
            release_time,
            timezone,
        }
    }

    pub const fn release_time(&self) -> NaiveTime {
        self.release_time
    }

    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Release instant on the local calendar day containing `now`
    pub fn release_on_day_of(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_day = now.with_timezone(&self.timezone).date_naive();
        let local_release = local_day.and_time(self.release_time);
        match self.timezone.from_local_datetime(&local_release).earliest() {
            Some(dt) => dt.with_timezone(&Utc),
            // Release falls in a DST gap; the wall clock jumps forward an hour
            None => self
                .timezone
                .from_local_datetime(&(local_release + Duration::hours(1)))
                .earliest()
                .map_or_else(
                    || Utc.from_utc_datetime(&local_release),
                    |dt| dt.with_timezone(&Utc),
                ),
        }
    }

    /// Next release instant strictly after `now`
    pub fn next_release_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.release_on_day_of(now);
        if today > now {
            return today;
        }
        self.release_on_day_of(today + Duration::hours(24))
    }

    /// Whether an entry written at `written_at` predates a release that has
    /// already happened today
    pub fn is_stale(&self, now: DateTime<Utc>, written_at: DateTime<Utc>) -> bool {
        let release = self.release_on_day_of(now);
        now >= release && written_at < release
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn release_in_local_zone_shifts_with_dst() {
        let policy = StalenessPolicy::with_timezone(
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            chrono_tz::Europe::London,
        );
        // GMT in winter
        let winter = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            policy.release_on_day_of(winter),
            Utc.with_ymd_and_hms(2025, 1, 15, 16, 0, 0).unwrap()
        );
        // BST in summer: 16:00 local is 15:00 UTC
        let summer = Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap();
        assert_eq!(
            policy.release_on_day_of(summer),
            Utc.with_ymd_and_hms(2025, 7, 15, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_release_rolls_to_tomorrow() {
        let policy = StalenessPolicy::default();
        assert_eq!(policy.next_release_after(at(10, 0)), at(16, 0));
        assert_eq!(
            policy.next_release_after(at(16, 0)),
            Utc.with_ymd_and_hms(2025, 1, 16, 16, 0, 0).unwrap()
        );
    }

    #[test]
    fn written_yesterday_is_stale_after_release() {
        let policy = StalenessPolicy::default();
        let yesterday = Utc.with_ymd_and_hms(2025, 1, 14, 18, 0, 0).unwrap();
        assert!(policy.is_stale(at(16, 30), yesterday));
        assert!(!policy.is_stale(at(9, 0), yesterday));
    }
}
