//! Cache-backed access to a tariff's slot series
//!
//! Serves from the on-disk cache while the entry is fresh under the daily
//! release rule, otherwise calls the injected fetcher once. Successful,
//! non-empty fetches are cached as the raw records so that normalization can
//! change without refetching. Fetch failures are returned to the caller and
//! never replaced by cached data.

use crate::cache::CacheStore;
use crate::error::FetchError;
use crate::fetch::RateFetcher;
use crate::logging::get_logger;
use crate::rates::{SlotSeries, normalize, normalize_payload};
use crate::staleness::StalenessPolicy;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

type FetchOutcome = Result<SlotSeries, FetchError>;
/// In-flight calls keyed by cache key and whether the call was forced
type InFlight = Mutex<HashMap<(String, bool), broadcast::Sender<FetchOutcome>>>;

/// Day-scoped cache key for a tariff's rates
pub fn rates_cache_key(tariff_code: &str, now: DateTime<Utc>) -> String {
    format!(
        "octopus_rates_{}_{}",
        tariff_code.trim(),
        now.format("%Y-%m-%d")
    )
}

/// Cache + staleness + fetch orchestration
pub struct RateRepository {
    cache: CacheStore,
    policy: StalenessPolicy,
    in_flight: InFlight,
    logger: crate::logging::StructuredLogger,
}

impl RateRepository {
    pub fn new(cache: CacheStore, policy: StalenessPolicy) -> Self {
        Self {
            cache,
            policy,
            in_flight: Mutex::new(HashMap::new()),
            logger: get_logger("repository"),
        }
    }

    pub const fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub const fn policy(&self) -> &StalenessPolicy {
        &self.policy
    }

    /// Rates for `key`, from cache when fresh unless `force` is set
    pub async fn get_rates<F>(
        &self,
        key: &str,
        force: bool,
        fetcher: &F,
        now: DateTime<Utc>,
    ) -> FetchOutcome
    where
        F: RateFetcher + ?Sized,
    {
        if !force {
            if let Some(series) = self.fresh_cached(key, now) {
                return Ok(series);
            }
        } else {
            self.logger
                .debug(&format!("Forced refresh for key '{}'", key));
        }

        let raw = fetcher.fetch_rates().await?;
        let series = normalize(&raw);
        if series.is_empty() {
            self.logger.warn(&format!(
                "Provider returned no usable rates for key '{}' ({} records)",
                key,
                raw.len()
            ));
            return Ok(series);
        }

        if let Err(e) = self.cache.set(key, &serde_json::Value::Array(raw)) {
            self.logger
                .error(&format!("Cache write error for key '{}': {}", key, e));
        }
        self.logger.info(&format!(
            "Fetched {} slots for key '{}'",
            series.len(),
            key
        ));
        Ok(series)
    }

    /// Like [`get_rates`](Self::get_rates), but concurrent calls for the same
    /// key and `force` flag share a single underlying call: the first caller
    /// does the work and overlapping callers receive a copy of its result. If
    /// the first caller is dropped before finishing, waiting callers do their
    /// own call.
    pub async fn get_rates_shared<F>(
        &self,
        key: &str,
        force: bool,
        fetcher: &F,
        now: DateTime<Utc>,
    ) -> FetchOutcome
    where
        F: RateFetcher + ?Sized,
    {
        let leader = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&(key.to_string(), force)) {
                Some(tx) => Err(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    in_flight.insert((key.to_string(), force), tx.clone());
                    Ok(tx)
                }
            }
        };

        match leader {
            Ok(tx) => {
                let registration = InFlightRegistration {
                    in_flight: &self.in_flight,
                    key,
                    force,
                };
                let outcome = self.get_rates(key, force, fetcher, now).await;
                drop(registration);
                let _ = tx.send(outcome.clone());
                outcome
            }
            Err(mut rx) => {
                self.logger
                    .debug(&format!("Joining in-flight request for key '{}'", key));
                match rx.recv().await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        self.logger.debug(&format!(
                            "In-flight request for key '{}' was dropped, fetching directly",
                            key
                        ));
                        self.get_rates(key, force, fetcher, now).await
                    }
                }
            }
        }
    }

    fn fresh_cached(&self, key: &str, now: DateTime<Utc>) -> Option<SlotSeries> {
        let entry = self.cache.get(key)?;
        if self.policy.is_stale(now, entry.written_at) {
            self.logger.info(&format!(
                "Cached rates for key '{}' predate today's release, refetching",
                key
            ));
            return None;
        }
        let series = normalize_payload(&entry.payload);
        if series.is_empty() {
            self.logger.warn(&format!(
                "Cached payload for key '{}' holds no usable rates, refetching",
                key
            ));
            return None;
        }
        self.logger
            .debug(&format!("Rates for key '{}' loaded from cache", key));
        Some(series)
    }
}

/// Removes the in-flight marker when the leading call finishes or is dropped
struct InFlightRegistration<'a> {
    in_flight: &'a InFlight,
    key: &'a str,
    force: bool,
}

impl Drop for InFlightRegistration<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(self.key.to_string(), self.force));
    }
}
