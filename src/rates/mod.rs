//! Half-hourly unit rates
//!
//! Canonical slot series, the normalizer that builds them from raw provider
//! records, and the two queries run against them: which slot is active now,
//! and where the cheapest contiguous block lies.

pub mod normalize;
pub mod search;
pub mod types;

pub use normalize::{normalize, normalize_payload};
pub use search::{CheapestWindow, WindowOutcome, find_cheapest_window, locate};
pub use types::{PriceBand, RateSlot, SLOT_MINUTES, SlotSeries, slot_length};
