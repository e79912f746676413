//! Countdown to the start of a chosen window
//!
//! A scheduler holds at most one ticking task. Each second it reports the
//! time left until its target, and reports `Reached` once the target has
//! passed, after which the task ends. Arming again cancels the previous task
//! before starting a new one.

use crate::logging::get_logger;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Source of the current instant
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Time left, or the terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Counting(Duration),
    Reached,
}

/// One countdown update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownState {
    pub target: DateTime<Utc>,
    pub remaining: Remaining,
}

impl CountdownState {
    pub const fn is_reached(&self) -> bool {
        matches!(self.remaining, Remaining::Reached)
    }
}

/// Cancellable one-second countdown.
///
/// Must be armed from within a Tokio runtime.
pub struct CountdownScheduler {
    tx: mpsc::UnboundedSender<CountdownState>,
    handle: Option<JoinHandle<()>>,
    /// Bumped on every cancel; ticks only send while it still matches
    generation: Arc<Mutex<u64>>,
    clock: Clock,
    period: std::time::Duration,
    logger: crate::logging::StructuredLogger,
}

impl CountdownScheduler {
    /// Scheduler driven by the system clock
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CountdownState>) {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Scheduler driven by a custom clock
    pub fn with_clock(clock: Clock) -> (Self, mpsc::UnboundedReceiver<CountdownState>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            handle: None,
            generation: Arc::new(Mutex::new(0)),
            clock,
            period: std::time::Duration::from_secs(1),
            logger: get_logger("countdown"),
        };
        (scheduler, rx)
    }

    /// Start counting down to `target`, replacing any active countdown
    pub fn arm(&mut self, target: DateTime<Utc>) {
        let generation = self.supersede();

        if target <= (self.clock)() {
            self.logger
                .debug(&format!("Target {} already passed", target));
            let _ = self.tx.send(CountdownState {
                target,
                remaining: Remaining::Reached,
            });
            return;
        }

        self.logger.debug(&format!("Counting down to {}", target));
        let tx = self.tx.clone();
        let current = Arc::clone(&self.generation);
        let clock = Arc::clone(&self.clock);
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let remaining = target - clock();
                let reached = remaining <= Duration::zero();
                let state = CountdownState {
                    target,
                    remaining: if reached {
                        Remaining::Reached
                    } else {
                        Remaining::Counting(remaining)
                    },
                };
                let stop = {
                    let live = current.lock().unwrap_or_else(PoisonError::into_inner);
                    *live != generation || tx.send(state).is_err()
                };
                if stop || reached {
                    break;
                }
            }
        }));
    }

    /// Stop the active countdown, if any. No update from it is sent once
    /// this returns.
    pub fn cancel(&mut self) {
        self.supersede();
    }

    fn supersede(&mut self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        *generation
    }

    /// Whether a countdown task is still running
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CountdownScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `HH:MM:SS` rendering of a remaining duration
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
