//! verify: confirm that a write has become visible in the authoritative store.
//!
//! Some backends do not offer read-after-write consistency, so after a
//! mutating call returns the client polls the record list until it matches an
//! [`Expectation`] or a fixed number of attempts is used up.
//!
//! ```text
//! Idle ──start──▶ Polling ──match──▶ Verified
//!                    │
//!                    ├──attempts exhausted──▶ TimedOut
//!                    └──cancel──▶ Cancelled
//! ```
//!
//! A failed poll (network error, 5xx) counts as "not yet consistent"; the loop
//! is bounded by attempts, never by errors.

mod verifier;

use std::future::Future;
use std::time::Duration;

use crate::record::Record;

pub use verifier::Verifier;

/// Spacing between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Polls before giving up (54 × 5 s = 4.5 minutes).
pub const MAX_ATTEMPTS: u32 = 54;

/// Poll timing for a [`Verifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

/// What the server's record list must look like for a write to count as landed.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// After a create or delete: the array has exactly this many records.
    Length(usize),
    /// After an update: the record with this id equals this value.
    Record(Record),
}

impl Expectation {
    pub fn is_met(&self, records: &[Record]) -> bool {
        match self {
            Expectation::Length(n) => records.len() == *n,
            Expectation::Record(expected) => records
                .iter()
                .find(|r| r.id == expected.id)
                .is_some_and(|r| r == expected),
        }
    }
}

/// Final result of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Verified { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl Outcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Verified { .. })
    }
}

/// Observable state of the verification loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyState {
    #[default]
    Idle,
    Polling {
        attempt: u32,
    },
    Verified,
    TimedOut,
    Cancelled,
}

impl VerifyState {
    /// Whether the UI should show its "saving" indicator.
    pub fn is_saving(&self) -> bool {
        matches!(self, VerifyState::Polling { .. })
    }
}

impl From<Outcome> for VerifyState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Verified { .. } => VerifyState::Verified,
            Outcome::TimedOut { .. } => VerifyState::TimedOut,
        }
    }
}

/// Call `check` once per `interval`, up to `max_attempts` times, until it
/// returns `true`.
///
/// The first check happens one interval after the call. `check` receives the
/// 1-based attempt number.
pub async fn await_condition<F, Fut>(mut check: F, interval: Duration, max_attempts: u32) -> Outcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 1..=max_attempts {
        tokio::time::sleep(interval).await;
        if check(attempt).await {
            return Outcome::Verified { attempts: attempt };
        }
    }
    Outcome::TimedOut {
        attempts: max_attempts,
    }
}
