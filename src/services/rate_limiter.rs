use std::{num::NonZeroU32, time::Duration};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Pause inserted when the batch runs ahead of its cap
pub const PACING_PAUSE: Duration = Duration::from_millis(10);

/// Soft cap on completions per second, applied on the collecting side.
///
/// It only delays the collection of the next result; requests already in flight are not slowed down.
pub struct CompletionPacer {
    limiter: DefaultDirectRateLimiter,
}

impl CompletionPacer {
    pub fn new(max_per_second: NonZeroU32) -> Self {
        CompletionPacer {
            limiter: RateLimiter::direct(Quota::per_second(max_per_second)),
        }
    }

    /// Counts one completion and returns how long to pause, if at all
    pub fn record_completion(&self) -> Option<Duration> {
        self.limiter.check().is_err().then_some(PACING_PAUSE)
    }
}
