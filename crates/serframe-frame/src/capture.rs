//! Capture timestamps and backlog suppression.
//!
//! Readings carry no time on the wire. The host stamps each one when its frame
//! validates. USB-serial bridges queue up frames while nobody is listening, so
//! the first few readings of a session arrive in a burst that does not reflect
//! when they were measured; [`BacklogFilter`] drops them.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::codec::Reading;

/// Default minimum spacing between admitted samples.
pub const DEFAULT_BACKLOG_WINDOW: Duration = Duration::from_millis(100);

/// Source of capture timestamps.
pub trait Clock {
    /// Current time. Called once per validated frame.
    fn now(&self) -> SystemTime;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

impl<F: Fn() -> SystemTime> Clock for F {
    fn now(&self) -> SystemTime {
        self()
    }
}

/// A reading stamped with the time its frame validated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// When the frame carrying this reading passed its checksum.
    pub captured_at: SystemTime,
    /// Decoded frame payload.
    pub reading: Reading,
}

impl Sample {
    /// Pair a reading with its capture time.
    pub fn new(captured_at: SystemTime, reading: Reading) -> Self {
        Self {
            captured_at,
            reading,
        }
    }

    /// Capture time as fractional seconds since the Unix epoch.
    pub fn unix_seconds(&self) -> f64 {
        match self.captured_at.duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_secs_f64(),
            Err(before) => -before.duration().as_secs_f64(),
        }
    }
}

/// Drops samples that arrive less than `min_interval` after the last admitted
/// one (or after the session start, for the first).
///
/// Build one per session. A clock that steps backwards counts as "too soon".
#[derive(Debug, Clone)]
pub struct BacklogFilter {
    last: SystemTime,
    min_interval: Duration,
    dropped: u64,
}

impl BacklogFilter {
    /// Create a filter for a session that started at `start`.
    pub fn new(start: SystemTime, min_interval: Duration) -> Self {
        Self {
            last: start,
            min_interval,
            dropped: 0,
        }
    }

    /// Decide whether a sample captured at `now` is kept.
    pub fn admit(&mut self, now: SystemTime) -> bool {
        let too_soon = match now.duration_since(self.last) {
            Ok(elapsed) => elapsed < self.min_interval,
            Err(_) => true,
        };
        if too_soon {
            self.dropped += 1;
            return false;
        }
        self.last = now;
        true
    }

    /// Samples rejected so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Minimum spacing this filter enforces.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
