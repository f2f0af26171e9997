//! Bookkeeping for the periodic catalog sync.
//!
//! The terminal loop owns one [`SyncTracker`]. Each request gets a
//! generation number; only the newest generation's result is applied, and a
//! periodic tick never starts a second request while one is in flight.

use std::time::{Duration, Instant};

/// What to do with a finished sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCompletion {
    Apply,
    /// A newer request was started after this one; drop its result.
    Discard,
}

#[derive(Debug, Clone)]
pub struct SyncTracker {
    interval: Duration,
    latest: u64,
    in_flight: bool,
    last_started: Option<Instant>,
    last_applied: Option<Instant>,
}

impl SyncTracker {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            latest: 0,
            in_flight: false,
            last_started: None,
            last_applied: None,
        }
    }

    /// `true` when no request is in flight and `interval` has passed since
    /// the last one started (or none has).
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        if self.in_flight {
            return false;
        }
        self.last_started
            .is_none_or(|started| now.saturating_duration_since(started) >= self.interval)
    }

    /// Starts a periodic request if one is due, returning its generation.
    pub fn begin(&mut self, now: Instant) -> Option<u64> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.start(now))
    }

    /// Starts a request unconditionally. Any request already in flight is
    /// superseded and its result will be discarded.
    pub fn force(&mut self, now: Instant) -> u64 {
        if self.in_flight {
            tracing::debug!(superseded = self.latest, "sync superseded by forced refresh");
        }
        self.start(now)
    }

    fn start(&mut self, now: Instant) -> u64 {
        self.latest += 1;
        self.in_flight = true;
        self.last_started = Some(now);
        self.latest
    }

    /// Records that `generation` finished and says whether to apply it.
    pub fn complete(&mut self, generation: u64, now: Instant) -> SyncCompletion {
        if generation != self.latest {
            tracing::debug!(generation, latest = self.latest, "discarding stale sync result");
            return SyncCompletion::Discard;
        }
        self.in_flight = false;
        self.last_applied = Some(now);
        SyncCompletion::Apply
    }

    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn last_applied(&self) -> Option<Instant> {
        self.last_applied
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(30);

    #[test]
    fn first_sync_is_due_immediately() {
        let tracker = SyncTracker::new(INTERVAL);
        assert!(tracker.is_due(Instant::now()));
    }

    #[test]
    fn in_flight_suppresses_periodic_trigger() {
        let t0 = Instant::now();
        let mut tracker = SyncTracker::new(INTERVAL);
        assert_eq!(tracker.begin(t0), Some(1));
        assert!(tracker.in_flight());
        assert_eq!(tracker.begin(t0 + INTERVAL * 3), None);
    }

    #[test]
    fn next_sync_waits_for_interval() {
        let t0 = Instant::now();
        let mut tracker = SyncTracker::new(INTERVAL);
        let g = tracker.begin(t0).expect("due");
        assert_eq!(tracker.complete(g, t0), SyncCompletion::Apply);

        assert_eq!(tracker.begin(t0 + Duration::from_secs(10)), None);
        assert_eq!(tracker.begin(t0 + INTERVAL), Some(2));
    }

    #[test]
    fn forced_refresh_supersedes_in_flight_request() {
        let t0 = Instant::now();
        let mut tracker = SyncTracker::new(INTERVAL);
        let old = tracker.begin(t0).expect("due");
        let new = tracker.force(t0);
        assert!(new > old);

        assert_eq!(tracker.complete(old, t0), SyncCompletion::Discard);
        assert!(tracker.in_flight(), "newer request still pending");
        assert_eq!(tracker.complete(new, t0), SyncCompletion::Apply);
        assert!(!tracker.in_flight());
        assert_eq!(tracker.last_applied(), Some(t0));
    }

    #[test]
    fn late_stale_result_after_newer_applied_is_discarded() {
        let t0 = Instant::now();
        let mut tracker = SyncTracker::new(INTERVAL);
        let old = tracker.begin(t0).expect("due");
        let new = tracker.force(t0);
        assert_eq!(tracker.complete(new, t0), SyncCompletion::Apply);
        assert_eq!(tracker.complete(old, t0), SyncCompletion::Discard);
        assert!(!tracker.in_flight());
    }
}
