//! Periodic redraw requests, independent of message traffic.

use crossbeam::channel;
use std::time::{Duration, Instant};

/// Period used when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Fires a redraw request every `interval` for as long as it is alive.
/// The underlying ticker re-arms itself after each firing.
pub struct RefreshScheduler {
    interval: Duration,
    ticker: channel::Receiver<Instant>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL)
    }
}

impl RefreshScheduler {
    /// A zero `interval` would spin, so it is raised to one second.
    pub fn new(interval: Duration) -> RefreshScheduler {
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        RefreshScheduler {
            interval,
            ticker: channel::tick(interval),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Receiver to `select!` on; yields the firing time of each tick.
    pub fn receiver(&self) -> &channel::Receiver<Instant> {
        &self.ticker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_repeatedly() {
        let scheduler = RefreshScheduler::new(Duration::from_millis(10));
        let mut last = None;
        for _ in 0..3 {
            let fired = scheduler
                .receiver()
                .recv_timeout(Duration::from_secs(2))
                .expect("tick");
            if let Some(prev) = last {
                assert!(fired > prev);
            }
            last = Some(fired);
        }
    }

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(
            RefreshScheduler::new(Duration::ZERO).interval(),
            Duration::from_secs(1)
        );
        assert_eq!(RefreshScheduler::default().interval(), DEFAULT_REFRESH_INTERVAL);
    }
}
