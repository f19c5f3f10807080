//! Cancelable one-second countdown.
//!
//! The countdown only produces tick messages. Whoever owns the engine
//! receives them and applies each one through [`crate::engine::TestEngine::tick`],
//! so all session state is still mutated from a single place.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Receiving end of a countdown. Yields `None` once the countdown is
/// cancelled and any already-sent ticks have been drained.
pub type Ticks = mpsc::UnboundedReceiver<()>;

/// A repeating scheduled task that can be cancelled exactly once.
///
/// Cancelling again is a no-op, and dropping the countdown cancels it.
#[derive(Debug)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    /// Start ticking on the current tokio runtime. The first tick arrives one
    /// `period` after the call; a late tick delays the schedule instead of
    /// bursting.
    pub fn spawn(period: Duration) -> (Self, Ticks) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        (
            Self {
                handle: Some(handle),
            },
            rx,
        )
    }

    /// Stop the countdown.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("countdown cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Format seconds as `M:SS` (minutes unpadded).
pub fn format_time(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(75), "1:15");
        assert_eq!(format_time(5), "0:05");
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(600), "10:00");
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let start = Instant::now();
        let (_countdown, mut ticks) = Countdown::spawn(TICK_PERIOD);

        ticks.recv().await.unwrap();
        let first = start.elapsed();
        assert!(first >= TICK_PERIOD && first < TICK_PERIOD * 2, "{first:?}");

        ticks.recv().await.unwrap();
        ticks.recv().await.unwrap();
        let third = start.elapsed();
        assert!(third >= TICK_PERIOD * 3 && third < TICK_PERIOD * 4, "{third:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks_and_is_idempotent() {
        let (mut countdown, mut ticks) = Countdown::spawn(TICK_PERIOD);
        ticks.recv().await.unwrap();

        countdown.cancel();
        assert!(countdown.is_cancelled());
        countdown.cancel();

        assert!(ticks.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let (countdown, mut ticks) = Countdown::spawn(TICK_PERIOD);
        drop(countdown);
        assert!(ticks.recv().await.is_none());
    }
}
