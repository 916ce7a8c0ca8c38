//! Countdown and poll timers
//!
//! Timers never touch game state. The countdown posts its generation number
//! back to the engine task, which decides whether it is still current.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};

/// The per-turn countdown. At most one sleep is pending at any time.
#[derive(Debug)]
pub struct Countdown {
    tx: mpsc::UnboundedSender<u64>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new(tx: mpsc::UnboundedSender<u64>) -> Self {
        Self { tx, task: None }
    }

    /// Cancel any pending countdown and start a new one
    pub fn restart(&mut self, generation: u64, delay_ms: u32) {
        self.stop();
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            time::sleep(Duration::from_millis(u64::from(delay_ms))).await;
            let _ = tx.send(generation);
        }));
    }

    /// Cancel the pending countdown. Safe to call when none is pending.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fixed-cadence ticker for the leaderboard poll
pub fn poll_interval(period: Duration) -> Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expiry_carries_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(tx);
        countdown.restart(7, 1000);
        assert_eq!(rx.recv().await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(tx);
        countdown.restart(1, 1000);
        countdown.restart(2, 5000);

        time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(rx.try_recv().ok(), Some(2));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(tx);
        countdown.stop();
        countdown.restart(1, 1000);
        countdown.stop();
        countdown.stop();
        assert!(!countdown.is_pending());

        time::sleep(Duration::from_millis(2000)).await;
        assert!(rx.try_recv().is_err());
    }
}
