use log::{debug, info};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Re-runs a refresh cycle on a fixed interval.
///
/// The first cycle runs immediately. A cycle that overruns the interval
/// delays the next tick instead of triggering a burst of catch-up runs.
pub struct RefreshScheduler {
    interval: Duration,
    max_cycles: Option<usize>,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval, max_cycles: None }
    }

    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Runs `cycle` until `max_cycles` is reached or `shutdown` resolves.
    /// Returns the number of completed cycles.
    pub async fn run<F, Fut, S>(&self, mut cycle: F, shutdown: S) -> usize
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = ()>,
        S: Future<Output = ()>,
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut completed = 0;
        loop {
            if self.max_cycles.is_some_and(|max| completed >= max) {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Refresh scheduler stopping after {} cycle(s)", completed);
                    break;
                }
                _ = ticker.tick() => {
                    debug!("Refresh cycle {} starting", completed + 1);
                    cycle(completed).await;
                    completed += 1;
                }
            }
        }

        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn stops_after_max_cycles() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler = RefreshScheduler::new(Duration::from_millis(5)).with_max_cycles(3);

        let c = count.clone();
        let done = scheduler
            .run(
                move |_| {
                    let c = c.clone();
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                    }
                },
                std::future::pending(),
            )
            .await;

        assert_eq!(done, 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn shutdown_interrupts_waiting() {
        let scheduler = RefreshScheduler::new(Duration::from_secs(3600));
        let done = scheduler
            .run(|_| async {}, time::sleep(Duration::from_millis(20)))
            .await;
        // the immediate first tick runs, then shutdown wins over the hour-long wait
        assert_eq!(done, 1);
    }
}
