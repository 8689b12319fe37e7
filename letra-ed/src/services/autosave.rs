//! Debounced save scheduling
//!
//! Every project mutation schedules two fire-and-forget writes: a local
//! snapshot save debounced to fire after 2 seconds of inactivity, and a
//! cloud sync debounced to 30 seconds. Scheduling cancels any still-pending
//! timer, so N edits inside a window produce exactly one write reflecting
//! the latest state. Timers are aborted when the session closes, leaving no
//! dangling save.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Local snapshot write fires after this much edit inactivity
pub const LOCAL_SAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// Cloud sync fires after this much edit inactivity
pub const CLOUD_SYNC_DEBOUNCE: Duration = Duration::from_secs(30);

/// Trailing-edge debouncer: runs the most recently scheduled action once the
/// delay elapses without another schedule.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `action` to run after the delay, cancelling any pending one.
    pub async fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Cancel the pending action, if any
    pub async fn cancel(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        // Session closed with a save still pending: drop it on the floor
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn n_edits_in_window_yield_one_write_of_latest_state() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        let writes: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        for edit in 1..=5u32 {
            let writes = writes.clone();
            debouncer
                .schedule(async move {
                    writes.lock().await.push(edit);
                })
                .await;
        }

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(*writes.lock().await, vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn separated_edits_each_fire() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        let writes: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        for edit in 1..=2u32 {
            let writes = writes.clone();
            debouncer
                .schedule(async move {
                    writes.lock().await.push(edit);
                })
                .await;
            tokio::time::sleep(Duration::from_secs(3)).await;
        }

        assert_eq!(*writes.lock().await, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_the_pending_write() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        let writes: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        let w = writes.clone();
        debouncer
            .schedule(async move {
                w.lock().await.push(1);
            })
            .await;
        debouncer.cancel().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(writes.lock().await.is_empty());
    }
}
