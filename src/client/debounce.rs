//! Debouncer: settle a rapidly changing input after a quiet period.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Quiet period after the last keystroke before search is recomputed.
pub const SEARCH_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Publishes the latest input only once no newer input has arrived for the
/// quiet period.
///
/// ## Example
///
/// ```ignore
/// let mut search = Debouncer::new(String::new(), SEARCH_QUIET_PERIOD);
/// search.input("t".to_string());
/// search.input("ta".to_string());
/// search.input("tam".to_string());
/// // 300 ms later: search.settled() == "tam"
/// ```
pub struct Debouncer<T> {
    quiet: Duration,
    settled: Arc<watch::Sender<T>>,
    pending: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, quiet: Duration) -> Self {
        let (settled, _) = watch::channel(initial);
        Self {
            quiet,
            settled: Arc::new(settled),
            pending: None,
        }
    }

    /// Record a new input, restarting the quiet period. Must be called inside
    /// a tokio runtime.
    pub fn input(&mut self, value: T) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let settled = Arc::clone(&self.settled);
        let quiet = self.quiet;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            settled.send_replace(value);
        }));
    }

    /// Publish `value` now, dropping any pending input.
    pub fn flush(&mut self, value: T) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.settled.send_replace(value);
    }

    /// The last value that outlived its quiet period.
    pub fn settled(&self) -> T {
        self.settled.borrow().clone()
    }

    /// Receive settled values as they are published.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
