//! Verifier: owns the single active verification loop.
//!
//! Starting a new run aborts the previous one, so polls never overlap.
//! Dropping the verifier aborts its task; no timer outlives its owner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{await_condition, Expectation, Outcome, VerifyConfig, VerifyState};
use crate::client::CatalogClient;

/// Runs at most one verification loop at a time.
///
/// ## Example
///
/// ```ignore
/// let mut verifier = Verifier::new(VerifyConfig::default());
/// verifier.start(client.clone(), Expectation::Length(12));
///
/// // UI binds its "saving" overlay to the state channel
/// let mut state = verifier.subscribe();
/// while state.changed().await.is_ok() {
///     if !state.borrow().is_saving() { break; }
/// }
/// ```
pub struct Verifier {
    config: VerifyConfig,
    state: Arc<watch::Sender<VerifyState>>,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<Outcome>>,
}

impl Verifier {
    pub fn new(config: VerifyConfig) -> Self {
        let (state, _) = watch::channel(VerifyState::Idle);
        Self {
            config,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn config(&self) -> VerifyConfig {
        self.config
    }

    /// Current state.
    pub fn state(&self) -> VerifyState {
        *self.state.borrow()
    }

    /// Receive state changes.
    pub fn subscribe(&self) -> watch::Receiver<VerifyState> {
        self.state.subscribe()
    }

    pub fn is_saving(&self) -> bool {
        self.state().is_saving()
    }

    /// Begin polling `client` until `expectation` holds, replacing any run
    /// already in progress. Must be called inside a tokio runtime.
    pub fn start(&mut self, client: Arc<dyn CatalogClient>, expectation: Expectation) {
        self.abort_running();
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        publish(&self.state, &self.generation, mine, VerifyState::Polling { attempt: 0 });

        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        let VerifyConfig {
            interval,
            max_attempts,
        } = self.config;

        self.task = Some(tokio::spawn(async move {
            let outcome = await_condition(
                |attempt| {
                    let client = Arc::clone(&client);
                    let expectation = &expectation;
                    let state = &state;
                    let generation = &generation;
                    async move {
                        publish(state, generation, mine, VerifyState::Polling { attempt });
                        match client.list().await {
                            Ok(records) => {
                                let met = expectation.is_met(&records);
                                tracing::debug!(attempt, records = records.len(), met, "verification poll");
                                met
                            }
                            Err(e) => {
                                tracing::debug!(attempt, error = %e, "verification poll failed");
                                false
                            }
                        }
                    }
                },
                interval,
                max_attempts,
            )
            .await;

            match outcome {
                Outcome::Verified { attempts } => {
                    tracing::info!(attempts, "write verified");
                }
                Outcome::TimedOut { attempts } => {
                    tracing::warn!(
                        attempts,
                        waited_secs = interval.as_secs() * u64::from(attempts),
                        "write not visible before verification gave up"
                    );
                }
            }
            publish(&state, &generation, mine, outcome.into());
            outcome
        }));
    }

    /// Stop waiting for the current write. The write itself is not undone and
    /// its landing state stays unknown.
    pub fn cancel(&mut self) {
        if self.abort_running() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.state.send_replace(VerifyState::Cancelled);
            tracing::info!("verification cancelled");
        }
    }

    /// Wait for the current run to finish. `None` when nothing is running or
    /// the run was aborted.
    pub async fn wait(&mut self) -> Option<Outcome> {
        let task = self.task.take()?;
        task.await.ok()
    }

    /// Abort a run still in progress. Returns whether one was.
    fn abort_running(&mut self) -> bool {
        match self.task.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(VerifyConfig::default())
    }
}

impl Drop for Verifier {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Publish `next` only if run `mine` is still the current one, so an aborted
/// run can never overwrite the state of its replacement.
fn publish(
    state: &watch::Sender<VerifyState>,
    generation: &AtomicU64,
    mine: u64,
    next: VerifyState,
) {
    state.send_if_modified(|current| {
        if generation.load(Ordering::SeqCst) != mine || *current == next {
            return false;
        }
        *current = next;
        true
    });
}
