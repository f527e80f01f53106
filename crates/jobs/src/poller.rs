//! Background status polling for an accepted render job.
//!
//! One task per accepted submission drives every status request: the
//! fixed-cadence ticker and manual check nudges are multiplexed through
//! a single `tokio::select!`, so at most one status request is ever in
//! flight. Snapshot application is guarded by the manager's epoch
//! counter; a response that arrives after a cancel or reset is dropped
//! on the floor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use planreel_render::snapshot::JobSnapshot;
use planreel_render::RenderService;

use crate::manager::{JobError, Shared};
use crate::state::{fold_snapshot, JobPhase, JobView};

/// Default delay between consecutive status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of tolerated consecutive retryable poll failures.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// Polling behavior for a submitted job.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between consecutive status polls.
    pub interval: Duration,
    /// Consecutive retryable poll failures tolerated before the job is
    /// marked failed. The budget resets on every successful poll.
    pub retry_budget: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

/// Poll `job_id` until it settles, the retry budget runs out, or the
/// task is cancelled.
///
/// The first poll fires immediately after spawn; afterwards the ticker
/// and manual nudges share one loop iteration per wakeup.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn poll_job(
    service: Arc<dyn RenderService>,
    shared: Arc<Mutex<Shared>>,
    event_tx: broadcast::Sender<JobView>,
    config: PollConfig,
    job_id: String,
    epoch: u64,
    cancel: CancellationToken,
    mut check_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    let mut consecutive_failures: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %job_id, "poll task cancelled");
                return;
            }
            _ = ticker.tick() => {}
            nudge = check_rx.recv() => {
                if nudge.is_none() {
                    // Manager dropped the handle; nothing to track anymore.
                    return;
                }
                tracing::debug!(job_id = %job_id, "manual status check requested");
            }
        }

        match service.fetch_status(&job_id).await {
            Ok(snapshot) => {
                consecutive_failures = 0;
                if apply_snapshot(&shared, &event_tx, &job_id, epoch, &snapshot).await {
                    return;
                }
            }
            Err(err) if err.is_retryable() => {
                consecutive_failures += 1;
                if consecutive_failures > config.retry_budget {
                    tracing::error!(
                        job_id = %job_id,
                        attempts = consecutive_failures,
                        error = %err,
                        "status polling exhausted its retry budget",
                    );
                    let message = JobError::PollExhausted {
                        attempts: consecutive_failures,
                        last_error: err.to_string(),
                    }
                    .to_string();
                    fail_job(&shared, &event_tx, epoch, message).await;
                    return;
                }
                tracing::warn!(
                    job_id = %job_id,
                    attempt = consecutive_failures,
                    budget = config.retry_budget,
                    error = %err,
                    "status poll failed, will retry",
                );
            }
            Err(err) => {
                tracing::error!(job_id = %job_id, error = %err, "status poll failed permanently");
                fail_job(&shared, &event_tx, epoch, err.to_string()).await;
                return;
            }
        }
    }
}

/// Fold a snapshot into the shared view. Returns `true` when the task
/// should stop, either because the job settled or because the epoch
/// moved on while the request was in flight.
async fn apply_snapshot(
    shared: &Mutex<Shared>,
    event_tx: &broadcast::Sender<JobView>,
    job_id: &str,
    epoch: u64,
    snapshot: &JobSnapshot,
) -> bool {
    let mut state = shared.lock().await;
    if state.epoch != epoch {
        tracing::debug!(job_id = %job_id, "discarding stale status response");
        return true;
    }

    let next = fold_snapshot(&state.view, snapshot);
    if next == state.view {
        return false;
    }

    let terminal = next.phase.is_terminal();
    tracing::info!(
        job_id = %job_id,
        phase = next.phase.as_str(),
        progress = next.progress,
        "render job status changed",
    );
    state.view = next.clone();
    if terminal {
        state.poll = None;
    }
    // Send while holding the lock so subscribers observe transitions in
    // the same order the view changed.
    let _ = event_tx.send(next);
    terminal
}

/// Settle the job as `Failed` with `message`, unless the epoch moved on.
async fn fail_job(
    shared: &Mutex<Shared>,
    event_tx: &broadcast::Sender<JobView>,
    epoch: u64,
    message: String,
) {
    let mut state = shared.lock().await;
    if state.epoch != epoch {
        return;
    }

    let mut next = state.view.clone();
    next.phase = JobPhase::Failed;
    next.error = Some(message);
    state.view = next.clone();
    state.poll = None;
    let _ = event_tx.send(next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_service_profile() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.retry_budget, 3);
    }
}
