//! Single-job render lifecycle manager.
//!
//! [`JobManager`] supervises at most one remote render job at a time:
//! `Idle -> Submitting -> Queued/Rendering -> Finished | Failed`, with
//! `cancel()` abandoning a live attempt and `reset()` clearing a settled
//! one. Every transition is broadcast as a [`JobView`] snapshot via a
//! [`tokio::sync::broadcast`] channel; call [`JobManager::subscribe`] to
//! receive them.
//!
//! Remote failures discovered while polling are reported through the
//! same channel as a `Failed` view, never thrown into a task nobody is
//! awaiting.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use planreel_core::error::CoreError;
use planreel_core::form::FormInput;
use planreel_render::api::RenderApiError;
use planreel_render::payload::build_render_request;
use planreel_render::RenderService;

use crate::poller::{poll_job, PollConfig};
use crate::state::{initial_phase, JobPhase, JobView};

/// Broadcast channel capacity for job view snapshots.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the manual-check nudge channel. One pending nudge is
/// enough; redundant requests are dropped.
const CHECK_CHANNEL_CAPACITY: usize = 1;

/// Supervises one render job against a [`RenderService`].
pub struct JobManager {
    service: Arc<dyn RenderService>,
    config: PollConfig,
    shared: Arc<Mutex<Shared>>,
    event_tx: broadcast::Sender<JobView>,
}

/// State shared between the manager and the poll task.
pub(crate) struct Shared {
    pub(crate) view: JobView,
    /// Bumped on every submission, cancel, and reset. Tasks capture the
    /// epoch at spawn and discard late responses once it moves on.
    pub(crate) epoch: u64,
    /// Handle for the active poll task, if any.
    pub(crate) poll: Option<PollHandle>,
}

/// Bookkeeping for the active poll task.
pub(crate) struct PollHandle {
    cancel: CancellationToken,
    check_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl JobManager {
    /// Create a manager bound to a render service.
    ///
    /// No background work starts until [`submit`](Self::submit).
    pub fn new(service: Arc<dyn RenderService>, config: PollConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            config,
            shared: Arc::new(Mutex::new(Shared {
                view: JobView::default(),
                epoch: 0,
                poll: None,
            })),
            event_tx,
        }
    }

    /// Subscribe to job view snapshots. One snapshot is delivered after
    /// every state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<JobView> {
        self.event_tx.subscribe()
    }

    /// The current job view.
    pub async fn current_view(&self) -> JobView {
        self.shared.lock().await.view.clone()
    }

    /// Validate the form, build the render payload, submit it, and start
    /// polling.
    ///
    /// Legal from `Idle`, or from `Failed` when the failure happened
    /// before a job handle was acquired (a failed submission attempt can
    /// be retried directly). Any other phase must `cancel()` or
    /// `reset()` first: one manager tracks at most one remote job.
    ///
    /// Validation failures reject the submission without disturbing the
    /// current state. Submission transport/remote failures settle the
    /// attempt as `Failed` (broadcast) and are also returned.
    pub async fn submit(&self, input: &FormInput) -> Result<(), JobError> {
        let request = build_render_request(input)?;
        let attempt = uuid::Uuid::new_v4();

        let epoch = {
            let mut state = self.shared.lock().await;
            let retryable_failure =
                state.view.phase == JobPhase::Failed && state.view.job_id.is_none();
            if state.view.phase != JobPhase::Idle && !retryable_failure {
                return Err(JobError::InvalidTransition {
                    phase: state.view.phase,
                    action: "submit",
                });
            }
            state.epoch += 1;
            state.view = JobView {
                phase: JobPhase::Submitting,
                ..JobView::default()
            };
            let _ = self.event_tx.send(state.view.clone());
            state.epoch
        };

        tracing::info!(
            attempt = %attempt,
            plan = input.plan.as_str(),
            "submitting render job",
        );

        match self.service.submit(&request).await {
            Ok(receipt) => {
                let mut state = self.shared.lock().await;
                if state.epoch != epoch {
                    // A cancel won the race. The receipt is dropped and the
                    // remote job is left to run out unobserved.
                    tracing::warn!(
                        attempt = %attempt,
                        job_id = %receipt.id,
                        "submission superseded, ignoring receipt",
                    );
                    return Ok(());
                }

                state.view.phase = initial_phase(receipt.status.as_deref());
                state.view.job_id = Some(receipt.id.clone());
                let _ = self.event_tx.send(state.view.clone());

                let cancel = CancellationToken::new();
                let (check_tx, check_rx) = mpsc::channel(CHECK_CHANNEL_CAPACITY);
                let task = tokio::spawn(poll_job(
                    Arc::clone(&self.service),
                    Arc::clone(&self.shared),
                    self.event_tx.clone(),
                    self.config.clone(),
                    receipt.id.clone(),
                    epoch,
                    cancel.clone(),
                    check_rx,
                ));
                state.poll = Some(PollHandle {
                    cancel,
                    check_tx,
                    task,
                });

                tracing::info!(
                    attempt = %attempt,
                    job_id = %receipt.id,
                    phase = state.view.phase.as_str(),
                    "render job accepted",
                );
                Ok(())
            }
            Err(err) => {
                let mut state = self.shared.lock().await;
                if state.epoch == epoch {
                    state.view = JobView {
                        phase: JobPhase::Failed,
                        error: Some(err.to_string()),
                        ..JobView::default()
                    };
                    let _ = self.event_tx.send(state.view.clone());
                }
                tracing::error!(attempt = %attempt, error = %err, "render job submission failed");
                Err(JobError::Submit(err))
            }
        }
    }

    /// Abandon the current attempt and return to `Idle`.
    ///
    /// Legal from any non-terminal phase; from `Idle` it is a no-op.
    /// Invalidates any in-flight poll or submission response, so a late
    /// reply can never resurrect the abandoned job, and emits no
    /// synthetic terminal event for it.
    pub async fn cancel(&self) -> Result<(), JobError> {
        let handle = {
            let mut state = self.shared.lock().await;
            if state.view.phase.is_terminal() {
                return Err(JobError::InvalidTransition {
                    phase: state.view.phase,
                    action: "cancel",
                });
            }
            if state.view.phase == JobPhase::Idle {
                return Ok(());
            }

            tracing::info!(
                job_id = state.view.job_id.as_deref().unwrap_or("-"),
                phase = state.view.phase.as_str(),
                "cancelling render job",
            );
            state.epoch += 1;
            state.view = JobView::default();
            let handle = state.poll.take();
            let _ = self.event_tx.send(state.view.clone());
            handle
        };

        // Stop the poll task without waiting for it: the epoch bump has
        // already invalidated anything it might still report.
        if let Some(handle) = handle {
            handle.cancel.cancel();
        }
        Ok(())
    }

    /// Clear a settled job and return to `Idle`.
    ///
    /// Legal only from `Finished` or `Failed`. Afterwards the view
    /// equals a freshly constructed manager's view.
    pub async fn reset(&self) -> Result<(), JobError> {
        let mut state = self.shared.lock().await;
        if !state.view.phase.is_terminal() {
            return Err(JobError::InvalidTransition {
                phase: state.view.phase,
                action: "reset",
            });
        }

        tracing::info!(
            job_id = state.view.job_id.as_deref().unwrap_or("-"),
            phase = state.view.phase.as_str(),
            "resetting settled job",
        );
        state.epoch += 1;
        state.view = JobView::default();
        if let Some(handle) = state.poll.take() {
            handle.cancel.cancel();
        }
        let _ = self.event_tx.send(state.view.clone());
        Ok(())
    }

    /// Ask the poll task for an immediate out-of-band status check.
    ///
    /// Legal while a submitted job is being tracked (`Queued` or
    /// `Rendering`). A nudge arriving while one is already pending is
    /// dropped; polls are never issued concurrently.
    pub async fn check_now(&self) -> Result<(), JobError> {
        let state = self.shared.lock().await;
        if !matches!(state.view.phase, JobPhase::Queued | JobPhase::Rendering) {
            return Err(JobError::NoActiveJob);
        }
        match &state.poll {
            Some(handle) => {
                let _ = handle.check_tx.try_send(());
                Ok(())
            }
            None => Err(JobError::NoActiveJob),
        }
    }

    /// Stop any background polling and wait for the task to exit.
    ///
    /// The view is left as-is; this is for process shutdown, not state
    /// management.
    pub async fn shutdown(&self) {
        let handle = {
            let mut state = self.shared.lock().await;
            state.epoch += 1;
            state.poll.take()
        };
        if let Some(handle) = handle {
            handle.cancel.cancel();
            let _ =
                tokio::time::timeout(std::time::Duration::from_secs(5), handle.task).await;
        }
    }
}

/// Errors returned by [`JobManager`] operations.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The operation is not legal in the current phase.
    #[error("{action} is not valid in phase {}", .phase.as_str())]
    InvalidTransition {
        phase: JobPhase,
        action: &'static str,
    },

    /// The form input failed validation; nothing was submitted.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The submission request failed; the attempt settled as `Failed`.
    #[error("job submission failed: {0}")]
    Submit(#[source] RenderApiError),

    /// No job is currently being tracked.
    #[error("no active render job")]
    NoActiveJob,

    /// Polling gave up after too many consecutive failures.
    #[error("status polling gave up after {attempts} attempts: {last_error}")]
    PollExhausted { attempts: u32, last_error: String },
}
