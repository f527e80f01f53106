//! Lifecycle state machine data and snapshot folding.

use serde::Serialize;

use planreel_render::snapshot::{JobSnapshot, RemoteState};

/// Local lifecycle phase of the managed render job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// No job in flight; ready to accept a submission.
    #[default]
    Idle,
    /// Submission round trip to the render service is in progress.
    Submitting,
    /// Accepted by the service, waiting for a render worker.
    Queued,
    /// A worker is producing the video.
    Rendering,
    /// Render complete; the output URL is available.
    Finished,
    /// Submission or render failed; see the view's error message.
    Failed,
}

impl JobPhase {
    /// Terminal phases accept no further snapshots; only
    /// [`reset`](crate::JobManager::reset) leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Finished | JobPhase::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Idle => "idle",
            JobPhase::Submitting => "submitting",
            JobPhase::Queued => "queued",
            JobPhase::Rendering => "rendering",
            JobPhase::Finished => "finished",
            JobPhase::Failed => "failed",
        }
    }
}

/// Snapshot of the managed job, broadcast after every transition.
///
/// The default value is the `Idle` view a fresh manager starts with,
/// which is also what `cancel()` and `reset()` restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub phase: JobPhase,
    /// Render service job handle, present once a submission is accepted.
    pub job_id: Option<String>,
    /// Percent complete, `0..=100`.
    pub progress: u8,
    /// Download URL, present once the job finishes.
    pub output_url: Option<String>,
    /// Failure description, present in `Failed`.
    pub error: Option<String>,
}

/// Fold one status snapshot into the current view.
///
/// Rules, in order:
/// - an error message or a failed remote state settles the job as
///   `Failed`;
/// - a finished remote state settles the job as `Finished` only when the
///   output URL is present; finished without a URL keeps the job in
///   `Rendering` until the asset is ready;
/// - otherwise the job is `Rendering` when the service says so or when
///   progress has started, else `Queued`. A job never drops back from
///   `Rendering` to `Queued`.
pub fn fold_snapshot(current: &JobView, snapshot: &JobSnapshot) -> JobView {
    let mut next = current.clone();

    if snapshot.error.is_some() || snapshot.state == RemoteState::Failed {
        next.phase = JobPhase::Failed;
        next.error = Some(
            snapshot
                .error
                .clone()
                .unwrap_or_else(|| "render job reported failure".to_string()),
        );
        return next;
    }

    if snapshot.state == RemoteState::Finished {
        if let Some(url) = &snapshot.output_url {
            next.phase = JobPhase::Finished;
            next.output_url = Some(url.clone());
            next.progress = 100;
            return next;
        }
        next.phase = JobPhase::Rendering;
        next.progress = snapshot.progress;
        return next;
    }

    let active = if snapshot.state == RemoteState::Rendering || snapshot.progress > 0 {
        JobPhase::Rendering
    } else {
        JobPhase::Queued
    };
    if !(current.phase == JobPhase::Rendering && active == JobPhase::Queued) {
        next.phase = active;
    }
    next.progress = snapshot.progress;
    next
}

/// Phase to enter right after a submission is accepted.
///
/// Only the queued/rendering distinction from the receipt is honored; a
/// terminal status on a receipt is left for the first poll to confirm.
pub fn initial_phase(receipt_status: Option<&str>) -> JobPhase {
    match receipt_status.map(RemoteState::parse) {
        Some(RemoteState::Rendering) => JobPhase::Rendering,
        _ => JobPhase::Queued,
    }
}
