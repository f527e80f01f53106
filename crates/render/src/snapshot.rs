//! Status response parsing and normalization.
//!
//! The render service reports job state with some field-name and
//! vocabulary drift across deployments (`status` vs `state`, `outputUrl`
//! vs `output`, in-progress statuses like `picked` or `render:dorender`).
//! Everything is normalized here into [`JobSnapshot`] so the lifecycle
//! code never sees raw wire shapes.

use serde::Deserialize;

/// Remote job state after vocabulary normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    Queued,
    Rendering,
    Finished,
    Failed,
}

impl RemoteState {
    /// Map a raw status string onto the four-state vocabulary.
    ///
    /// Unrecognized non-empty statuses are treated as [`Rendering`]: the
    /// service emits granular phase names (`picked`, `started`,
    /// `render:setup`, ...) that all mean "being worked on". An empty or
    /// missing status means the job is still waiting its turn.
    ///
    /// [`Rendering`]: RemoteState::Rendering
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "queued" | "created" | "pending" => RemoteState::Queued,
            "finished" | "done" | "success" => RemoteState::Finished,
            "failed" | "error" => RemoteState::Failed,
            _ => RemoteState::Rendering,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteState::Queued => "queued",
            RemoteState::Rendering => "rendering",
            RemoteState::Finished => "finished",
            RemoteState::Failed => "failed",
        }
    }
}

/// Body returned by `POST /jobs` once a job is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReceipt {
    /// Server-assigned job identifier, the handle for all status polls.
    pub id: String,
    /// Initial status, when the service includes one.
    #[serde(default, alias = "state")]
    pub status: Option<String>,
}

/// Raw `GET /jobs/{id}` body as the service sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatus {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "state")]
    pub status: Option<String>,
    /// Percent complete; fractional values are tolerated.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default, alias = "output")]
    pub output_url: Option<String>,
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}

/// Normalized view of one status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub state: RemoteState,
    /// Percent complete, clamped to `0..=100`.
    pub progress: u8,
    pub output_url: Option<String>,
    pub error: Option<String>,
}

impl From<RawStatus> for JobSnapshot {
    fn from(raw: RawStatus) -> Self {
        Self {
            state: RemoteState::parse(raw.status.as_deref().unwrap_or_default()),
            progress: clamp_progress(raw.progress),
            output_url: non_empty(raw.output_url),
            error: non_empty(raw.error),
        }
    }
}

/// Empty and whitespace-only strings carry no information; drop them so
/// downstream presence checks stay simple.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn clamp_progress(value: Option<f64>) -> u8 {
    match value {
        Some(p) => p.clamp(0.0, 100.0) as u8,
        None => 0,
    }
}
