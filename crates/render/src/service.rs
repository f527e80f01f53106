//! Trait seam between the job lifecycle and the render service.

use async_trait::async_trait;

use crate::api::RenderApiError;
use crate::payload::RenderRequest;
use crate::snapshot::{JobSnapshot, SubmitReceipt};

/// Remote render operations the job lifecycle depends on.
///
/// Implemented by [`RenderApi`](crate::api::RenderApi) in production and
/// by scripted doubles in lifecycle tests.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Submit a render job. The returned receipt carries the handle used
    /// for all subsequent status polls.
    async fn submit(&self, request: &RenderRequest) -> Result<SubmitReceipt, RenderApiError>;

    /// Fetch and normalize the current status of a submitted job.
    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, RenderApiError>;
}
