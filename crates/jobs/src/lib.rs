//! Render job lifecycle management.
//!
//! [`JobManager`] owns the submit, poll, and settle lifecycle of one
//! render job at a time. It validates and builds the payload, submits it
//! to the render service, polls job status on a fixed cadence with a
//! bounded failure budget, and broadcasts a [`JobView`] snapshot after
//! every state transition. Subscribe via [`JobManager::subscribe`].

pub mod manager;
pub mod poller;
pub mod state;

pub use manager::{JobError, JobManager};
pub use poller::PollConfig;
pub use state::{JobPhase, JobView};
