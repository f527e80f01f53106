//! Client library for the external video render service.
//!
//! Maps validated plan form input to template render requests, submits
//! them over authenticated JSON HTTP, and normalizes the service's
//! status responses into a small typed vocabulary. The [`RenderService`]
//! trait is the seam the job lifecycle runs against; [`RenderApi`] is
//! the production implementation.

pub mod api;
pub mod payload;
pub mod service;
pub mod snapshot;

pub use api::{RenderApi, RenderApiError};
pub use payload::{build_render_request, AssetSpec, RenderRequest, TemplateRef};
pub use service::RenderService;
pub use snapshot::{JobSnapshot, RemoteState, SubmitReceipt};
