//! Domain logic for personalized plan videos.
//!
//! Pure building blocks shared by the render boundary and the job
//! lifecycle: plan form input and validation, the maturity projection
//! calculator, and deterministic amount formatting. Nothing in this
//! crate performs I/O.

pub mod error;
pub mod form;
pub mod money;
pub mod projection;

pub use error::CoreError;
pub use form::{FormInput, PlanKind};
pub use projection::Projection;
