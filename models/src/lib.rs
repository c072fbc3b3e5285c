//! Domain models for the jobtrack session layer.
//!
//! Pure data structures: the session snapshot the store commits and fans
//! out, and the host application identifiers parsed from the page URL.
//! Behavior lives in `session-core`.

pub mod error;
pub mod host_app;
pub mod session;

pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use host_app::HostAppConfig;
pub use host_app::builder::HostAppConfigBuilder;
pub use session::{SessionSnapshot, SessionStatus, SessionSummary};

#[cfg(test)]
mod tests;
