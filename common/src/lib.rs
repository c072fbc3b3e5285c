//! Shared building blocks for the jobtrack workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): Error location tracking, secret wrappers, HTTP helpers
//! - **models**: Pure data structures describing session state
//! - **session-core**: Session store and synchronization logic
//! - **jobtrack**: Composition root wiring everything together
//!
//! Nothing in here knows about sessions; it only provides the vocabulary
//! the other crates use for errors and credentials.

pub mod bearer_token;
pub mod error;
pub mod http_status;

pub use bearer_token::BearerToken;
pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
