pub mod config;
pub mod error;
pub mod host;
pub mod session;
pub mod storage;
pub mod token;
pub mod validation;

#[cfg(test)]
mod tests;

pub use session::{SessionStore, SessionStoreBuilder, Subscription};

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "jobtrack";
/// Prefix of every environment variable this crate reads.
pub const ENV_PREFIX: &str = "JOBTRACK_";

/// Fixed key of the single persisted token slot.
pub const AUTH_TOKEN_STORAGE_KEY: &str = const_format::concatcp!(APP_DIR_NAME, "_auth_token");
/// Query parameter carrying a one-time bootstrap token.
pub const AUTH_TOKEN_QUERY_PARAM: &str = "auth_token";
/// Discriminator of host messages that push a token.
pub const AUTH_TOKEN_MESSAGE_TYPE: &str = "CREAO_AUTH_TOKEN";
/// Identity-check path, relative to the API base path.
pub const IDENTITY_ENDPOINT_PATH: &str = "me";
