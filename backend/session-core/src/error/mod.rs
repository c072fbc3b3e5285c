pub mod config;
pub mod request;
pub mod session;
pub mod storage;

pub use config::ConfigError;
pub use request::RequestError;
pub use session::SessionError;
pub use storage::StorageError;
