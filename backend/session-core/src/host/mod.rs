//! Everything the embedding host hands to the session layer: the page
//! address, identifiers encoded in it, and pushed messages.

pub mod address_bar;
pub mod host_app;
pub mod messages;

pub use address_bar::{AddressBar, InMemoryAddressBar};
pub use host_app::parse_host_app_config;
pub use messages::{HostMessage, OriginPolicy};
