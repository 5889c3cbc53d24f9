//! Configuration loading and shared access.

mod credentials;
mod loader;
mod store;
mod types;

pub use credentials::{bearer_header, SecureString};
pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{ApiConfig, Config, LoginGuardConfig};
