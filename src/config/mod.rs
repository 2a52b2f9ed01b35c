//! Configuration loading and credential resolution.

mod credentials;
mod loader;
mod types;

pub use credentials::{build_auth_header, AuthType, SecureString};
pub use loader::ConfigError;
pub use types::{ApiConfig, Config, FeedConfig, StorageConfig};
