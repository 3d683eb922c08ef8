//! Infrastructure layer: stores, bootstrap seeding, configuration.

pub mod bootstrap;
pub mod config;
pub mod store;

pub use bootstrap::{BootstrapError, BootstrapReport, bootstrap};
pub use config::{AppConfig, ConfigError};
pub use store::{InMemoryProductStore, ProductStore, ProductStoreError};
