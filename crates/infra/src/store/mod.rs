//! Storage adapters.
//!
//! The identity store lives next to its trait in `keygate-auth`; this module
//! holds the catalog store.

pub mod products;

pub use products::{InMemoryProductStore, ProductStore, ProductStoreError};
