//! Product catalog domain module.
//!
//! Pure domain logic (no IO, no HTTP, no storage). The catalog is a downstream
//! collaborator of the gate: handlers only reach it after authorization.

pub mod price;
pub mod product;

pub use price::Price;
pub use product::{NewProduct, Product, ProductError, ProductPatch};
