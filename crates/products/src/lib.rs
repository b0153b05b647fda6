//! Catalog domain module.
//!
//! This crate contains the product entity, its category enumeration and the
//! lifecycle events that leave the system through the message queue. Pure
//! domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod events;
pub mod product;

pub use category::Category;
pub use events::{ProductCreated, ProductDeleted, ProductUpdated};
pub use product::Product;
