//! People the back office knows about: customers and employees.
//!
//! Pure domain logic (no IO, no HTTP, no storage). The rule that nobody may
//! be a customer and an employee under the same e-mail spans both aggregates
//! and is enforced by the application layer, which can see both stores.

pub mod customer;
pub mod employee;

pub use customer::{Customer, CustomerChanges};
pub use employee::Employee;
