//! Faker-backed record generation for deptseed.
//!
//! Produces deterministic Department and Employee rows from a seed. Nothing in
//! this crate performs I/O.

pub mod engine;
pub mod faker;
pub mod model;

pub use engine::{SeedGenerator, generate_departments, generate_employees};
pub use model::GenerateOptions;
