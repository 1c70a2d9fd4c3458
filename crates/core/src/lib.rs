//! Ratebook core - domain entities, services, and traits.
//!
//! This crate contains the business logic for the exchange-rate catalog.
//! It is database-agnostic and defines repository traits that are
//! implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod pagination;
pub mod rates;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
