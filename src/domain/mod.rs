//! Domain layer for the Voice AI harness
//!
//! Pure models, domain errors, and the port traits infrastructure adapters
//! implement. Nothing here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{StoreError, StoreResult, ValidationError, ValidationResult};
