//! Response validation: field-level checks and JSON schema conformance

pub mod response_validator;
pub mod schema;

pub use response_validator::{ResponseValidator, REQUIRED_FIELDS};
pub use schema::{SchemaId, SchemaRegistry};
