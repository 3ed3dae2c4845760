//! Validated configuration-level types
//!
//! Record payloads are deliberately not validated; only values that end up
//! spliced into SQL text go through here.

pub mod schema;
pub mod validation;

pub use schema::SchemaName;
pub use validation::ValidationError;
