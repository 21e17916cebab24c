//! Input helpers.
//!
//! - required-column validation (`schema`)
//! - CSV ingest into `SalesRecord`s (`ingest`)

pub mod ingest;
pub mod schema;

pub use ingest::*;
pub use schema::*;
