//! The sales metrics pipeline stages that sit between ingest and presentation.
//!
//! `derive` adds computed columns, `filter` narrows rows to a branch, and
//! `aggregate` groups rows into per-product reports.

pub mod aggregate;
pub mod derive;
pub mod filter;

pub use aggregate::*;
pub use derive::*;
pub use filter::*;
