//! Bulk CSV import for Tensio.
//!
//! Streams rows from any reader, normalizes and validates each one
//! independently, and reports per-row outcomes instead of failing the
//! file as a whole.

pub mod parse;
pub mod report;

pub use parse::import_readings;
pub use report::{ImportReport, RowRejection};
