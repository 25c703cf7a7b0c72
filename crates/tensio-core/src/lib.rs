//! Core types and trait definitions for the Tensio blood-pressure tracker.
//!
//! This crate owns the validated [`reading::Reading`] record, the site-timezone
//! normalizer, the range validator, the persistence boundary trait, and the
//! process configuration. It is deliberately free of HTTP and CSV
//! dependencies; the ingestion crates (`tensio-import`, `tensio-extract`)
//! build on top of it.

pub mod config;
pub mod error;
pub mod reading;
pub mod store;
pub mod timezone;
pub mod validate;

pub use error::{Error, Result};
