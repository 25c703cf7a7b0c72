//! The `ReadingStore` persistence boundary.
//!
//! The ingestion core never writes to storage directly; it produces
//! validated [`Reading`]s and hands them to an implementation of this
//! trait. Schema and durability mechanics belong to the backend.

use std::{
  future::Future,
  sync::{Mutex, PoisonError},
};

use crate::reading::Reading;

/// Abstraction over a reading store backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait ReadingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one validated reading. The `persist` configuration flag is
  /// honored by the caller, not the store: when saving is off, this
  /// method is simply never invoked.
  fn add_reading(
    &self,
    reading: Reading,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All stored readings, newest first.
  fn list_readings(
    &self,
  ) -> impl Future<Output = Result<Vec<Reading>, Self::Error>> + Send + '_;
}

// ─── In-memory reference implementation ──────────────────────────────────────

/// Reference [`ReadingStore`] backed by a `Vec`. Used by tests and by
/// callers that run with persistence disabled.
#[derive(Debug, Default)]
pub struct MemoryStore {
  readings: Mutex<Vec<Reading>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl ReadingStore for MemoryStore {
  type Error = std::convert::Infallible;

  async fn add_reading(&self, reading: Reading) -> Result<(), Self::Error> {
    self
      .readings
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(reading);
    Ok(())
  }

  async fn list_readings(&self) -> Result<Vec<Reading>, Self::Error> {
    let mut all = self
      .readings
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone();
    all.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
    Ok(all)
  }
}
