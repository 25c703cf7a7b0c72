//! The partial-failure import report.

use serde::Serialize;
use tensio_core::reading::Reading;

/// One rejected input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
  /// 1-based data-row index; the header row is not counted.
  pub row:    usize,
  /// Human-readable reason suitable for showing to the user.
  pub reason: String,
}

/// Outcome of one CSV import.
///
/// Invariant: `accepted.len() + rejected.len()` equals the number of data
/// rows consumed, both sequences preserve input order, and the report is
/// deterministic for the same input and site timezone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
  pub accepted: Vec<Reading>,
  pub rejected: Vec<RowRejection>,
}

impl ImportReport {
  /// Total data rows consumed.
  pub fn total(&self) -> usize { self.accepted.len() + self.rejected.len() }

  /// True when every row was accepted.
  pub fn is_clean(&self) -> bool { self.rejected.is_empty() }
}
