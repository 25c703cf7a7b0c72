//! The validated blood-pressure record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{self, ValidationError};

/// How a reading entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingSource {
  /// Typed in by the user directly.
  Manual,
  /// One row of a bulk CSV import.
  Csv,
  /// Extracted from a photograph of a monitor display and confirmed.
  Image,
}

/// A validated blood-pressure reading, ready for the persistence
/// collaborator.
///
/// `taken_at` is always an absolute UTC instant; naive local input is
/// resolved against the site timezone before a `Reading` ever exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
  pub systolic:  i32,
  pub diastolic: i32,
  pub pulse:     Option<i32>,
  pub taken_at:  DateTime<Utc>,
  pub source:    ReadingSource,
}

impl Reading {
  /// Build a reading, enforcing the numeric invariants via
  /// [`validate::validate`].
  pub fn new(
    systolic: i32,
    diastolic: i32,
    pulse: Option<i32>,
    taken_at: DateTime<Utc>,
    source: ReadingSource,
  ) -> Result<Self, ValidationError> {
    validate::validate(systolic, diastolic, pulse)?;
    Ok(Self {
      systolic,
      diastolic,
      pulse,
      taken_at,
      source,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn new_rejects_out_of_range_values() {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    assert!(Reading::new(500, 80, None, at, ReadingSource::Manual).is_err());
  }

  #[test]
  fn source_serializes_lowercase() {
    let s = serde_json::to_string(&ReadingSource::Image).unwrap();
    assert_eq!(s, "\"image\"");
  }
}
