//! Row-by-row CSV parsing.
//!
//! Pipeline per data row:
//!   deserialize header-named fields
//!     └─ parse integers
//!          └─ SiteTz::normalize_str() on the timestamp
//!               └─ Reading::new() (range validation)
//! Any failure rejects that row with its 1-based index and a readable
//! reason; the import always runs to the end of the input.

use std::io::Read;

use serde::Deserialize;
use tensio_core::{
  reading::{Reading, ReadingSource},
  timezone::SiteTz,
};

use crate::report::{ImportReport, RowRejection};

// ─── Raw row ─────────────────────────────────────────────────────────────────

/// A data row as it appears on the wire. Everything is a string here;
/// interpretation happens in [`build_reading`]. Aliases accept the column
/// spellings seen in real exports.
#[derive(Debug, Deserialize)]
struct RawRow {
  #[serde(alias = "date", alias = "datetime")]
  timestamp: String,
  #[serde(alias = "sys")]
  systolic: String,
  #[serde(alias = "dia")]
  diastolic: String,
  #[serde(default, alias = "pul", alias = "heart_rate")]
  pulse: Option<String>,
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Consume a CSV stream (header row required) and produce an
/// [`ImportReport`].
///
/// The input is read exactly once, in order. A bad row — unparseable
/// record, missing column, invalid timestamp, out-of-range values — is
/// recorded as a rejection and processing continues; nothing here aborts
/// the import. Duplicate rows are not deduplicated.
pub fn import_readings<R: Read>(reader: R, site_tz: SiteTz) -> ImportReport {
  let mut csv_reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(false)
    .from_reader(reader);

  let mut report = ImportReport::default();
  for (index, record) in csv_reader.deserialize::<RawRow>().enumerate() {
    let row = index + 1;
    let outcome = record
      .map_err(|e| row_error_reason(&e))
      .and_then(|raw| build_reading(raw, site_tz));
    match outcome {
      Ok(reading) => report.accepted.push(reading),
      Err(reason) => {
        tracing::debug!(row, %reason, "rejecting csv row");
        report.rejected.push(RowRejection { row, reason });
      }
    }
  }

  tracing::info!(
    accepted = report.accepted.len(),
    rejected = report.rejected.len(),
    site_tz = %site_tz,
    "csv import finished"
  );
  report
}

/// Strip the `csv` crate's position prefix; the report carries its own
/// row index.
fn row_error_reason(err: &csv::Error) -> String {
  match err.kind() {
    csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
    _ => err.to_string(),
  }
}

fn build_reading(raw: RawRow, site_tz: SiteTz) -> Result<Reading, String> {
  let systolic = parse_field("systolic", &raw.systolic)?;
  let diastolic = parse_field("diastolic", &raw.diastolic)?;
  let pulse = match raw.pulse.as_deref() {
    None | Some("") => None,
    Some(s) => Some(parse_field("pulse", s)?),
  };
  let taken_at = site_tz
    .normalize_str(&raw.timestamp)
    .map_err(|e| e.to_string())?;

  Reading::new(systolic, diastolic, pulse, taken_at, ReadingSource::Csv)
    .map_err(|e| e.to_string())
}

fn parse_field(name: &str, value: &str) -> Result<i32, String> {
  value
    .parse::<i32>()
    .map_err(|_| format!("{name} is not a whole number: {value:?}"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
