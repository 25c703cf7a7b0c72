//! Site-timezone resolution and timestamp normalization.
//!
//! All readings are stored as absolute UTC instants. Naive timestamps —
//! form fields, CSV cells, values read off a monitor display — are
//! interpreted as wall-clock time in the single configured site timezone
//! and converted to UTC on the way in; [`SiteTz::denormalize`] converts
//! back to local wall-clock time for display.

use std::str::FromStr;

use chrono::{
  DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Naive formats accepted by [`SiteTz::normalize_str`], tried in order.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Upper bound on the forward probe across a DST gap. The widest gaps in
/// the tz database are under a day.
const MAX_GAP_PROBE_MINUTES: i64 = 1_441;

/// The single configured site timezone.
///
/// Parsed once from configuration at startup; immutable and `Copy`
/// thereafter. Used only to interpret naive input and to render UTC back
/// to local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteTz(Tz);

impl SiteTz {
  /// Resolve an IANA zone identifier such as `"America/New_York"`.
  pub fn parse(id: &str) -> Result<Self> {
    id.parse::<Tz>()
      .map(Self)
      .map_err(|_| Error::UnknownTimezone(id.to_string()))
  }

  /// The canonical IANA name of the zone.
  pub fn name(&self) -> &'static str { self.0.name() }

  /// Interpret a naive local time in this zone and convert it to UTC.
  ///
  /// DST policy, applied deterministically on every call:
  /// - a time inside a spring-forward gap maps to the first valid instant
  ///   at or after the gap (probed forward at one-minute resolution);
  /// - an ambiguous fall-back time resolves to the earlier
  ///   (pre-transition) offset.
  pub fn normalize(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    match self.0.from_local_datetime(&naive) {
      LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
      LocalResult::Ambiguous(earlier, _later) => {
        Ok(earlier.with_timezone(&Utc))
      }
      LocalResult::None => {
        let mut probe = naive;
        for _ in 0..MAX_GAP_PROBE_MINUTES {
          probe += Duration::minutes(1);
          if let Some(dt) = self.0.from_local_datetime(&probe).earliest() {
            return Ok(dt.with_timezone(&Utc));
          }
        }
        Err(Error::InvalidTimestamp {
          input:  naive.to_string(),
          reason: format!("not representable in {}", self.name()),
        })
      }
    }
  }

  /// Parse a timestamp string and normalize it to UTC.
  ///
  /// Offset-aware RFC 3339 input is converted directly; naive input is
  /// interpreted in the site zone. Accepted naive forms:
  /// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, and date-only
  /// `YYYY-MM-DD` (midnight).
  pub fn normalize_str(&self, input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
      return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
      if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
        return self.normalize(naive);
      }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
      return self.normalize(date.and_time(chrono::NaiveTime::MIN));
    }

    Err(Error::InvalidTimestamp {
      input:  input.to_string(),
      reason: "unrecognized timestamp format".to_string(),
    })
  }

  /// Render a UTC instant as local wall-clock time in this zone.
  ///
  /// Exact inverse of [`SiteTz::normalize`] for any unambiguous local
  /// time.
  pub fn denormalize(&self, utc: DateTime<Utc>) -> NaiveDateTime {
    utc.with_timezone(&self.0).naive_local()
  }
}

impl FromStr for SiteTz {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl std::fmt::Display for SiteTz {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn new_york() -> SiteTz { SiteTz::parse("America/New_York").unwrap() }

  fn naive(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
  }

  // ── Zone resolution ─────────────────────────────────────────────────────

  #[test]
  fn unknown_zone_is_rejected() {
    let err = SiteTz::parse("Mars/Olympus_Mons").unwrap_err();
    assert!(matches!(err, Error::UnknownTimezone(_)));
  }

  #[test]
  fn from_str_matches_parse() {
    let tz: SiteTz = "Europe/Prague".parse().unwrap();
    assert_eq!(tz.name(), "Europe/Prague");
  }

  // ── Normalization ───────────────────────────────────────────────────────

  #[test]
  fn naive_input_interpreted_as_site_wall_clock() {
    // EST in December: UTC-5, so 08:15 local is 13:15 UTC.
    let utc = new_york().normalize(naive("2025-12-12 08:15:58")).unwrap();
    assert_eq!(utc.to_rfc3339(), "2025-12-12T13:15:58+00:00");
  }

  #[test]
  fn rfc3339_input_passes_through() {
    let utc = new_york()
      .normalize_str("2025-12-12T08:15:58-05:00")
      .unwrap();
    assert_eq!(utc.to_rfc3339(), "2025-12-12T13:15:58+00:00");
  }

  #[test]
  fn t_separated_and_date_only_forms_accepted() {
    let tz = new_york();
    let a = tz.normalize_str("2025-06-15T12:00:00").unwrap();
    let b = tz.normalize_str("2025-06-15 12:00:00").unwrap();
    assert_eq!(a, b);

    // Date-only means site-local midnight (EDT in June: UTC-4).
    let midnight = tz.normalize_str("2025-06-15").unwrap();
    assert_eq!(midnight.to_rfc3339(), "2025-06-15T04:00:00+00:00");
  }

  #[test]
  fn junk_input_is_invalid_timestamp() {
    let err = new_york().normalize_str("last tuesday-ish").unwrap_err();
    assert!(matches!(err, Error::InvalidTimestamp { .. }));
  }

  #[test]
  fn malformed_date_components_rejected() {
    let err = new_york().normalize_str("2025-13-45 99:00:00").unwrap_err();
    assert!(matches!(err, Error::InvalidTimestamp { .. }));
  }

  // ── Round-trip law ──────────────────────────────────────────────────────

  #[test]
  fn denormalize_inverts_normalize_for_unambiguous_times() {
    let tz = new_york();
    for s in [
      "2025-06-15 12:00:00",
      "2025-12-12 08:15:58",
      "2025-03-09 01:59:59", // last second before the spring-forward gap
    ] {
      let local = naive(s);
      let utc = tz.normalize(local).unwrap();
      assert_eq!(tz.denormalize(utc), local, "round-trip failed for {s}");
    }
  }

  // ── DST gap ─────────────────────────────────────────────────────────────

  #[test]
  fn spring_forward_gap_shifts_to_first_valid_instant() {
    // 2025-03-09 02:00–03:00 does not exist in New York. 02:30 must map
    // to 03:00 EDT, which is 07:00 UTC.
    let utc = new_york().normalize(naive("2025-03-09 02:30:00")).unwrap();
    assert_eq!(utc.to_rfc3339(), "2025-03-09T07:00:00+00:00");
  }

  #[test]
  fn gap_resolution_is_deterministic() {
    let tz = new_york();
    let first = tz.normalize(naive("2025-03-09 02:30:00")).unwrap();
    for _ in 0..10 {
      let again = tz.normalize(naive("2025-03-09 02:30:00")).unwrap();
      assert_eq!(again, first);
    }
  }

  // ── DST overlap ─────────────────────────────────────────────────────────

  #[test]
  fn fall_back_overlap_resolves_to_earlier_offset() {
    // 2025-11-02 01:30 occurs twice in New York. The pre-transition
    // offset (EDT, UTC-4) wins, so the answer is 05:30 UTC — not 06:30.
    let utc = new_york().normalize(naive("2025-11-02 01:30:00")).unwrap();
    assert_eq!(utc.to_rfc3339(), "2025-11-02T05:30:00+00:00");
  }

  #[test]
  fn overlap_resolution_is_stable_across_calls() {
    let tz = new_york();
    let first = tz.normalize(naive("2025-11-02 01:30:00")).unwrap();
    for _ in 0..10 {
      assert_eq!(tz.normalize(naive("2025-11-02 01:30:00")).unwrap(), first);
    }
  }
}
