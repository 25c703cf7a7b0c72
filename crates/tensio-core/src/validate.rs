//! Range validation for candidate readings.
//!
//! Bounds are deliberately generous — they reject data-entry and OCR
//! mistakes, not clinically alarming measurements. A hypertensive-crisis
//! reading is still a valid reading.

use thiserror::Error;

pub const SYSTOLIC_MIN: i32 = 40;
pub const SYSTOLIC_MAX: i32 = 300;
pub const DIASTOLIC_MIN: i32 = 20;
pub const DIASTOLIC_MAX: i32 = 200;
pub const PULSE_MIN: i32 = 20;
pub const PULSE_MAX: i32 = 250;

// ─── Violations ──────────────────────────────────────────────────────────────

/// A single violated rule. [`validate`] collects every violation in one pass
/// so a caller can show all problems at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
  #[error("systolic {0} must be between 40 and 300")]
  SystolicOutOfRange(i32),

  #[error("diastolic {0} must be between 20 and 200")]
  DiastolicOutOfRange(i32),

  #[error("pulse {0} must be between 20 and 250")]
  PulseOutOfRange(i32),

  #[error("diastolic {diastolic} must be strictly below systolic {systolic}")]
  DiastolicNotBelowSystolic { systolic: i32, diastolic: i32 },
}

fn summary(violations: &[Violation]) -> String {
  violations
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

/// One or more violated rules, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid reading: {}", summary(.violations))]
pub struct ValidationError {
  pub violations: Vec<Violation>,
}

// ─── Validator ───────────────────────────────────────────────────────────────

/// Check a candidate reading against the physiological bounds.
///
/// Runs every rule and returns the full violation list rather than stopping
/// at the first failure.
pub fn validate(
  systolic: i32,
  diastolic: i32,
  pulse: Option<i32>,
) -> Result<(), ValidationError> {
  let mut violations = Vec::new();

  if !(SYSTOLIC_MIN..=SYSTOLIC_MAX).contains(&systolic) {
    violations.push(Violation::SystolicOutOfRange(systolic));
  }
  if !(DIASTOLIC_MIN..=DIASTOLIC_MAX).contains(&diastolic) {
    violations.push(Violation::DiastolicOutOfRange(diastolic));
  }
  if let Some(p) = pulse
    && !(PULSE_MIN..=PULSE_MAX).contains(&p)
  {
    violations.push(Violation::PulseOutOfRange(p));
  }
  if diastolic >= systolic {
    violations.push(Violation::DiastolicNotBelowSystolic {
      systolic,
      diastolic,
    });
  }

  if violations.is_empty() {
    Ok(())
  } else {
    Err(ValidationError { violations })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
