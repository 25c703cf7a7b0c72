//! Confirmation workflow for image-sourced readings.
//!
//! Extracted values are never trusted directly; they become a draft the
//! user must confirm, correcting any field first. A draft moves through
//! a small state machine and only a confirmed draft yields a [`Reading`].

use chrono::{DateTime, Utc};
use tensio_core::{
  reading::{Reading, ReadingSource},
  timezone::SiteTz,
  validate::Violation,
};
use uuid::Uuid;

use crate::{
  client::ExtractionResult,
  error::{Error, Result},
  payload::{ImagePayload, MediaType},
};

// ─── State machine ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
  /// Image accepted, extraction not yet attempted or still in flight.
  Submitted,
  /// Extraction finished (possibly with nothing read); awaiting the
  /// user's decision.
  Extracted,
  Confirmed,
  Rejected,
}

impl DraftState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Submitted => "submitted",
      Self::Extracted => "extracted",
      Self::Confirmed => "confirmed",
      Self::Rejected => "rejected",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Confirmed | Self::Rejected)
  }
}

impl std::fmt::Display for DraftState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// The user's corrections at confirmation time. Every field is optional;
/// absent fields fall back to the extracted proposal.
#[derive(Debug, Clone, Default)]
pub struct ConfirmInput {
  pub systolic:  Option<i32>,
  pub diastolic: Option<i32>,
  pub pulse:     Option<i32>,
  pub timestamp: Option<String>,
}

/// A pending image-sourced reading.
#[derive(Debug, Clone)]
pub struct ExtractionDraft {
  pub draft_id:     Uuid,
  pub content_hash: String,
  pub media_type:   MediaType,
  /// What the service read off the monitor, absent when extraction was
  /// unavailable and the user is entering values by hand.
  pub proposed:   Option<ExtractionResult>,
  /// Range violations from the most recent failed confirmation attempt,
  /// cleared on the next attempt.
  pub violations: Vec<Violation>,
  /// Why the most recent confirmation's timestamp could not be
  /// normalized, cleared on the next attempt.
  pub timestamp_issue: Option<String>,
  pub state:           DraftState,
  pub created_at:      DateTime<Utc>,
}

impl ExtractionDraft {
  pub fn new(payload: &ImagePayload) -> Self {
    Self {
      draft_id:        Uuid::new_v4(),
      content_hash:    payload.content_hash.clone(),
      media_type:      payload.media_type,
      proposed:        None,
      violations:      Vec::new(),
      timestamp_issue: None,
      state:           DraftState::Submitted,
      created_at:      Utc::now(),
    }
  }

  fn guard(&self, action: &'static str) -> Result<()> {
    if self.state.is_terminal() {
      return Err(Error::InvalidTransition {
        from: self.state,
        action,
      });
    }
    Ok(())
  }

  /// Record the service's proposal and open the draft for confirmation.
  pub fn mark_extracted(&mut self, result: ExtractionResult) -> Result<()> {
    if self.state != DraftState::Submitted {
      return Err(Error::InvalidTransition {
        from:   self.state,
        action: "record extraction",
      });
    }
    self.proposed = Some(result);
    self.state = DraftState::Extracted;
    Ok(())
  }

  /// Open the draft for manual entry after extraction could not run.
  /// The draft carries no proposal; the user supplies every field.
  pub fn mark_unavailable(&mut self) -> Result<()> {
    if self.state != DraftState::Submitted {
      return Err(Error::InvalidTransition {
        from:   self.state,
        action: "record extraction failure",
      });
    }
    tracing::warn!(
      draft_id = %self.draft_id,
      "extraction unavailable, draft falls back to manual entry"
    );
    self.state = DraftState::Extracted;
    Ok(())
  }

  /// Confirm the draft, producing a validated [`Reading`].
  ///
  /// Field precedence is user input, then the extracted proposal. The
  /// timestamp follows the same rule, with "now" as the final fallback,
  /// and is normalized against the site timezone. Any failure keeps the
  /// draft open with the problem recorded on it, range violations in
  /// `violations` and a bad timestamp in `timestamp_issue`, so the user
  /// can correct and confirm again.
  pub fn confirm(
    &mut self,
    input: ConfirmInput,
    site_tz: SiteTz,
  ) -> Result<Reading> {
    if self.state != DraftState::Extracted {
      return Err(Error::InvalidTransition {
        from:   self.state,
        action: "confirm",
      });
    }
    self.violations.clear();
    self.timestamp_issue = None;

    let proposed = self.proposed.as_ref();
    let systolic = input
      .systolic
      .or(proposed.and_then(|p| p.systolic))
      .unwrap_or(0);
    let diastolic = input
      .diastolic
      .or(proposed.and_then(|p| p.diastolic))
      .unwrap_or(0);
    let pulse = input.pulse.or(proposed.and_then(|p| p.pulse));

    let timestamp_str = input
      .timestamp
      .as_deref()
      .or(proposed.and_then(|p| p.timestamp_guess.as_deref()));
    let taken_at = match timestamp_str {
      Some(s) => match site_tz.normalize_str(s) {
        Ok(t) => t,
        Err(err) => {
          self.timestamp_issue = Some(err.to_string());
          return Err(err.into());
        }
      },
      None => Utc::now(),
    };

    match Reading::new(
      systolic,
      diastolic,
      pulse,
      taken_at,
      ReadingSource::Image,
    ) {
      Ok(reading) => {
        self.state = DraftState::Confirmed;
        Ok(reading)
      }
      Err(err) => {
        self.violations = err.violations.clone();
        Err(err.into())
      }
    }
  }

  /// Discard the draft. No reading is produced.
  pub fn reject(&mut self) -> Result<()> {
    self.guard("reject")?;
    self.state = DraftState::Rejected;
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
