//! Error types for `tensio-extract`.

use thiserror::Error;

use crate::draft::DraftState;

#[derive(Debug, Error)]
pub enum Error {
  /// The external service could not produce a result: transport failure,
  /// timeout, server error, or an unreadable response. Never fatal to
  /// ingestion — the caller's fallback is manual entry.
  #[error("extraction service unavailable: {reason}")]
  Unavailable {
    reason:    String,
    /// Whether one automatic retry is worth attempting.
    transient: bool,
  },

  #[error("unsupported image content: {0}")]
  UnsupportedImage(String),

  #[error("draft in state {from} cannot {action}")]
  InvalidTransition {
    from:   DraftState,
    action: &'static str,
  },

  #[error(transparent)]
  Core(#[from] tensio_core::Error),
}

impl From<tensio_core::validate::ValidationError> for Error {
  fn from(err: tensio_core::validate::ValidationError) -> Self {
    Self::Core(err.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
