//! Error types for `tensio-core`.

use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid timestamp {input:?}: {reason}")]
  InvalidTimestamp { input: String, reason: String },

  #[error("unknown timezone identifier: {0:?}")]
  UnknownTimezone(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
