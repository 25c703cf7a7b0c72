//! Process configuration.
//!
//! Read once at startup and immutable for the rest of the run. The
//! layering is file-under-environment: a `TENSIO_`-prefixed environment
//! variable overrides the corresponding file key, so credentials can stay
//! out of the config file in containers and CI.

use std::path::Path;

use serde::Deserialize;

use crate::{error::Result, timezone::SiteTz};

fn default_model() -> String { "vision-1".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_cache_ttl_secs() -> u64 { 300 }
fn default_persist() -> bool { true }

/// Connection settings for the external extraction service.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
  pub endpoint: String,
  pub api_key:  String,
  #[serde(default = "default_model")]
  pub model: String,
  /// Bound on one extraction request; a retry gets its own window.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// How long a submission stays reusable by content hash.
  #[serde(default = "default_cache_ttl_secs")]
  pub cache_ttl_secs: u64,
}

/// Top-level configuration for the ingestion core.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  /// IANA identifier of the site timezone, e.g. `"America/New_York"`.
  pub timezone: String,
  /// Whether accepted readings are handed to the persistence
  /// collaborator. An explicit flag carried by the config, not mutable
  /// process state.
  #[serde(default = "default_persist")]
  pub persist: bool,
  pub extraction: ExtractionConfig,
}

impl IngestConfig {
  /// Load from a TOML file (optional) layered under `TENSIO_*`
  /// environment variables. The timezone identifier is resolved eagerly
  /// so a bad zone fails at startup, not on the first reading.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TENSIO").separator("__"),
      )
      .build()?;

    let cfg: Self = settings.try_deserialize()?;
    cfg.site_tz()?;
    Ok(cfg)
  }

  /// The resolved site timezone.
  pub fn site_tz(&self) -> Result<SiteTz> { SiteTz::parse(&self.timezone) }
}

#[cfg(test)]
mod tests {
  use std::sync::{Mutex, PoisonError};

  use super::*;
  use crate::error::Error;

  /// Serializes tests that touch process environment variables.
  static ENV_LOCK: Mutex<()> = Mutex::new(());

  fn from_toml(toml: &str) -> Result<IngestConfig> {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?;
    let cfg: IngestConfig = settings.try_deserialize()?;
    cfg.site_tz()?;
    Ok(cfg)
  }

  const MINIMAL: &str = r#"
    timezone = "America/New_York"

    [extraction]
    endpoint = "https://extract.example.com"
    api_key  = "k"
  "#;

  #[test]
  fn minimal_config_fills_defaults() {
    let cfg = from_toml(MINIMAL).unwrap();
    assert!(cfg.persist);
    assert_eq!(cfg.extraction.model, "vision-1");
    assert_eq!(cfg.extraction.timeout_secs, 30);
    assert_eq!(cfg.extraction.cache_ttl_secs, 300);
    assert_eq!(cfg.site_tz().unwrap().name(), "America/New_York");
  }

  #[test]
  fn unknown_timezone_fails_at_load() {
    let toml = MINIMAL.replace("America/New_York", "Nowhere/Atlantis");
    let err = from_toml(&toml).unwrap_err();
    assert!(matches!(err, Error::UnknownTimezone(_)));
  }

  #[test]
  fn missing_extraction_section_is_an_error() {
    let err = from_toml("timezone = \"UTC\"").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
  }

  #[test]
  fn environment_overrides_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let path = std::env::temp_dir().join("tensio-env-override-test.toml");
    std::fs::write(&path, MINIMAL).unwrap();

    unsafe {
      std::env::set_var("TENSIO_TIMEZONE", "Europe/Prague");
      std::env::set_var("TENSIO_EXTRACTION__TIMEOUT_SECS", "5");
    }
    let loaded = IngestConfig::load(&path);
    unsafe {
      std::env::remove_var("TENSIO_TIMEZONE");
      std::env::remove_var("TENSIO_EXTRACTION__TIMEOUT_SECS");
    }
    std::fs::remove_file(&path).ok();

    let cfg = loaded.unwrap();
    // The env values win over the file's, and the string from the
    // environment coerces into the numeric field.
    assert_eq!(cfg.timezone, "Europe/Prague");
    assert_eq!(cfg.extraction.timeout_secs, 5);
    // File keys without an env override survive the layering.
    assert_eq!(cfg.extraction.api_key, "k");
  }

  #[test]
  fn missing_config_file_falls_back_to_environment_alone() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    unsafe {
      std::env::set_var("TENSIO_TIMEZONE", "UTC");
      std::env::set_var("TENSIO_EXTRACTION__ENDPOINT", "https://x.example");
      std::env::set_var("TENSIO_EXTRACTION__API_KEY", "k2");
    }
    let loaded = IngestConfig::load(Path::new("/nonexistent/tensio.toml"));
    unsafe {
      std::env::remove_var("TENSIO_TIMEZONE");
      std::env::remove_var("TENSIO_EXTRACTION__ENDPOINT");
      std::env::remove_var("TENSIO_EXTRACTION__API_KEY");
    }

    let cfg = loaded.unwrap();
    assert_eq!(cfg.extraction.endpoint, "https://x.example");
    assert_eq!(cfg.extraction.timeout_secs, 30);
  }
}
