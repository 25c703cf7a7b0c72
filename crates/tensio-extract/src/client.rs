//! The extraction-service client.
//!
//! [`ImageExtractionClient`] is generic over an [`ExtractionBackend`] so
//! tests can stand in a scripted double for the real HTTP transport; the
//! production backend is [`HttpExtractionBackend`]. The client layers two
//! behaviors on whatever backend it is given: content-addressed reuse of
//! recent submissions, and a single automatic retry on transient failure.

use std::{future::Future, time::Duration};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};
use tensio_core::config::ExtractionConfig;

use crate::{
  cache::SubmissionCache,
  error::{Error, Result},
  payload::ImagePayload,
};

// ─── Result type ─────────────────────────────────────────────────────────────

/// The structured field set returned by the extraction service.
///
/// Any field the service could not confidently read is absent — the
/// service never guesses, and neither does this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
  pub systolic:  Option<i32>,
  pub diastolic: Option<i32>,
  pub pulse:     Option<i32>,
  /// The timestamp shown on the monitor display, if legible. A naive
  /// local string; normalization happens at confirmation time.
  pub timestamp_guess: Option<String>,
  /// Service-reported confidence in the extracted values, 0.0 to 1.0.
  #[serde(default)]
  pub confidence: f64,
  /// Free-text explanation of where each value was read from, for
  /// display next to the draft.
  pub note: Option<String>,
}

impl ExtractionResult {
  /// A result with nothing read — what a failed or skipped extraction
  /// leaves behind for manual entry.
  pub fn empty() -> Self {
    Self {
      systolic:        None,
      diastolic:       None,
      pulse:           None,
      timestamp_guess: None,
      confidence:      0.0,
      note:            None,
    }
  }
}

// ─── Backend capability ──────────────────────────────────────────────────────

/// One round-trip to the extraction service. Implemented by the HTTP
/// transport in production and by scripted doubles in tests.
pub trait ExtractionBackend: Send + Sync {
  fn extract<'a>(
    &'a self,
    payload: &'a ImagePayload,
  ) -> impl Future<Output = Result<ExtractionResult>> + Send + 'a;
}

// ─── HTTP backend ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExtractRequest<'a> {
  image:        String,
  media_type:   &'a str,
  /// Caching directive: lets the service key its own prompt cache on the
  /// same fingerprint the client uses.
  content_hash: &'a str,
  model:        &'a str,
}

/// Production transport: POSTs the payload as JSON to the configured
/// endpoint. Authentication is an api-key header; everything else about
/// the service stays behind this type.
pub struct HttpExtractionBackend {
  client:   reqwest::Client,
  endpoint: String,
  api_key:  String,
  model:    String,
}

impl HttpExtractionBackend {
  pub fn new(cfg: &ExtractionConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .map_err(|e| Error::Unavailable {
        reason:    format!("failed to build HTTP client: {e}"),
        transient: false,
      })?;
    Ok(Self {
      client,
      endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
      api_key: cfg.api_key.clone(),
      model: cfg.model.clone(),
    })
  }

  fn url(&self) -> String { format!("{}/v1/extract", self.endpoint) }
}

impl ExtractionBackend for HttpExtractionBackend {
  async fn extract(
    &self,
    payload: &ImagePayload,
  ) -> Result<ExtractionResult> {
    let request = ExtractRequest {
      image:        B64.encode(&payload.bytes),
      media_type:   payload.media_type.as_str(),
      content_hash: &payload.content_hash,
      model:        &self.model,
    };

    tracing::debug!(
      content_hash = %payload.content_hash,
      media_type = %payload.media_type,
      "submitting image for extraction"
    );

    let response = self
      .client
      .post(self.url())
      .header("x-api-key", &self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| Error::Unavailable {
        reason:    e.to_string(),
        transient: e.is_timeout() || e.is_connect(),
      })?;

    let status = response.status();
    if status.is_server_error() {
      return Err(Error::Unavailable {
        reason:    format!("service returned {status}"),
        transient: true,
      });
    }
    if !status.is_success() {
      // 4xx is the service rejecting this submission; retrying the same
      // payload cannot help.
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Unavailable {
        reason:    format!("service rejected request ({status}): {body}"),
        transient: false,
      });
    }

    response
      .json::<ExtractionResult>()
      .await
      .map_err(|e| Error::Unavailable {
        reason:    format!("malformed response: {e}"),
        transient: false,
      })
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Submission front-end: cache first, then the backend, with one retry
/// on transient failure.
pub struct ImageExtractionClient<B> {
  backend: B,
  cache:   SubmissionCache,
}

impl<B: ExtractionBackend> ImageExtractionClient<B> {
  pub fn new(backend: B, cache_ttl: Duration) -> Self {
    Self {
      backend,
      cache: SubmissionCache::new(cache_ttl),
    }
  }

  /// Submit a photographed reading.
  ///
  /// A byte-identical image submitted inside the cache window reuses the
  /// previous response with no transmission at all. A transient failure
  /// (network, timeout, server error) is retried exactly once; a
  /// service-side rejection is not.
  pub async fn submit(
    &self,
    payload: &ImagePayload,
  ) -> Result<ExtractionResult> {
    if let Some(hit) = self.cache.get(&payload.content_hash) {
      tracing::debug!(
        content_hash = %payload.content_hash,
        "submission cache hit"
      );
      return Ok(hit);
    }

    let result = match self.backend.extract(payload).await {
      Ok(r) => r,
      Err(Error::Unavailable {
        reason,
        transient: true,
      }) => {
        tracing::warn!(%reason, "transient extraction failure, retrying once");
        self.backend.extract(payload).await?
      }
      Err(e) => return Err(e),
    };

    self.cache.put(&payload.content_hash, result.clone());
    Ok(result)
  }
}

impl ImageExtractionClient<HttpExtractionBackend> {
  /// Build a client with the production HTTP backend.
  pub fn from_config(cfg: &ExtractionConfig) -> Result<Self> {
    Ok(Self::new(
      HttpExtractionBackend::new(cfg)?,
      Duration::from_secs(cfg.cache_ttl_secs),
    ))
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
