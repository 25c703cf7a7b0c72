//! Content-addressed cache of recent submissions.
//!
//! Purely a cost and latency optimization: a hit must be observably
//! identical to re-running the extraction, and a race between two
//! concurrent submissions of the same image merely costs one extra
//! transmission. Correctness never depends on this cache.

use std::{
  collections::HashMap,
  sync::{Mutex, PoisonError},
  time::{Duration, Instant},
};

use crate::client::ExtractionResult;

struct CacheEntry {
  stored_at: Instant,
  result:    ExtractionResult,
}

/// Map from image content hash to the result of the last submission,
/// valid for a configured window.
pub struct SubmissionCache {
  ttl:     Duration,
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SubmissionCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entries: Mutex::new(HashMap::new()),
    }
  }

  /// Return the cached result for `content_hash` if it is still inside
  /// the validity window. Expired entries are dropped on lookup.
  pub fn get(&self, content_hash: &str) -> Option<ExtractionResult> {
    let mut entries = self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    match entries.get(content_hash) {
      Some(entry) if entry.stored_at.elapsed() < self.ttl => {
        Some(entry.result.clone())
      }
      Some(_) => {
        entries.remove(content_hash);
        None
      }
      None => None,
    }
  }

  pub fn put(&self, content_hash: &str, result: ExtractionResult) {
    let mut entries = self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    entries.insert(content_hash.to_string(), CacheEntry {
      stored_at: Instant::now(),
      result,
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn result() -> ExtractionResult {
    ExtractionResult {
      systolic:        Some(120),
      diastolic:       Some(80),
      pulse:           Some(72),
      timestamp_guess: None,
      confidence:      0.9,
      note:            None,
    }
  }

  #[test]
  fn hit_within_window() {
    let cache = SubmissionCache::new(Duration::from_secs(60));
    cache.put("abc", result());
    assert_eq!(cache.get("abc"), Some(result()));
  }

  #[test]
  fn miss_for_unknown_hash() {
    let cache = SubmissionCache::new(Duration::from_secs(60));
    assert_eq!(cache.get("nope"), None);
  }

  #[test]
  fn zero_ttl_expires_immediately() {
    let cache = SubmissionCache::new(Duration::ZERO);
    cache.put("abc", result());
    assert_eq!(cache.get("abc"), None);
  }
}
