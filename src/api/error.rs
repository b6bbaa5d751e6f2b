use std::time::Duration;

use thiserror::Error;

/// Failure of a single dashboard API call.
///
/// These never reach the UI: the sync layer maps every variant to a state
/// transition (fall back to cache, or settle to empty).
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("server responded with status {0}")]
  Status(u16),

  #[error("failed to decode response body: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid header value: {0}")]
  InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

  #[error("invalid endpoint url: {0}")]
  Url(#[from] url::ParseError),

  #[error("no response within {0:?}")]
  Timeout(Duration),

  /// The background request task stopped without reporting an outcome
  #[error("request task ended without a result")]
  TaskEnded,
}
