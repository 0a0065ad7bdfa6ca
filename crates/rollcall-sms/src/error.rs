//! Error types for `rollcall-sms`.

use thiserror::Error;

/// Why a single delivery failed, as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
  #[error("SMS provider rejected credentials: {0}")]
  Auth(String),

  #[error("SMS provider rejected the request: {0}")]
  Validation(String),

  #[error("SMS quota exhausted: {0}")]
  Quota(String),

  #[error("SMS delivery failed: {0}")]
  Unknown(String),
}

/// Failure below the provider protocol: nothing usable came back.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("SMS provider not configured: {0}")]
  NotConfigured(String),

  #[error("no response within {0} seconds")]
  Timeout(u64),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
}

impl From<TransportError> for ProviderError {
  fn from(e: TransportError) -> Self {
    match e {
      TransportError::NotConfigured(_) => Self::Auth(e.to_string()),
      TransportError::Timeout(_) | TransportError::Http(_) => Self::Unknown(e.to_string()),
    }
  }
}
