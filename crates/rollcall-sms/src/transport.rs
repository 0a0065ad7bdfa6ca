//! The `SmsTransport` trait.

use std::future::Future;

use serde_json::Value;

use crate::TransportError;

/// What came back from the provider, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
  /// HTTP status code.
  pub status: u16,
  /// Parsed JSON body, or the raw text as a JSON string if it was not JSON.
  pub body:   Value,
}

impl ProviderResponse {
  pub fn new(status: u16, body: Value) -> Self { Self { status, body } }
}

/// Submits one message to one destination.
///
/// Implementations own their timeouts: a request that does not complete in
/// time must come back as [`TransportError::Timeout`].
pub trait SmsTransport: Send + Sync {
  /// `to` is already in the provider's international format.
  fn send<'a>(
    &'a self,
    to: &'a str,
    text: &'a str,
  ) -> impl Future<Output = Result<ProviderResponse, TransportError>> + Send + 'a;
}
