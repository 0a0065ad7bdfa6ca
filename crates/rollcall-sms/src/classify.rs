//! Mapping provider responses onto [`ProviderError`].

use serde_json::Value;

use crate::{ProviderError, ProviderResponse};

/// The message text the provider returns on success when `code` is absent.
const SUCCESS_MESSAGE: &str = "Message sent successfully.";

/// Words that mark a rejection as a balance or rate problem.
const QUOTA_HINTS: [&str; 4] = ["balance", "quota", "limit", "insufficient"];

/// Decide whether a provider response means the message was accepted.
pub fn classify(resp: &ProviderResponse) -> Result<(), ProviderError> {
  let code = resp.body.get("code").and_then(Value::as_str);
  let message = resp.body.get("message").and_then(Value::as_str);

  let success_status = (200..300).contains(&resp.status);
  if success_status && (code == Some("ok") || message == Some(SUCCESS_MESSAGE)) {
    return Ok(());
  }

  let detail = format!(
    "{} (Status: {})",
    message.unwrap_or("Failed to send SMS"),
    resp.status
  );

  let mentions_quota = message.is_some_and(|m| {
    let m = m.to_ascii_lowercase();
    QUOTA_HINTS.iter().any(|hint| m.contains(hint))
  });

  Err(match resp.status {
    401 | 403 => ProviderError::Auth(detail),
    402 | 429 => ProviderError::Quota(detail),
    _ if mentions_quota => ProviderError::Quota(detail),
    400 | 404 | 422 => ProviderError::Validation(detail),
    _ => ProviderError::Unknown(detail),
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn resp(status: u16, body: Value) -> ProviderResponse { ProviderResponse::new(status, body) }

  #[test]
  fn ok_code_is_success() {
    assert_eq!(classify(&resp(200, json!({"code": "ok", "message_id": "1"}))), Ok(()));
  }

  #[test]
  fn success_message_is_success() {
    assert_eq!(
      classify(&resp(200, json!({"message": "Message sent successfully."}))),
      Ok(())
    );
  }

  #[test]
  fn two_hundred_without_ack_is_unknown() {
    assert!(matches!(
      classify(&resp(200, json!({"message": "queued?"}))),
      Err(ProviderError::Unknown(_))
    ));
  }

  #[test]
  fn auth_statuses() {
    let err = classify(&resp(401, json!({"message": "Invalid API key"}))).unwrap_err();
    assert_eq!(err, ProviderError::Auth("Invalid API key (Status: 401)".into()));
  }

  #[test]
  fn quota_by_status_or_wording() {
    assert!(matches!(
      classify(&resp(429, json!({}))),
      Err(ProviderError::Quota(_))
    ));
    assert!(matches!(
      classify(&resp(400, json!({"message": "Insufficient Balance"}))),
      Err(ProviderError::Quota(_))
    ));
  }

  #[test]
  fn validation_statuses() {
    assert!(matches!(
      classify(&resp(422, json!({"message": "to is invalid"}))),
      Err(ProviderError::Validation(_))
    ));
  }

  #[test]
  fn server_error_is_unknown() {
    let err = classify(&resp(503, Value::String("upstream down".into()))).unwrap_err();
    assert_eq!(err, ProviderError::Unknown("Failed to send SMS (Status: 503)".into()));
  }
}
