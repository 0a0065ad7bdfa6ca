//! [`TermiiTransport`]: HTTP transport for the Termii SMS API.

use std::{fmt, path::PathBuf, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  DebugLog, ProviderResponse, SmsTransport, TransportError, phone::DEFAULT_COUNTRY_CODE,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// SMS provider settings, deserialised from the `[sms]` config table.
#[derive(Clone, Deserialize)]
pub struct SmsConfig {
  /// Base URL, e.g. `https://api.ng.termii.com`.
  #[serde(default)]
  pub api_url:      String,
  #[serde(default)]
  pub api_key:      String,
  #[serde(default)]
  pub sender_id:    String,
  #[serde(default = "default_channel")]
  pub channel:      String,
  #[serde(default = "default_country_code")]
  pub country_code: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Where to append redacted request/response pairs, if anywhere.
  #[serde(default)]
  pub debug_log:    Option<PathBuf>,
}

fn default_channel() -> String { "dnd".into() }
fn default_country_code() -> String { DEFAULT_COUNTRY_CODE.into() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for SmsConfig {
  fn default() -> Self {
    Self {
      api_url:      String::new(),
      api_key:      String::new(),
      sender_id:    String::new(),
      channel:      default_channel(),
      country_code: default_country_code(),
      timeout_secs: default_timeout_secs(),
      debug_log:    None,
    }
  }
}

impl fmt::Debug for SmsConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SmsConfig")
      .field("api_url", &self.api_url)
      .field("api_key", &"***")
      .field("sender_id", &self.sender_id)
      .field("channel", &self.channel)
      .field("country_code", &self.country_code)
      .field("timeout_secs", &self.timeout_secs)
      .field("debug_log", &self.debug_log)
      .finish()
  }
}

// ─── Wire payload ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SendRequest<'a> {
  to:      &'a str,
  from:    &'a str,
  sms:     &'a str,
  #[serde(rename = "type")]
  kind:    &'a str,
  channel: &'a str,
  api_key: &'a str,
}

impl SendRequest<'_> {
  /// The payload as JSON with the credential masked.
  fn redacted(&self) -> Value {
    let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
    if let Some(key) = value.get_mut("api_key") {
      *key = Value::String("***".into());
    }
    value
  }
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// POSTs one JSON request per message to `{api_url}/api/sms/send`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TermiiTransport {
  client: Client,
  config: SmsConfig,
  log:    DebugLog,
}

impl TermiiTransport {
  pub fn new(config: SmsConfig) -> Result<Self, TransportError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    let log = config
      .debug_log
      .clone()
      .map(DebugLog::to_file)
      .unwrap_or_default();
    Ok(Self { client, config, log })
  }

  fn endpoint(&self) -> String {
    format!("{}/api/sms/send", self.config.api_url.trim_end_matches('/'))
  }

  fn check_configured(&self) -> Result<(), TransportError> {
    let missing: Vec<&str> = [
      ("api_key", &self.config.api_key),
      ("sender_id", &self.config.sender_id),
      ("api_url", &self.config.api_url),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(k, _)| k)
    .collect();

    if missing.is_empty() {
      Ok(())
    } else {
      Err(TransportError::NotConfigured(missing.join(", ")))
    }
  }
}

impl SmsTransport for TermiiTransport {
  async fn send(&self, to: &str, text: &str) -> Result<ProviderResponse, TransportError> {
    if let Err(e) = self.check_configured() {
      self.log.append(&e.to_string()).await;
      return Err(e);
    }

    let payload = SendRequest {
      to,
      from: &self.config.sender_id,
      sms: text,
      kind: "plain",
      channel: &self.config.channel,
      api_key: &self.config.api_key,
    };
    self
      .log
      .append(&format!("Sending SMS payload:\n{:#}", payload.redacted()))
      .await;

    let timeout = self.config.timeout_secs;
    let resp = self
      .client
      .post(self.endpoint())
      .json(&payload)
      .send()
      .await
      .map_err(|e| {
        if e.is_timeout() { TransportError::Timeout(timeout) } else { e.into() }
      })?;

    let status = resp.status().as_u16();
    let raw = resp.text().await.map_err(|e| {
      if e.is_timeout() { TransportError::Timeout(timeout) } else { e.into() }
    })?;
    let body = serde_json::from_str(&raw).unwrap_or(Value::String(raw));

    self
      .log
      .append(&format!("Provider response ({status}):\n{body:#}"))
      .await;

    Ok(ProviderResponse { status, body })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn redacts_api_key() {
    let payload = SendRequest {
      to:      "2348000000001",
      from:    "School",
      sms:     "hello",
      kind:    "plain",
      channel: "dnd",
      api_key: "secret",
    };
    let value = payload.redacted();
    assert_eq!(value["api_key"], "***");
    assert_eq!(value["type"], "plain");
    assert_eq!(value["to"], "2348000000001");
  }

  #[test]
  fn debug_output_hides_key() {
    let config = SmsConfig { api_key: "secret".into(), ..SmsConfig::default() };
    assert!(!format!("{config:?}").contains("secret"));
  }

  #[tokio::test]
  async fn unconfigured_transport_fails_without_request() {
    let transport = TermiiTransport::new(SmsConfig::default()).unwrap();
    let err = transport.send("2348000000001", "hello").await.unwrap_err();
    assert!(matches!(err, TransportError::NotConfigured(ref m) if m.contains("api_key")));
  }

  #[test]
  fn endpoint_joins_base_url() {
    let config = SmsConfig {
      api_url: "https://api.example.com/".into(),
      ..SmsConfig::default()
    };
    let transport = TermiiTransport::new(config).unwrap();
    assert_eq!(transport.endpoint(), "https://api.example.com/api/sms/send");
  }
}
