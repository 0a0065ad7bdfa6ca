//! [`Dispatcher`]: send, classify, record.

use std::sync::Arc;

use futures::future::join_all;
use rollcall_core::{
  clock::{self, Clock},
  log::{DeliveryStatus, MessageLog},
  store::RecordStore,
};

use crate::{ProviderError, SmsTransport, classify, phone::normalize_phone};

/// The outcome of notifying one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
  /// The number as stored on the student record.
  pub phone:  String,
  pub result: Result<(), ProviderError>,
}

impl Delivery {
  pub fn is_sent(&self) -> bool { self.result.is_ok() }
}

/// Sends notifications and records one message log entry per attempt.
pub struct Dispatcher<T, S> {
  transport:    T,
  store:        Arc<S>,
  clock:        Arc<dyn Clock>,
  country_code: String,
}

impl<T, S> Dispatcher<T, S>
where
  T: SmsTransport,
  S: RecordStore,
{
  pub fn new(
    transport: T,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    country_code: impl Into<String>,
  ) -> Self {
    Self { transport, store, clock, country_code: country_code.into() }
  }

  /// Send `message` to `phone` and log the outcome.
  ///
  /// The message log entry is written whatever the outcome, under the number
  /// as stored on the student record. A failure to write it is traced and
  /// does not change the returned result.
  pub async fn send(
    &self,
    rfid: &str,
    phone: &str,
    message: &str,
    student_name: Option<&str>,
  ) -> Result<(), ProviderError> {
    let to = normalize_phone(phone, &self.country_code);

    let result = match self.transport.send(&to, message).await {
      Ok(resp) => classify(&resp),
      Err(e) => Err(ProviderError::from(e)),
    };

    match &result {
      Ok(()) => tracing::info!(%rfid, %to, "SMS sent"),
      Err(e) => tracing::warn!(%rfid, %to, error = %e, "SMS failed"),
    }

    let entry = MessageLog {
      rfid:         rfid.to_owned(),
      phone_number: phone.to_owned(),
      message:      message.to_owned(),
      status:       if result.is_ok() { DeliveryStatus::Sent } else { DeliveryStatus::Failed },
      timestamp:    clock::to_millis(self.clock.now()),
      student_name: student_name.map(str::to_owned),
    };
    if let Err(e) = self.store.append_message(entry).await {
      tracing::warn!(%rfid, error = %e, "failed to record message log");
    }

    result
  }

  /// Send to every phone concurrently. Each recipient's outcome is
  /// independent of the others; results come back in input order.
  pub async fn send_all<'a>(
    &self,
    rfid: &str,
    phones: impl IntoIterator<Item = &'a str>,
    message: &str,
    student_name: Option<&str>,
  ) -> Vec<Delivery> {
    let attempts = phones.into_iter().map(|phone| async move {
      Delivery {
        phone:  phone.to_owned(),
        result: self.send(rfid, phone, message, student_name).await,
      }
    });
    join_all(attempts).await
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashSet, sync::Mutex};

  use chrono::{Local, TimeZone as _};
  use rollcall_core::clock::ManualClock;
  use rollcall_store_sqlite::SqliteStore;
  use serde_json::json;

  use super::*;
  use crate::{ProviderResponse, TransportError};

  /// Succeeds for every number except those in `failing`.
  #[derive(Default)]
  struct MockTransport {
    failing: HashSet<String>,
    timeout: bool,
    sent:    Mutex<Vec<(String, String)>>,
  }

  impl SmsTransport for MockTransport {
    async fn send(&self, to: &str, text: &str) -> Result<ProviderResponse, TransportError> {
      self.sent.lock().unwrap().push((to.to_owned(), text.to_owned()));
      if self.timeout {
        return Err(TransportError::Timeout(30));
      }
      if self.failing.contains(to) {
        Ok(ProviderResponse::new(400, json!({"message": "Invalid phone number"})))
      } else {
        Ok(ProviderResponse::new(200, json!({"code": "ok"})))
      }
    }
  }

  async fn dispatcher(transport: MockTransport) -> (Dispatcher<MockTransport, SqliteStore>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let clock = Arc::new(ManualClock::new(
      Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).single().unwrap(),
    ));
    (Dispatcher::new(transport, store.clone(), clock, "234"), store)
  }

  #[tokio::test]
  async fn success_is_logged_as_sent_and_transport_gets_normalised_number() {
    let (d, store) = dispatcher(MockTransport::default()).await;

    d.send("A1", "0800000001", "hello", Some("Jane Doe")).await.unwrap();

    let logs = store.list_messages().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, DeliveryStatus::Sent);
    assert_eq!(logs[0].phone_number, "0800000001");
    assert_eq!(logs[0].student_name.as_deref(), Some("Jane Doe"));
    assert_eq!(
      d.transport.sent.lock().unwrap().as_slice(),
      [("234800000001".to_string(), "hello".to_string())]
    );
  }

  #[tokio::test]
  async fn timeout_is_unknown_and_logged_failed() {
    let (d, store) = dispatcher(MockTransport { timeout: true, ..Default::default() }).await;

    let err = d.send("A1", "0800000001", "hello", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unknown(_)));

    let logs = store.list_messages().await.unwrap();
    assert_eq!(logs[0].status, DeliveryStatus::Failed);
  }

  #[tokio::test]
  async fn recipients_fail_independently() {
    let transport = MockTransport {
      failing: HashSet::from(["234800000002".to_string()]),
      ..Default::default()
    };
    let (d, store) = dispatcher(transport).await;

    let deliveries = d
      .send_all("A1", ["0800000001", "0800000002"], "hello", Some("Jane Doe"))
      .await;

    assert_eq!(deliveries.len(), 2);
    assert!(deliveries[0].is_sent());
    assert!(matches!(deliveries[1].result, Err(ProviderError::Validation(_))));
    assert_eq!(deliveries[1].phone, "0800000002");

    let logs = store.list_messages().await.unwrap();
    let sent = logs.iter().filter(|l| l.status == DeliveryStatus::Sent).count();
    let failed = logs.iter().filter(|l| l.status == DeliveryStatus::Failed).count();
    assert_eq!((sent, failed), (1, 1));
  }

  #[tokio::test]
  async fn recipients_of_one_scan_share_a_timestamp() {
    let (d, store) = dispatcher(MockTransport::default()).await;

    d.send_all("A1", ["0800000001", "0800000002"], "hello", None).await;

    let logs = store.list_messages().await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].timestamp, logs[1].timestamp);

    // Deleting by timestamp removes both recipients' entries together.
    store.delete_messages(&[logs[0].timestamp]).await.unwrap();
    assert!(store.list_messages().await.unwrap().is_empty());
  }
}
