//! Student: the identity record a tag resolves to.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::clock;

/// Attendance event type.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Event {
  In,
  Out,
}

impl Event {
  /// The verb used in parent notifications.
  pub fn verb(self) -> &'static str {
    match self {
      Self::In => "entered",
      Self::Out => "exited",
    }
  }
}

/// The most recent clock event recorded for a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
  pub event:     Event,
  /// Epoch milliseconds.
  pub timestamp: i64,
}

impl LastEvent {
  pub fn new(event: Event, at: DateTime<Local>) -> Self {
    Self { event, timestamp: clock::to_millis(at) }
  }

  /// Whether this event happened on the same local calendar date as `now`.
  pub fn is_same_day(&self, now: DateTime<Local>) -> bool {
    clock::same_local_day(self.timestamp, now)
  }
}

/// A registered student, keyed by the opaque identifier of their RFID tag.
///
/// Phone numbers are validated by the registering caller; nothing in the
/// pipeline re-checks them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub rfid:             String,
  pub name:             String,
  pub admission_number: String,
  pub parent_phone:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_phone2:    Option<String>,
  #[serde(default)]
  pub last_event:       Option<LastEvent>,
}

impl Student {
  pub fn new(
    rfid: impl Into<String>,
    name: impl Into<String>,
    admission_number: impl Into<String>,
    parent_phone: impl Into<String>,
  ) -> Self {
    Self {
      rfid:             rfid.into(),
      name:             name.into(),
      admission_number: admission_number.into(),
      parent_phone:     parent_phone.into(),
      parent_phone2:    None,
      last_event:       None,
    }
  }

  pub fn with_secondary_phone(mut self, phone: impl Into<String>) -> Self {
    self.parent_phone2 = Some(phone.into());
    self
  }

  /// Every phone to notify: the primary always, the secondary if present.
  pub fn phones(&self) -> impl Iterator<Item = &str> {
    std::iter::once(self.parent_phone.as_str())
      .chain(self.parent_phone2.as_deref().filter(|p| !p.is_empty()))
  }

  pub fn first_name(&self) -> &str {
    self.name.split_whitespace().next().unwrap_or(&self.name)
  }

  /// Display form used in lists: first name plus initials of the rest,
  /// e.g. `"Jane M D"` for `"Jane Mary Doe"`.
  pub fn short_name(&self) -> String {
    let mut parts = self.name.split_whitespace();
    let Some(first) = parts.next() else {
      return String::new();
    };
    let initials: Vec<String> = parts
      .filter_map(|p| p.chars().next())
      .map(|c| c.to_uppercase().collect())
      .collect();
    if initials.is_empty() {
      first.to_owned()
    } else {
      format!("{first} {}", initials.join(" "))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn serializes_with_camel_case_keys() {
    let mut s = Student::new("A1", "Jane Doe", "ADM-1", "0800000001");
    s.last_event = Some(LastEvent { event: Event::In, timestamp: 1_700_000_000_000 });

    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["admissionNumber"], "ADM-1");
    assert_eq!(json["parentPhone"], "0800000001");
    assert_eq!(json["lastEvent"]["event"], "in");
    assert!(json.get("parentPhone2").is_none());
  }

  #[test]
  fn deserializes_without_optional_fields() {
    let s: Student = serde_json::from_str(
      r#"{"rfid":"A1","name":"Jane","admissionNumber":"1","parentPhone":"0800000001"}"#,
    )
    .unwrap();
    assert_eq!(s.parent_phone2, None);
    assert_eq!(s.last_event, None);
  }

  #[test]
  fn phones_skips_missing_secondary() {
    let one = Student::new("A1", "Jane", "1", "0800000001");
    assert_eq!(one.phones().collect::<Vec<_>>(), ["0800000001"]);

    let two = one.with_secondary_phone("0800000002");
    assert_eq!(two.phones().collect::<Vec<_>>(), ["0800000001", "0800000002"]);
  }

  #[test]
  fn names() {
    let s = Student::new("A1", "Jane mary Doe", "1", "0800000001");
    assert_eq!(s.first_name(), "Jane");
    assert_eq!(s.short_name(), "Jane M D");
    assert_eq!(Student::new("A2", "Solo", "2", "x").short_name(), "Solo");
  }

  #[test]
  fn event_string_forms() {
    assert_eq!(Event::In.to_string(), "in");
    assert_eq!("OUT".parse::<Event>().unwrap(), Event::Out);
    assert_eq!(Event::Out.verb(), "exited");
  }
}
