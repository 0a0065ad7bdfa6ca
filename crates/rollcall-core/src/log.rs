//! Attendance and message logs.
//!
//! Both logs are append-only. Entries are never updated; they are removed
//! only by administrative deletes keyed on their timestamp.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::student::{Event, Student};

/// Name shown for message log entries whose student cannot be resolved.
pub const UNKNOWN_STUDENT: &str = "Unknown";

/// One committed clock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLog {
  pub rfid:         String,
  pub event:        Event,
  /// Epoch milliseconds; also the entry's identity for deletes.
  pub timestamp:    i64,
  /// Snapshot of the student's name at write time.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub student_name: Option<String>,
  /// True when entered by an operator rather than a tag scan.
  #[serde(default)]
  pub manual:       bool,
}

/// Outcome of a single SMS delivery attempt.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryStatus {
  Sent,
  Failed,
}

/// One attempted notification to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageLog {
  pub rfid:         String,
  pub phone_number: String,
  pub message:      String,
  pub status:       DeliveryStatus,
  /// Epoch milliseconds; also the entry's identity for deletes. Recipients
  /// of one scan are sent together and usually share a timestamp.
  pub timestamp:    i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub student_name: Option<String>,
}

/// Fill in `student_name` on entries written without one.
///
/// Names recorded at write time are kept even if the student has since been
/// renamed or deleted; only missing names are looked up, falling back to
/// [`UNKNOWN_STUDENT`].
pub fn backfill_student_names(logs: &mut [MessageLog], students: &[Student]) {
  let names: HashMap<&str, &str> = students
    .iter()
    .map(|s| (s.rfid.as_str(), s.name.as_str()))
    .collect();

  for log in logs.iter_mut().filter(|l| l.student_name.is_none()) {
    let name = names.get(log.rfid.as_str()).copied().unwrap_or(UNKNOWN_STUDENT);
    log.student_name = Some(name.to_owned());
  }
}
