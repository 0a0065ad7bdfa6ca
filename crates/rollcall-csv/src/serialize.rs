//! Student and attendance export.

use rollcall_core::{clock, log::AttendanceLog, student::Student};
use serde::Serialize;

use crate::error::Result;

/// Matches the import header, so an export can be re-imported as is.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentRow<'a> {
  rfid:             &'a str,
  name:             &'a str,
  admission_number: &'a str,
  parent_phone:     &'a str,
  parent_phone2:    Option<&'a str>,
  last_event:       Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceRow<'a> {
  rfid:         &'a str,
  student_name: Option<&'a str>,
  event:        &'a str,
  timestamp:    i64,
  time:         String,
  manual:       bool,
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn write_students<W: std::io::Write>(out: W, students: &[Student]) -> Result<()> {
  let mut writer = csv::Writer::from_writer(out);
  for s in students {
    let last_event = s.last_event.as_ref().map(serde_json::to_string).transpose()?;
    writer.serialize(StudentRow {
      rfid: &s.rfid,
      name: &s.name,
      admission_number: &s.admission_number,
      parent_phone: &s.parent_phone,
      parent_phone2: s.parent_phone2.as_deref(),
      last_event,
    })?;
  }
  writer.flush()?;
  Ok(())
}

pub(crate) fn write_attendance<W: std::io::Write>(out: W, logs: &[AttendanceLog]) -> Result<()> {
  let mut writer = csv::Writer::from_writer(out);
  for log in logs {
    let time = clock::from_millis(log.timestamp)?.format(TIME_FORMAT).to_string();
    writer.serialize(AttendanceRow {
      rfid: &log.rfid,
      student_name: log.student_name.as_deref(),
      event: log.event.as_ref(),
      timestamp: log.timestamp,
      time,
      manual: log.manual,
    })?;
  }
  writer.flush()?;
  Ok(())
}
