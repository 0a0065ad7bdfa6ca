//! Student import.
//!
//! Every row is deserialised into a [`StudentRow`] of optional fields, then
//! checked for the four required values. Rows that fail the check are
//! skipped and reported; they never abort the import.

use rollcall_core::student::{LastEvent, Student};
use serde::Deserialize;

use crate::{
  ParsedStudents, SkippedRow,
  error::{Error, Result},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StudentRow {
  rfid:             Option<String>,
  name:             Option<String>,
  admission_number: Option<String>,
  parent_phone:     Option<String>,
  parent_phone2:    Option<String>,
  last_event:       Option<String>,
}

/// A present, non-blank value. The reader already trims fields.
fn value(field: Option<String>) -> Option<String> { field.filter(|v| !v.is_empty()) }

impl StudentRow {
  fn into_student(self) -> Result<Student, String> {
    let rfid = value(self.rfid);
    let last_event = value(self.last_event);

    let (Some(rfid), Some(name), Some(admission_number), Some(parent_phone)) = (
      rfid,
      value(self.name),
      value(self.admission_number),
      value(self.parent_phone),
    ) else {
      return Err(
        "missing one of rfid, name, admissionNumber, parentPhone".to_string(),
      );
    };

    let last_event = last_event.and_then(|raw| {
      serde_json::from_str::<LastEvent>(&raw)
        .inspect_err(|e| {
          tracing::warn!(%rfid, error = %e, "ignoring unreadable lastEvent");
        })
        .ok()
    });

    Ok(Student {
      rfid,
      name,
      admission_number,
      parent_phone,
      parent_phone2: value(self.parent_phone2),
      last_event,
    })
  }
}

pub(crate) fn parse_students<R: std::io::Read>(input: R) -> Result<ParsedStudents> {
  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(input);

  let headers = reader.headers()?.clone();
  let mut record = csv::StringRecord::new();
  let mut students = Vec::new();
  let mut skipped = Vec::new();

  while reader.read_record(&mut record)? {
    let line = record.position().map_or(0, csv::Position::line);
    let row: StudentRow = record.deserialize(Some(&headers))?;
    match row.into_student() {
      Ok(student) => students.push(student),
      Err(reason) => {
        tracing::warn!(line, %reason, "skipping invalid row");
        skipped.push(SkippedRow { line, reason });
      }
    }
  }

  if students.is_empty() {
    return Err(Error::NoValidRows);
  }
  Ok(ParsedStudents { students, skipped })
}
