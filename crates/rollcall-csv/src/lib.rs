//! CSV codec for rollcall.
//!
//! Imports student rosters and exports students and attendance logs. Pure
//! synchronous over `std::io`; duplicate detection belongs to the store's
//! [`import_students`](rollcall_core::store::RecordStore::import_students).
//!
//! # Import format
//!
//! A header row naming the columns, in any order:
//!
//! ```text
//! rfid,name,admissionNumber,parentPhone,parentPhone2,lastEvent
//! 04A1,Jane Doe,ADM-001,08000000001,,
//! ```
//!
//! `parentPhone2` and `lastEvent` are optional. `lastEvent` holds JSON such
//! as `{"event":"in","timestamp":1709542800000}`.

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
use rollcall_core::{log::AttendanceLog, student::Student};

// ─── Public types ────────────────────────────────────────────────────────────

/// A row left out of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
  /// 1-based line in the input; the header is line 1.
  pub line:   u64,
  pub reason: String,
}

/// The students read from one file, plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStudents {
  pub students: Vec<Student>,
  pub skipped:  Vec<SkippedRow>,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Parse a student roster.
///
/// Values are trimmed. Rows missing `rfid`, `name`, `admissionNumber` or
/// `parentPhone` are skipped; an unreadable `lastEvent` becomes `None`.
/// Fails with [`Error::NoValidRows`] when nothing usable remains, and with
/// [`Error::Csv`] when the file is not well-formed CSV.
pub fn parse_students<R: std::io::Read>(input: R) -> Result<ParsedStudents> {
  parse::parse_students(input)
}

/// Write `students` in the import format. An empty slice writes nothing.
pub fn write_students<W: std::io::Write>(out: W, students: &[Student]) -> Result<()> {
  serialize::write_students(out, students)
}

/// Write attendance logs with a local-time column next to the raw
/// timestamp.
pub fn write_attendance<W: std::io::Write>(out: W, logs: &[AttendanceLog]) -> Result<()> {
  serialize::write_attendance(out, logs)
}

#[cfg(test)]
mod tests {
  use chrono::{Local, TimeZone as _};
  use rollcall_core::{
    clock,
    store::RecordStore,
    student::{Event, LastEvent},
  };
  use rollcall_store_sqlite::SqliteStore;

  use super::*;

  fn parse(input: &str) -> Result<ParsedStudents> { parse_students(input.as_bytes()) }

  #[test]
  fn reads_required_and_optional_columns_trimmed() {
    let parsed = parse(
      "rfid,name,admissionNumber,parentPhone,parentPhone2\n\
       \x20A1 , Jane Doe ,ADM-001, 0800000001 ,0800000002\n\
       B2,Ben Ade,ADM-002,0800000003,\n",
    )
    .unwrap();

    assert!(parsed.skipped.is_empty());
    assert_eq!(parsed.students, [
      Student::new("A1", "Jane Doe", "ADM-001", "0800000001")
        .with_secondary_phone("0800000002"),
      Student::new("B2", "Ben Ade", "ADM-002", "0800000003"),
    ]);
  }

  #[test]
  fn columns_may_come_in_any_order() {
    let parsed = parse("parentPhone,name,rfid,admissionNumber\n0800000001,Jane,A1,ADM-1\n")
      .unwrap();
    assert_eq!(parsed.students[0].rfid, "A1");
    assert_eq!(parsed.students[0].parent_phone, "0800000001");
  }

  #[test]
  fn rows_missing_required_values_are_skipped_with_line() {
    let parsed = parse(
      "rfid,name,admissionNumber,parentPhone\n\
       A1,Jane Doe,ADM-001,0800000001\n\
       B2,,ADM-002,0800000003\n\
       C3,Cara,ADM-003,   \n",
    )
    .unwrap();

    assert_eq!(parsed.students.len(), 1);
    let lines: Vec<u64> = parsed.skipped.iter().map(|s| s.line).collect();
    assert_eq!(lines, [3, 4]);
  }

  #[test]
  fn last_event_json_is_decoded_or_dropped() {
    let ts = clock::to_millis(Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap());
    let input = format!(
      "rfid,name,admissionNumber,parentPhone,lastEvent\n\
       A1,Jane,ADM-1,0800000001,\"{{\"\"event\"\":\"\"in\"\",\"\"timestamp\"\":{ts}}}\"\n\
       B2,Ben,ADM-2,0800000003,not json\n"
    );

    let parsed = parse(&input).unwrap();

    assert_eq!(parsed.students[0].last_event, Some(LastEvent { event: Event::In, timestamp: ts }));
    assert_eq!(parsed.students[1].last_event, None);
    assert!(parsed.skipped.is_empty());
  }

  #[test]
  fn no_valid_rows_is_an_error() {
    assert!(matches!(
      parse("rfid,name,admissionNumber,parentPhone\n"),
      Err(Error::NoValidRows)
    ));
    assert!(matches!(
      parse("rfid,name\nA1,Jane\n"),
      Err(Error::NoValidRows)
    ));
  }

  #[tokio::test]
  async fn duplicate_rfid_in_file_keeps_first_on_import() {
    let parsed = parse(
      "rfid,name,admissionNumber,parentPhone\n\
       B2,Ben,ADM-002,0800000003\n\
       B2,Ben Again,ADM-003,0800000004\n",
    )
    .unwrap();
    assert_eq!(parsed.students.len(), 2);

    let store = SqliteStore::open_in_memory().await.unwrap();
    let summary = store.import_students(parsed.students).await.unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, ["B2".to_string()]);
    assert_eq!(store.get_student("B2").await.unwrap().unwrap().name, "Ben");
  }

  #[test]
  fn exported_students_reimport_unchanged() {
    let at = Local.with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap();
    let mut jane = Student::new("A1", "Doe, Jane", "ADM-001", "0800000001")
      .with_secondary_phone("0800000002");
    jane.last_event = Some(LastEvent::new(Event::Out, at));
    let ben = Student::new("B2", "Ben Ade", "ADM-002", "0800000003");
    let students = vec![jane, ben];

    let mut out = Vec::new();
    write_students(&mut out, &students).unwrap();

    let text = String::from_utf8(out.clone()).unwrap();
    assert!(text.starts_with(
      "rfid,name,admissionNumber,parentPhone,parentPhone2,lastEvent\n"
    ));
    assert_eq!(parse_students(out.as_slice()).unwrap().students, students);
  }

  #[test]
  fn attendance_export_has_readable_time() {
    let at = Local.with_ymd_and_hms(2024, 3, 4, 9, 5, 0).unwrap();
    let logs = [AttendanceLog {
      rfid:         "A1".into(),
      event:        Event::In,
      timestamp:    clock::to_millis(at),
      student_name: Some("Jane Doe".into()),
      manual:       true,
    }];

    let mut out = Vec::new();
    write_attendance(&mut out, &logs).unwrap();
    let text = String::from_utf8(out).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("rfid,studentName,event,timestamp,time,manual"));
    assert_eq!(
      lines.next().map(str::to_owned),
      Some(format!("A1,Jane Doe,in,{},2024-03-04 09:05:00,true", clock::to_millis(at)))
    );
  }
}
