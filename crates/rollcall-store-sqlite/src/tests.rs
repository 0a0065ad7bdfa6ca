//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Local, TimeZone as _};
use rollcall_core::{
  clock,
  log::{AttendanceLog, DeliveryStatus, MessageLog, UNKNOWN_STUDENT},
  reset::maybe_reset_statuses,
  store::RecordStore,
  student::{Event, LastEvent, Student},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn jane() -> Student { Student::new("A1", "Jane Doe", "ADM-001", "0800000001") }

fn at(d: u32, h: u32, m: u32) -> DateTime<Local> {
  Local.with_ymd_and_hms(2024, 3, d, h, m, 0).single().unwrap()
}

fn attendance(rfid: &str, timestamp: i64) -> AttendanceLog {
  AttendanceLog {
    rfid: rfid.into(),
    event: Event::In,
    timestamp,
    student_name: None,
    manual: false,
  }
}

fn message(rfid: &str, timestamp: i64, name: Option<&str>) -> MessageLog {
  MessageLog {
    rfid: rfid.into(),
    phone_number: "2348000000001".into(),
    message: "Dear Parent".into(),
    status: DeliveryStatus::Sent,
    timestamp,
    student_name: name.map(Into::into),
  }
}

// ─── Students ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_resolve_returns_equal_record() {
  let s = store().await;
  let student = jane().with_secondary_phone("0800000002");

  s.register_student(student.clone()).await.unwrap();

  let fetched = s.get_student("A1").await.unwrap();
  assert_eq!(fetched, Some(student));
}

#[tokio::test]
async fn get_student_missing_returns_none() {
  let s = store().await;
  assert!(s.get_student("nope").await.unwrap().is_none());
  assert!(s.list_students().await.unwrap().is_empty());
}

#[tokio::test]
async fn register_duplicate_rfid_errors_and_leaves_store_unchanged() {
  let s = store().await;
  s.register_student(jane()).await.unwrap();

  let mut imposter = jane();
  imposter.name = "Someone Else".into();
  let err = s.register_student(imposter).await.unwrap_err();
  assert!(err.is_duplicate_key());

  let all = s.list_students().await.unwrap();
  assert_eq!(all, vec![jane()]);
}

#[tokio::test]
async fn register_empty_rfid_errors() {
  let s = store().await;
  let err = s
    .register_student(Student::new("", "Nobody", "0", "0800000000"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(rollcall_core::Error::EmptyRfid)
  ));
}

#[tokio::test]
async fn update_replaces_matching_student_only() {
  let s = store().await;
  s.register_student(jane()).await.unwrap();
  s.register_student(Student::new("B2", "Ben", "ADM-002", "0800000003"))
    .await
    .unwrap();

  let mut updated = jane();
  updated.last_event = Some(LastEvent::new(Event::In, at(4, 9, 0)));
  s.update_student("A1", updated.clone()).await.unwrap();

  assert_eq!(s.get_student("A1").await.unwrap(), Some(updated));
  assert_eq!(s.get_student("B2").await.unwrap().unwrap().last_event, None);
}

#[tokio::test]
async fn update_and_delete_missing_are_noops() {
  let s = store().await;
  s.register_student(jane()).await.unwrap();

  s.update_student("ZZ", Student::new("ZZ", "Ghost", "0", "0"))
    .await
    .unwrap();
  s.delete_student("ZZ").await.unwrap();

  assert_eq!(s.list_students().await.unwrap(), vec![jane()]);
}

#[tokio::test]
async fn delete_removes_student() {
  let s = store().await;
  s.register_student(jane()).await.unwrap();
  s.delete_student("A1").await.unwrap();
  assert!(s.get_student("A1").await.unwrap().is_none());
}

#[tokio::test]
async fn import_skips_existing_and_in_batch_duplicates() {
  let s = store().await;
  s.register_student(jane()).await.unwrap();

  let summary = s
    .import_students(vec![
      Student::new("B2", "Ben", "ADM-002", "0800000003"),
      Student::new("B2", "Ben Again", "ADM-003", "0800000004"),
      Student::new("A1", "Jane Twin", "ADM-004", "0800000005"),
      Student::new("C3", "Cara", "ADM-005", "0800000006"),
    ])
    .await
    .unwrap();

  assert_eq!(summary.imported, 2);
  assert_eq!(summary.skipped, vec!["B2".to_string(), "A1".to_string()]);

  let all = s.list_students().await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(s.get_student("B2").await.unwrap().unwrap().name, "Ben");
  assert_eq!(s.get_student("A1").await.unwrap().unwrap().name, "Jane Doe");
}

// ─── Attendance log ──────────────────────────────────────────────────────────

#[tokio::test]
async fn attendance_appends_in_order() {
  let s = store().await;
  s.append_attendance(attendance("A1", 1)).await.unwrap();
  s.append_attendance(attendance("B2", 2)).await.unwrap();

  let logs = s.list_attendance().await.unwrap();
  assert_eq!(logs.iter().map(|l| l.timestamp).collect::<Vec<_>>(), [1, 2]);
}

#[tokio::test]
async fn delete_attendance_by_timestamp() {
  let s = store().await;
  for ts in [10, 20, 30] {
    s.append_attendance(attendance("A1", ts)).await.unwrap();
  }

  s.delete_attendance(&[10, 30, 999]).await.unwrap();
  let logs = s.list_attendance().await.unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].timestamp, 20);

  s.clear_attendance().await.unwrap();
  assert!(s.list_attendance().await.unwrap().is_empty());
}

// ─── Message log ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_messages_backfills_missing_names() {
  let s = store().await;
  s.register_student(jane()).await.unwrap();
  s.append_message(message("A1", 1, None)).await.unwrap();
  s.append_message(message("A1", 2, Some("Jane At Write"))).await.unwrap();
  s.append_message(message("GONE", 3, None)).await.unwrap();

  let logs = s.list_messages().await.unwrap();
  let names: Vec<_> = logs
    .iter()
    .map(|l| l.student_name.as_deref().unwrap())
    .collect();
  assert_eq!(names, ["Jane Doe", "Jane At Write", UNKNOWN_STUDENT]);
}

#[tokio::test]
async fn delete_and_clear_messages() {
  let s = store().await;
  for ts in [1, 2, 3] {
    s.append_message(message("A1", ts, None)).await.unwrap();
  }
  s.delete_messages(&[2]).await.unwrap();
  assert_eq!(s.list_messages().await.unwrap().len(), 2);

  s.clear_messages().await.unwrap();
  assert!(s.list_messages().await.unwrap().is_empty());
}

// ─── Daily reset ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_clears_last_events_and_stores_marker() {
  let s = store().await;
  let mut student = jane();
  student.last_event = Some(LastEvent::new(Event::In, at(3, 9, 0)));
  s.register_student(student).await.unwrap();

  let now = at(4, 7, 0);
  assert!(maybe_reset_statuses(&s, now).await.unwrap());

  assert_eq!(s.get_student("A1").await.unwrap().unwrap().last_event, None);
  assert_eq!(s.last_reset().await.unwrap(), Some(clock::to_millis(now)));
}

#[tokio::test]
async fn reset_twice_same_day_mutates_once() {
  let s = store().await;
  s.register_student(jane()).await.unwrap();

  assert!(maybe_reset_statuses(&s, at(4, 7, 0)).await.unwrap());

  // A clock event after the first reset must survive the second call.
  let mut clocked = jane();
  clocked.last_event = Some(LastEvent::new(Event::In, at(4, 8, 0)));
  s.update_student("A1", clocked.clone()).await.unwrap();

  assert!(!maybe_reset_statuses(&s, at(4, 23, 59)).await.unwrap());
  assert_eq!(s.get_student("A1").await.unwrap(), Some(clocked));
  assert_eq!(s.last_reset().await.unwrap(), Some(clock::to_millis(at(4, 7, 0))));
}

#[tokio::test]
async fn reset_runs_again_on_next_calendar_day() {
  let s = store().await;
  let mut student = jane();
  student.last_event = Some(LastEvent::new(Event::Out, at(4, 15, 0)));
  s.register_student(student).await.unwrap();
  s.set_last_reset(clock::to_millis(at(4, 7, 0))).await.unwrap();

  assert!(maybe_reset_statuses(&s, at(5, 0, 1)).await.unwrap());
  assert_eq!(s.get_student("A1").await.unwrap().unwrap().last_event, None);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_store_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("rollcall.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.register_student(jane()).await.unwrap();
    s.append_attendance(attendance("A1", 42)).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get_student("A1").await.unwrap(), Some(jane()));
  assert_eq!(s.list_attendance().await.unwrap().len(), 1);
}
