//! The `RecordStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `rollcall-store-sqlite`).
//! The scan pipeline and the CLI depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  log::{AttendanceLog, MessageLog},
  student::Student,
};

/// Result of a bulk student import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
  pub imported: usize,
  /// Rfids skipped because they already existed in the store or appeared
  /// earlier in the same batch.
  pub skipped:  Vec<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the attendance record store.
///
/// Each entity type lives in a single serialised collection. Every mutation
/// reads the whole collection, changes it in memory, and writes it back, so
/// concurrent writers race and the last one wins. Updates and deletes that
/// match nothing leave the collection unchanged and are not errors.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Students ──────────────────────────────────────────────────────────

  /// Add a new student. Fails with a duplicate-key error if a student with
  /// the same rfid already exists; the store is left unchanged.
  fn register_student(
    &self,
    student: Student,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a student by tag identifier. Returns `None` if not found.
  fn get_student<'a>(
    &'a self,
    rfid: &'a str,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + 'a;

  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Replace the student stored under `rfid`.
  fn update_student<'a>(
    &'a self,
    rfid: &'a str,
    student: Student,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_student<'a>(
    &'a self,
    rfid: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Overwrite the whole student collection in one write.
  fn save_students(
    &self,
    students: Vec<Student>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append `students`, skipping any whose rfid is already present.
  fn import_students(
    &self,
    students: Vec<Student>,
  ) -> impl Future<Output = Result<ImportSummary, Self::Error>> + Send + '_;

  // ── Attendance log ────────────────────────────────────────────────────

  fn append_attendance(
    &self,
    entry: AttendanceLog,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_attendance(
    &self,
  ) -> impl Future<Output = Result<Vec<AttendanceLog>, Self::Error>> + Send + '_;

  /// Remove every entry whose timestamp is in `timestamps`.
  fn delete_attendance<'a>(
    &'a self,
    timestamps: &'a [i64],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn clear_attendance(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Message log ───────────────────────────────────────────────────────

  fn append_message(
    &self,
    entry: MessageLog,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List message entries, with missing `student_name`s filled in from the
  /// current student collection (see
  /// [`backfill_student_names`](crate::log::backfill_student_names)).
  fn list_messages(
    &self,
  ) -> impl Future<Output = Result<Vec<MessageLog>, Self::Error>> + Send + '_;

  fn delete_messages<'a>(
    &'a self,
    timestamps: &'a [i64],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn clear_messages(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Daily reset marker ────────────────────────────────────────────────

  /// Epoch milliseconds of the last daily reset, if one has ever run.
  fn last_reset(
    &self,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  fn set_last_reset(
    &self,
    at_millis: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
