//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::{collections::HashSet, path::Path};

use rusqlite::OptionalExtension as _;
use serde::{Serialize, de::DeserializeOwned};

use rollcall_core::{
  log::{AttendanceLog, MessageLog, backfill_student_names},
  store::{ImportSummary, RecordStore},
  student::Student,
};

use crate::{
  Result,
  encode::{
    Collection, decode_collection, decode_marker, encode_collection,
    encode_marker,
  },
  schema::SCHEMA,
};

// ─── Raw row access ──────────────────────────────────────────────────────────

fn read_raw(conn: &rusqlite::Connection, key: &str) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT value FROM collections WHERE key = ?1",
      rusqlite::params![key],
      |row| row.get(0),
    )
    .optional()
}

fn write_raw(conn: &rusqlite::Connection, key: &str, value: &str) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO collections (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    rusqlite::params![key, value],
  )?;
  Ok(())
}

/// Decode, mutate and re-encode one collection.
fn apply<T, R, F>(collection: Collection, raw: Option<&str>, f: F) -> Result<(R, String)>
where
  T: Serialize + DeserializeOwned,
  F: FnOnce(&mut Vec<T>) -> Result<R>,
{
  let mut items = decode_collection(collection, raw)?;
  let value = f(&mut items)?;
  Ok((value, encode_collection(&items)?))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A rollcall record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn read_text(&self, collection: Collection) -> Result<Option<String>> {
    let key = collection.key();
    let raw = self
      .conn
      .call(move |conn| Ok(read_raw(conn, key)?))
      .await?;
    Ok(raw)
  }

  /// Read a whole collection.
  async fn read<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
    let raw = self.read_text(collection).await?;
    decode_collection(collection, raw.as_deref())
  }

  /// Overwrite a whole collection.
  async fn write<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<()> {
    let key = collection.key();
    let encoded = encode_collection(items)?;
    self
      .conn
      .call(move |conn| Ok(write_raw(conn, key, &encoded)?))
      .await?;
    Ok(())
  }

  /// Read-modify-write one collection inside a single transaction.
  ///
  /// If `f` fails, nothing is written and its error is returned.
  async fn modify<T, R, F>(&self, collection: Collection, f: F) -> Result<R>
  where
    T: Serialize + DeserializeOwned + Send + 'static,
    R: Send + 'static,
    F: FnOnce(&mut Vec<T>) -> Result<R> + Send + 'static,
  {
    let key = collection.key();
    let outcome: Result<R> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = read_raw(&tx, key)?;
        let (value, encoded) = match apply(collection, raw.as_deref(), f) {
          Ok(done) => done,
          Err(e) => return Ok(Err(e)),
        };
        write_raw(&tx, key, &encoded)?;
        tx.commit()?;
        Ok(Ok(value))
      })
      .await?;
    outcome
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Students ──────────────────────────────────────────────────────────────

  async fn register_student(&self, student: Student) -> Result<()> {
    if student.rfid.is_empty() {
      return Err(rollcall_core::Error::EmptyRfid.into());
    }
    let rfid = student.rfid.clone();

    self
      .modify(Collection::Students, move |students: &mut Vec<Student>| {
        if students.iter().any(|s| s.rfid == student.rfid) {
          return Err(rollcall_core::Error::DuplicateKey(student.rfid).into());
        }
        students.push(student);
        Ok(())
      })
      .await?;

    tracing::info!(%rfid, "student registered");
    Ok(())
  }

  async fn get_student(&self, rfid: &str) -> Result<Option<Student>> {
    let students: Vec<Student> = self.read(Collection::Students).await?;
    Ok(students.into_iter().find(|s| s.rfid == rfid))
  }

  async fn list_students(&self) -> Result<Vec<Student>> {
    self.read(Collection::Students).await
  }

  async fn update_student(&self, rfid: &str, student: Student) -> Result<()> {
    let rfid = rfid.to_owned();
    self
      .modify(Collection::Students, move |students: &mut Vec<Student>| {
        if let Some(slot) = students.iter_mut().find(|s| s.rfid == rfid) {
          *slot = student;
        }
        Ok(())
      })
      .await
  }

  async fn delete_student(&self, rfid: &str) -> Result<()> {
    let rfid = rfid.to_owned();
    self
      .modify(Collection::Students, move |students: &mut Vec<Student>| {
        students.retain(|s| s.rfid != rfid);
        Ok(())
      })
      .await
  }

  async fn save_students(&self, students: Vec<Student>) -> Result<()> {
    self.write(Collection::Students, &students).await
  }

  async fn import_students(&self, incoming: Vec<Student>) -> Result<ImportSummary> {
    let summary = self
      .modify(Collection::Students, move |students: &mut Vec<Student>| {
        let mut seen: HashSet<String> =
          students.iter().map(|s| s.rfid.clone()).collect();
        let mut summary = ImportSummary::default();

        for student in incoming {
          if student.rfid.is_empty() || !seen.insert(student.rfid.clone()) {
            tracing::warn!(rfid = %student.rfid, "duplicate rfid, skipping student");
            summary.skipped.push(student.rfid);
            continue;
          }
          students.push(student);
          summary.imported += 1;
        }
        Ok(summary)
      })
      .await?;

    tracing::info!(
      imported = summary.imported,
      skipped = summary.skipped.len(),
      "students imported"
    );
    Ok(summary)
  }

  // ── Attendance log ────────────────────────────────────────────────────────

  async fn append_attendance(&self, entry: AttendanceLog) -> Result<()> {
    self
      .modify(Collection::Attendance, move |logs: &mut Vec<AttendanceLog>| {
        logs.push(entry);
        Ok(())
      })
      .await
  }

  async fn list_attendance(&self) -> Result<Vec<AttendanceLog>> {
    self.read(Collection::Attendance).await
  }

  async fn delete_attendance(&self, timestamps: &[i64]) -> Result<()> {
    let doomed: HashSet<i64> = timestamps.iter().copied().collect();
    self
      .modify(Collection::Attendance, move |logs: &mut Vec<AttendanceLog>| {
        logs.retain(|l| !doomed.contains(&l.timestamp));
        Ok(())
      })
      .await
  }

  async fn clear_attendance(&self) -> Result<()> {
    self.write::<AttendanceLog>(Collection::Attendance, &[]).await
  }

  // ── Message log ───────────────────────────────────────────────────────────

  async fn append_message(&self, entry: MessageLog) -> Result<()> {
    self
      .modify(Collection::Messages, move |logs: &mut Vec<MessageLog>| {
        logs.push(entry);
        Ok(())
      })
      .await
  }

  async fn list_messages(&self) -> Result<Vec<MessageLog>> {
    let mut logs: Vec<MessageLog> = self.read(Collection::Messages).await?;
    let students: Vec<Student> = self.read(Collection::Students).await?;
    backfill_student_names(&mut logs, &students);
    Ok(logs)
  }

  async fn delete_messages(&self, timestamps: &[i64]) -> Result<()> {
    let doomed: HashSet<i64> = timestamps.iter().copied().collect();
    self
      .modify(Collection::Messages, move |logs: &mut Vec<MessageLog>| {
        logs.retain(|l| !doomed.contains(&l.timestamp));
        Ok(())
      })
      .await
  }

  async fn clear_messages(&self) -> Result<()> {
    self.write::<MessageLog>(Collection::Messages, &[]).await
  }

  // ── Daily reset marker ────────────────────────────────────────────────────

  async fn last_reset(&self) -> Result<Option<i64>> {
    let raw = self.read_text(Collection::LastReset).await?;
    decode_marker(raw.as_deref())
  }

  async fn set_last_reset(&self, at_millis: i64) -> Result<()> {
    let key = Collection::LastReset.key();
    let encoded = encode_marker(at_millis)?;
    self
      .conn
      .call(move |conn| Ok(write_raw(conn, key, &encoded)?))
      .await?;
    Ok(())
  }
}
