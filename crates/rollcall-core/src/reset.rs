//! Daily reset of every student's last clock event.

use chrono::{DateTime, Local};

use crate::{clock, store::RecordStore};

/// Clear every student's `last_event` once per local calendar day.
///
/// Compares the date of the stored reset marker with the date of `now`. When
/// they differ, or no marker exists, all students are rewritten in one batch
/// and `now` becomes the new marker. Returns whether a reset happened; a
/// second call on the same day is a no-op.
///
/// Must run before a scan session accepts reads, so a student who clocked in
/// yesterday is eligible again today.
pub async fn maybe_reset_statuses<S: RecordStore>(
  store: &S,
  now: DateTime<Local>,
) -> Result<bool, S::Error> {
  if let Some(last) = store.last_reset().await?
    && clock::same_local_day(last, now)
  {
    tracing::debug!(date = %now.date_naive(), "statuses already reset today");
    return Ok(false);
  }

  let students: Vec<_> = store
    .list_students()
    .await?
    .into_iter()
    .map(|mut s| {
      s.last_event = None;
      s
    })
    .collect();
  let count = students.len();

  store.save_students(students).await?;
  store.set_last_reset(clock::to_millis(now)).await?;

  tracing::info!(date = %now.date_naive(), students = count, "student statuses reset for new day");
  Ok(true)
}
