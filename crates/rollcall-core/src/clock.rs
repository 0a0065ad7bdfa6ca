//! Wall-clock access and epoch-millisecond conversions.
//!
//! Records store timestamps as epoch milliseconds; every calendar-day and
//! time-of-day decision is made in the device's local time zone.

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone as _};

use crate::{Error, Result};

/// Source of "now" for the pipeline.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Local>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Local> { Local::now() }
}

/// A clock that only moves when told to. Used by tests and replays.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Local>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Local>) -> Self { Self { now: Mutex::new(start) } }

  pub fn set(&self, to: DateTime<Local>) {
    *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
  }

  pub fn advance(&self, by: TimeDelta) {
    let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
    *now += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Local> {
    *self.now.lock().unwrap_or_else(|e| e.into_inner())
  }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

pub fn to_millis(dt: DateTime<Local>) -> i64 { dt.timestamp_millis() }

pub fn from_millis(ms: i64) -> Result<DateTime<Local>> {
  Local
    .timestamp_millis_opt(ms)
    .single()
    .ok_or(Error::InvalidTimestamp(ms))
}

/// The local calendar date of an epoch-millisecond timestamp.
pub fn local_date(ms: i64) -> Result<NaiveDate> {
  Ok(from_millis(ms)?.date_naive())
}

/// Whether `ms` falls on the same local calendar date as `now`.
///
/// This is a calendar comparison, not a rolling 24 hour window: 23:59 and
/// 00:01 the next morning are different days.
pub fn same_local_day(ms: i64, now: DateTime<Local>) -> bool {
  local_date(ms).is_ok_and(|d| d == now.date_naive())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
  }

  #[test]
  fn millis_roundtrip_preserves_instant() {
    let now = at(2024, 3, 4, 9, 0);
    assert_eq!(from_millis(to_millis(now)).unwrap(), now);
  }

  #[test]
  fn same_day_is_calendar_based() {
    let late = at(2024, 3, 4, 23, 59);
    let early_next = at(2024, 3, 5, 0, 1);
    assert!(same_local_day(to_millis(late), at(2024, 3, 4, 8, 0)));
    assert!(!same_local_day(to_millis(late), early_next));
  }

  #[test]
  fn manual_clock_advances() {
    let clock = ManualClock::new(at(2024, 3, 4, 9, 0));
    clock.advance(TimeDelta::milliseconds(2500));
    assert_eq!(
      clock.now(),
      at(2024, 3, 4, 9, 0) + TimeDelta::milliseconds(2500)
    );
    clock.set(at(2024, 3, 5, 7, 30));
    assert_eq!(clock.now(), at(2024, 3, 5, 7, 30));
  }
}
