//! Session-wide debounce of raw tag reads.

use chrono::{DateTime, Local, TimeDelta};

/// Discards reads that arrive within `window` of the last accepted read,
/// whatever tag they carry. One physical tap can surface as several
/// discovery events; only the first counts.
#[derive(Debug, Clone)]
pub(crate) struct Debouncer {
  window:        TimeDelta,
  last_accepted: Option<DateTime<Local>>,
}

impl Debouncer {
  pub(crate) fn new(window: TimeDelta) -> Self { Self { window, last_accepted: None } }

  /// Returns `true` and remembers `at` if the read should be processed.
  pub(crate) fn accept(&mut self, at: DateTime<Local>) -> bool {
    if let Some(prev) = self.last_accepted
      && at >= prev
      && at - prev < self.window
    {
      return false;
    }
    self.last_accepted = Some(at);
    true
  }

  pub(crate) fn reset(&mut self) { self.last_accepted = None; }
}
