//! Event-type decision and notification wording.

use chrono::{DateTime, Local, Timelike as _};

use crate::student::{Event, Student};

/// Hour (local, 24h) at which scans switch from clock-in to clock-out.
pub const DEFAULT_CUTOFF_HOUR: u32 = 12;

/// Decides whether a scan is a clock-in or a clock-out from the time of day.
///
/// A single cutoff splits the school day: scans before it are `in`, scans at
/// or after it are `out`. There is no check that an `out` follows an `in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPolicy {
  pub cutoff_hour: u32,
}

impl Default for EventPolicy {
  fn default() -> Self { Self { cutoff_hour: DEFAULT_CUTOFF_HOUR } }
}

impl EventPolicy {
  pub fn new(cutoff_hour: u32) -> Self { Self { cutoff_hour } }

  pub fn decide(&self, now: DateTime<Local>) -> Event {
    if now.hour() < self.cutoff_hour { Event::In } else { Event::Out }
  }
}

/// The parent notification text, e.g.
/// `Dear Parent, Jane Doe has entered the school on Mon, Mar 4, 2024 at 09:00 AM`.
pub fn compose_message(name: &str, event: Event, at: DateTime<Local>) -> String {
  format!(
    "Dear Parent, {name} has {verb} the school on {date} at {time}",
    verb = event.verb(),
    date = at.format("%a, %b %-d, %Y"),
    time = at.format("%I:%M %p"),
  )
}

/// The spoken greeting or farewell for a clock event.
pub fn spoken_phrase(student: &Student, event: Event) -> String {
  let first = student.first_name();
  match event {
    Event::In => format!("Hello {first}, welcome to school"),
    Event::Out => format!("Bye bye {first}"),
  }
}
