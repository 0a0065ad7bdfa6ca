//! Session settings read by the pipeline.

use std::time::Duration;

use chrono::TimeDelta;
use rollcall_core::policy::{DEFAULT_CUTOFF_HOUR, EventPolicy};
use serde::Deserialize;

/// Operator-facing toggles, deserialised from the `[session]` config table.
/// The pipeline reads these; it never writes them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Speak a greeting or farewell after each clock event.
  pub tts_enabled:             bool,
  /// Start a fresh scan attempt after every outcome instead of stopping.
  pub continuous_scan_enabled: bool,
  /// Allow operator-entered clock events.
  pub manual_clock_enabled:    bool,
  /// Local hour at which scans switch from `in` to `out`.
  pub cutoff_hour:             u32,
  /// Reads closer together than this are treated as one tap.
  pub debounce_ms:             u64,
  /// Pause between attempts in continuous mode.
  pub retry_delay_ms:          u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      tts_enabled:             true,
      continuous_scan_enabled: true,
      manual_clock_enabled:    true,
      cutoff_hour:             DEFAULT_CUTOFF_HOUR,
      debounce_ms:             2000,
      retry_delay_ms:          2000,
    }
  }
}

impl Settings {
  pub fn event_policy(&self) -> EventPolicy { EventPolicy::new(self.cutoff_hour) }

  pub fn debounce_window(&self) -> TimeDelta {
    TimeDelta::milliseconds(i64::try_from(self.debounce_ms).unwrap_or(i64::MAX))
  }

  pub fn retry_delay(&self) -> Duration { Duration::from_millis(self.retry_delay_ms) }
}
