//! [`Processor`]: the scan event state machine.
//!
//! ```text
//! Idle → AwaitingTag → Resolving → Deciding → Committing → Notifying → Idle
//!                          └──────────┴── Error (this attempt only)
//! ```
//!
//! The idempotency check and the commit are separate store calls with no lock
//! between them. Two reads of the same tag that both get past the debounce
//! before the first commit lands can therefore both be recorded. With one
//! reader per device and the debounce in front, this is accepted.

use std::sync::Arc;

use chrono::{DateTime, Local};
use rollcall_core::{
  clock::{self, Clock},
  log::AttendanceLog,
  policy::{EventPolicy, compose_message, spoken_phrase},
  store::RecordStore,
  student::{Event, LastEvent, Student},
};
use rollcall_sms::{Delivery, Dispatcher, SmsTransport};

use crate::{ScanError, ScanMode, Settings, Speaker, debounce::Debouncer};

// ─── Inputs and outputs ──────────────────────────────────────────────────────

/// A raw tag read, stamped with its arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRead {
  pub id: Option<String>,
  pub at: DateTime<Local>,
}

impl TagRead {
  pub fn new(id: Option<String>, at: DateTime<Local>) -> Self { Self { id, at } }
}

/// Where the processor is in handling the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
  #[default]
  Idle,
  AwaitingTag,
  Resolving,
  Deciding,
  Committing,
  Notifying,
  Error,
}

/// Everything the caller needs to render a successful clock event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReceipt {
  pub rfid:       String,
  /// The student as stored after the commit.
  pub student:    Student,
  pub event:      Event,
  pub message:    String,
  pub manual:     bool,
  /// One entry per notified phone, in the order primary, secondary.
  pub deliveries: Vec<Delivery>,
}

impl ClockReceipt {
  /// True when no notification went out at all.
  pub fn sms_failed(&self) -> bool {
    !self.deliveries.is_empty() && self.deliveries.iter().all(|d| !d.is_sent())
  }

  /// The first failure's text, when every delivery failed.
  pub fn sms_error(&self) -> Option<String> {
    if !self.sms_failed() {
      return None;
    }
    self
      .deliveries
      .iter()
      .find_map(|d| d.result.as_ref().err())
      .map(ToString::to_string)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
  /// The read fell inside the debounce window and was dropped.
  Debounced,
  /// Read-only session: the raw identifier, nothing else done.
  TagOnly { rfid: String },
  Clocked(ClockReceipt),
}

// ─── Processor ───────────────────────────────────────────────────────────────

/// Turns tag reads into committed clock events and parent notifications.
///
/// Holds only per-session state (the debounce marker and current phase);
/// everything durable lives in the store.
pub struct Processor<S, T, V> {
  store:      Arc<S>,
  dispatcher: Dispatcher<T, S>,
  speaker:    Arc<V>,
  clock:      Arc<dyn Clock>,
  settings:   Settings,
  policy:     EventPolicy,
  debounce:   Debouncer,
  phase:      Phase,
}

impl<S, T, V> Processor<S, T, V>
where
  S: RecordStore,
  T: SmsTransport,
  V: Speaker,
{
  pub fn new(
    store: Arc<S>,
    dispatcher: Dispatcher<T, S>,
    speaker: V,
    clock: Arc<dyn Clock>,
    settings: Settings,
  ) -> Self {
    Self {
      store,
      dispatcher,
      speaker: Arc::new(speaker),
      clock,
      policy: settings.event_policy(),
      debounce: Debouncer::new(settings.debounce_window()),
      settings,
      phase: Phase::Idle,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }

  pub fn settings(&self) -> &Settings { &self.settings }

  pub fn store(&self) -> &S { &self.store }

  pub fn now(&self) -> DateTime<Local> { self.clock.now() }

  pub(crate) fn enter(&mut self, phase: Phase) {
    tracing::trace!(from = ?self.phase, to = ?phase, "scan phase");
    self.phase = phase;
  }

  /// Forget per-session state. Called when a session ends.
  pub fn reset_session(&mut self) {
    self.debounce.reset();
    self.enter(Phase::Idle);
  }

  /// Handle one tag read.
  pub async fn process(
    &mut self,
    read: TagRead,
    mode: ScanMode,
  ) -> Result<ScanOutcome, ScanError> {
    if !self.debounce.accept(read.at) {
      tracing::debug!(id = ?read.id, "read inside debounce window, dropped");
      return Ok(ScanOutcome::Debounced);
    }

    let result = self.handle(read, mode).await;
    match &result {
      Ok(_) => self.enter(Phase::Idle),
      Err(e) => {
        tracing::info!(error = %e, "scan rejected");
        self.enter(Phase::Error);
      }
    }
    result
  }

  async fn handle(&mut self, read: TagRead, mode: ScanMode) -> Result<ScanOutcome, ScanError> {
    let Some(rfid) = read.id.filter(|id| !id.is_empty()) else {
      return Err(ScanError::TagRead);
    };

    if mode == ScanMode::ReadOnly {
      return Ok(ScanOutcome::TagOnly { rfid });
    }

    self.enter(Phase::Resolving);
    let student = self.resolve(&rfid).await?;

    self.enter(Phase::Deciding);
    let now = read.at;
    if let Some(last) = &student.last_event
      && last.is_same_day(now)
    {
      return Err(ScanError::AlreadyClocked(last.event));
    }
    let event = self.policy.decide(now);

    let receipt = self.clock_event(student, event, now, false).await?;
    Ok(ScanOutcome::Clocked(receipt))
  }

  /// Record an operator-chosen event for `rfid` without a tag read.
  ///
  /// Skips the once-per-day check: the operator is overriding it.
  pub async fn clock_manual(
    &mut self,
    rfid: &str,
    event: Event,
  ) -> Result<ClockReceipt, ScanError> {
    if !self.settings.manual_clock_enabled {
      return Err(ScanError::ManualClockDisabled);
    }

    self.enter(Phase::Resolving);
    let result = match self.resolve(rfid).await {
      Ok(student) => {
        let now = self.clock.now();
        self.clock_event(student, event, now, true).await
      }
      Err(e) => Err(e),
    };
    self.enter(if result.is_ok() { Phase::Idle } else { Phase::Error });
    result
  }

  async fn resolve(&self, rfid: &str) -> Result<Student, ScanError> {
    self
      .store
      .get_student(rfid)
      .await
      .map_err(ScanError::store)?
      .ok_or_else(|| ScanError::StudentNotFound(rfid.to_owned()))
  }

  /// Commit, notify, speak.
  async fn clock_event(
    &mut self,
    student: Student,
    event: Event,
    now: DateTime<Local>,
    manual: bool,
  ) -> Result<ClockReceipt, ScanError> {
    self.enter(Phase::Committing);
    let rfid = student.rfid.clone();

    self
      .store
      .append_attendance(AttendanceLog {
        rfid: rfid.clone(),
        event,
        timestamp: clock::to_millis(now),
        student_name: Some(student.name.clone()),
        manual,
      })
      .await
      .map_err(ScanError::store)?;

    let mut student = student;
    student.last_event = Some(LastEvent::new(event, now));
    self
      .store
      .update_student(&rfid, student.clone())
      .await
      .map_err(ScanError::store)?;

    tracing::info!(%rfid, name = %student.name, %event, manual, "attendance recorded");

    self.enter(Phase::Notifying);
    let message = compose_message(&student.name, event, now);
    let deliveries = self
      .dispatcher
      .send_all(&rfid, student.phones(), &message, Some(&student.name))
      .await;

    if self.settings.tts_enabled {
      self.speak(spoken_phrase(&student, event));
    }

    Ok(ClockReceipt { rfid, student, event, message, manual, deliveries })
  }

  fn speak(&self, phrase: String) {
    let speaker = Arc::clone(&self.speaker);
    tokio::spawn(async move {
      if let Err(e) = speaker.speak(&phrase).await {
        tracing::warn!(error = %e, "speech feedback failed");
      }
    });
  }
}
