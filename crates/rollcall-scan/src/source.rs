//! The tag source contract and a keyboard-wedge implementation.
//!
//! The pipeline treats every event as untrusted: a source may report the same
//! tap more than once, and the processor debounces independently.

use std::{future::Future, io::BufRead, sync::Arc, thread};

use chrono::{DateTime, Local};
use rollcall_core::clock::Clock;
use tokio::sync::mpsc;

use crate::SourceError;

/// How a session treats the tags it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
  /// Full pipeline: resolve, clock, notify.
  #[default]
  Normal,
  /// Only report the raw tag identifier (used when registering a card).
  ReadOnly,
}

/// One discovered tag. `id` is `None` when the reader saw a tag but could not
/// read its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
  pub id: Option<String>,
  /// When the source saw the tap, not when the session got to it.
  pub at: DateTime<Local>,
}

/// A platform reader session.
pub trait TagSource: Send {
  /// Begin delivering events.
  fn start(
    &mut self,
    mode: ScanMode,
  ) -> impl Future<Output = Result<(), SourceError>> + Send + '_;

  /// Stop delivering events. Safe to call repeatedly, and after a failed
  /// `start`.
  fn stop(&mut self) -> impl Future<Output = ()> + Send + '_;

  /// Wait for the next tag. `Ok(None)` means the source has closed.
  fn next_event(
    &mut self,
  ) -> impl Future<Output = Result<Option<TagEvent>, SourceError>> + Send + '_;
}

// ─── Keyboard-wedge reader ───────────────────────────────────────────────────

type Feed = mpsc::UnboundedReceiver<std::io::Result<TagEvent>>;

/// A reader that "types" each tag identifier followed by a newline, as USB
/// HID RFID readers do. Every line is one tap; a blank line is a tap whose
/// identifier could not be read.
///
/// Lines are read on a dedicated thread and stamped as they arrive, so taps
/// queued while the session is busy keep their real arrival time. The thread
/// exits at end of input or once the source is dropped.
pub struct LineTagSource {
  feed:    Feed,
  started: bool,
}

impl LineTagSource {
  pub fn new<R: BufRead + Send + 'static>(reader: R, clock: Arc<dyn Clock>) -> Self {
    Self::spawn(move || reader, clock)
  }

  pub fn stdin(clock: Arc<dyn Clock>) -> Self {
    Self::spawn(|| std::io::stdin().lock(), clock)
  }

  fn spawn<R, F>(open: F, clock: Arc<dyn Clock>) -> Self
  where
    R: BufRead,
    F: FnOnce() -> R + Send + 'static,
  {
    let (tx, feed) = mpsc::unbounded_channel();
    thread::spawn(move || pump(open(), &tx, clock.as_ref()));
    Self { feed, started: false }
  }
}

fn pump<R: BufRead>(
  reader: R,
  tx: &mpsc::UnboundedSender<std::io::Result<TagEvent>>,
  clock: &dyn Clock,
) {
  for line in reader.lines() {
    let at = clock.now();
    let event = line.map(|line| {
      let id = line.trim();
      TagEvent { id: (!id.is_empty()).then(|| id.to_owned()), at }
    });
    let failed = event.is_err();
    if tx.send(event).is_err() || failed {
      break;
    }
  }
}

impl TagSource for LineTagSource {
  async fn start(&mut self, mode: ScanMode) -> Result<(), SourceError> {
    tracing::debug!(?mode, "line tag source started");
    self.started = true;
    Ok(())
  }

  async fn stop(&mut self) {
    if self.started {
      tracing::debug!("line tag source stopped");
    }
    self.started = false;
  }

  async fn next_event(&mut self) -> Result<Option<TagEvent>, SourceError> {
    if !self.started {
      return Err(SourceError::NotStarted);
    }
    match self.feed.recv().await {
      Some(Ok(event)) => Ok(Some(event)),
      Some(Err(e)) => Err(e.into()),
      None => {
        self.started = false;
        Ok(None)
      }
    }
  }
}
