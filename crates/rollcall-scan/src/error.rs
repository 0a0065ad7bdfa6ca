//! Error types for `rollcall-scan`.

use rollcall_core::student::Event;
use thiserror::Error;

/// Why a scan attempt produced no clock event.
///
/// Everything except [`ScanError::Store`] is local to one attempt; the
/// session keeps accepting taps afterwards.
#[derive(Debug, Error)]
pub enum ScanError {
  #[error("Failed to read RFID tag.")]
  TagRead,

  #[error("Student not registered with this RFID ({0}).")]
  StudentNotFound(String),

  #[error("Student has already signed {0} today.")]
  AlreadyClocked(Event),

  #[error("manual clock entry is disabled")]
  ManualClockDisabled,

  #[error("tag source error: {0}")]
  Source(#[from] SourceError),

  /// The record store could not be read or written. There is no safe way
  /// to continue the session.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ScanError {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn is_fatal(&self) -> bool { matches!(self, Self::Store(_) | Self::Source(_)) }
}

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("tag source used before start()")]
  NotStarted,

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SpeechError {
  #[error("could not run speech command: {0}")]
  Io(#[from] std::io::Error),

  #[error("speech command exited with {0}")]
  Failed(std::process::ExitStatus),
}
