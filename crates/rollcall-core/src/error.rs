//! Error types for `rollcall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a student with rfid {0:?} already exists")]
  DuplicateKey(String),

  #[error("rfid must not be empty")]
  EmptyRfid,

  #[error("timestamp out of range: {0}")]
  InvalidTimestamp(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
