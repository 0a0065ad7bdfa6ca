//! Error type for `rollcall-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rollcall_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored collection could not be decoded. There is no safe default, so
  /// callers should treat this as fatal.
  #[error("collection {key:?} is corrupt: {source}")]
  Corrupt {
    key:    &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// Whether this is a duplicate-rfid rejection from registration.
  pub fn is_duplicate_key(&self) -> bool {
    matches!(self, Self::Core(rollcall_core::Error::DuplicateKey(_)))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
