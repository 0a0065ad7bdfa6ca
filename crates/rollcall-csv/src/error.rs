//! Error types for the rollcall-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to parse CSV file: {0}")]
  Csv(#[from] csv::Error),

  #[error("no valid students found in CSV file")]
  NoValidRows,

  #[error("invalid record: {0}")]
  Record(#[from] rollcall_core::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
