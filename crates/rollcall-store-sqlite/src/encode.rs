//! Encoding and decoding between domain collections and the JSON text stored
//! in the `collections` table.
//!
//! A missing row always decodes as an empty collection (or no marker).

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The fixed set of persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
  Students,
  Attendance,
  Messages,
  LastReset,
}

impl Collection {
  pub fn key(self) -> &'static str {
    match self {
      Self::Students => "rollcall:students",
      Self::Attendance => "rollcall:attendance",
      Self::Messages => "rollcall:messages",
      Self::LastReset => "rollcall:lastResetTimestamp",
    }
  }
}

// ─── Collections ─────────────────────────────────────────────────────────────

pub fn decode_collection<T: DeserializeOwned>(
  collection: Collection,
  raw: Option<&str>,
) -> Result<Vec<T>> {
  match raw {
    None => Ok(Vec::new()),
    Some(s) => serde_json::from_str(s).map_err(|source| Error::Corrupt {
      key: collection.key(),
      source,
    }),
  }
}

pub fn encode_collection<T: Serialize>(items: &[T]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

// ─── Reset marker ────────────────────────────────────────────────────────────

pub fn decode_marker(raw: Option<&str>) -> Result<Option<i64>> {
  raw
    .map(|s| {
      serde_json::from_str(s).map_err(|source| Error::Corrupt {
        key: Collection::LastReset.key(),
        source,
      })
    })
    .transpose()
}

pub fn encode_marker(at_millis: i64) -> Result<String> {
  Ok(serde_json::to_string(&at_millis)?)
}
