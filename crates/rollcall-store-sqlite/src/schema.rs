//! SQL schema for the rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// There is no per-record addressing: each collection is a single JSON
/// document under a fixed key and is always rewritten whole.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS collections (
    key   TEXT PRIMARY KEY,   -- see encode::Collection::key
    value TEXT NOT NULL       -- JSON array, or a JSON number for the reset marker
);

PRAGMA user_version = 1;
";
