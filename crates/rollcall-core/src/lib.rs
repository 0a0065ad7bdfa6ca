//! Core types and trait definitions for the rollcall attendance tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the record types, the [`RecordStore`](store::RecordStore) abstraction, and
//! the pure policies (event decision, message template, daily reset) that the
//! scan pipeline is built from.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod error;
pub mod log;
pub mod policy;
pub mod reset;
pub mod store;
pub mod student;

pub use error::{Error, Result};
