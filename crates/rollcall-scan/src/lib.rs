//! The scan-to-notification pipeline.
//!
//! A [`TagSource`](source::TagSource) delivers raw tag reads; the
//! [`Processor`](processor::Processor) debounces them, resolves the student,
//! enforces one clock event per student per day, commits the attendance
//! record, and notifies the parents. [`run_session`](session::run_session)
//! ties the two together for an interactive scan session.

#![allow(async_fn_in_trait)]

mod debounce;

pub mod error;
pub mod processor;
pub mod session;
pub mod settings;
pub mod source;
pub mod speech;

pub use error::{ScanError, SourceError, SpeechError};
pub use processor::{ClockReceipt, Phase, Processor, ScanOutcome, TagRead};
pub use session::{SessionSummary, run_session, run_session_until};
pub use settings::Settings;
pub use source::{LineTagSource, ScanMode, TagEvent, TagSource};
pub use speech::{CommandSpeaker, Silent, Speaker};
