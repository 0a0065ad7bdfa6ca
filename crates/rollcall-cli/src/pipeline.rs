//! Wiring the store, transport, and speaker into a [`Processor`].

use std::sync::Arc;

use anyhow::Context as _;
use rollcall_core::clock::SystemClock;
use rollcall_scan::{CommandSpeaker, Processor, Silent, Speaker, SpeechError};
use rollcall_sms::{Dispatcher, TermiiTransport};
use rollcall_store_sqlite::SqliteStore;

use crate::config::{Config, SpeechConfig};

pub type CliProcessor = Processor<SqliteStore, TermiiTransport, Voice>;

/// The configured speaker, or none.
pub enum Voice {
  Command(CommandSpeaker),
  Silent(Silent),
}

impl Voice {
  fn from_config(config: &SpeechConfig) -> Self {
    match &config.program {
      Some(program) => Self::Command(CommandSpeaker::new(program, config.args.clone())),
      None => Self::Silent(Silent),
    }
  }
}

impl Speaker for Voice {
  async fn speak(&self, phrase: &str) -> Result<(), SpeechError> {
    match self {
      Self::Command(s) => s.speak(phrase).await,
      Self::Silent(s) => s.speak(phrase).await,
    }
  }
}

pub fn build(config: &Config, store: Arc<SqliteStore>) -> anyhow::Result<CliProcessor> {
  let transport =
    TermiiTransport::new(config.sms.clone()).context("failed to build SMS client")?;
  let clock = Arc::new(SystemClock);
  let dispatcher =
    Dispatcher::new(transport, store.clone(), clock.clone(), &config.sms.country_code);

  Ok(Processor::new(
    store,
    dispatcher,
    Voice::from_config(&config.speech),
    clock,
    config.session.clone(),
  ))
}
