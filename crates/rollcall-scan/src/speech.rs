//! Spoken feedback after a clock event.
//!
//! Speech is fire-and-forget: the processor spawns it after the result is
//! final, and failures are only logged.

use std::{future::Future, process::Stdio};

use tokio::process::Command;

use crate::SpeechError;

pub trait Speaker: Send + Sync + 'static {
  fn speak<'a>(
    &'a self,
    phrase: &'a str,
  ) -> impl Future<Output = Result<(), SpeechError>> + Send + 'a;
}

/// Says nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Speaker for Silent {
  async fn speak(&self, _phrase: &str) -> Result<(), SpeechError> { Ok(()) }
}

/// Runs an external text-to-speech program with the phrase as its last
/// argument, e.g. `espeak -s 120 "Hello Jane, welcome to school"`.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
  program: String,
  args:    Vec<String>,
}

impl CommandSpeaker {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self { program: program.into(), args }
  }
}

impl Speaker for CommandSpeaker {
  async fn speak(&self, phrase: &str) -> Result<(), SpeechError> {
    let status = Command::new(&self.program)
      .args(&self.args)
      .arg(phrase)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .status()
      .await?;
    if status.success() { Ok(()) } else { Err(SpeechError::Failed(status)) }
  }
}
