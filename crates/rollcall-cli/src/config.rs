//! Layered configuration: defaults, then `rollcall.toml`, then `ROLLCALL_*`
//! environment variables.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `ROLLCALL_SMS__API_KEY` or `ROLLCALL_SESSION__TTS_ENABLED=false`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rollcall_scan::Settings;
use rollcall_sms::SmsConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub session:    Settings,
  #[serde(default)]
  pub sms:        SmsConfig,
  #[serde(default)]
  pub speech:     SpeechConfig,
}

/// External text-to-speech program. Without a program, speech is silent
/// even when `session.tts_enabled` is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechConfig {
  pub program: Option<String>,
  #[serde(default)]
  pub args:    Vec<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from("rollcall.db") }

impl Config {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let layered = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ROLLCALL")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut config: Self = layered
      .try_deserialize()
      .context("failed to deserialise config")?;

    config.store_path = expand_tilde(&config.store_path);
    if let Some(log) = &config.sms.debug_log {
      config.sms.debug_log = Some(expand_tilde(log));
    }
    Ok(config)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
