//! Append-only diagnostic log of outbound SMS traffic.
//!
//! Purely a side channel for troubleshooting provider integration; nothing
//! reads it back and write failures are only traced.

use std::path::PathBuf;

use chrono::Utc;
use tokio::io::AsyncWriteExt as _;

#[derive(Debug, Clone, Default)]
pub struct DebugLog {
  path: Option<PathBuf>,
}

impl DebugLog {
  pub fn to_file(path: impl Into<PathBuf>) -> Self { Self { path: Some(path.into()) } }

  #[cfg(test)]
  fn path(&self) -> Option<&std::path::Path> { self.path.as_deref() }

  /// Append one timestamped entry. Never fails.
  pub async fn append(&self, entry: &str) {
    let Some(path) = &self.path else { return };
    let line = format!("{} - {entry}\n", Utc::now().to_rfc3339());

    let result = async {
      let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
      file.write_all(line.as_bytes()).await?;
      file.flush().await
    }
    .await;

    if let Err(e) = result {
      tracing::warn!(path = %path.display(), error = %e, "failed to write SMS debug log");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn appends_timestamped_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = DebugLog::to_file(dir.path().join("sms.log"));

    log.append("first").await;
    log.append("second").await;

    let text = std::fs::read_to_string(log.path().unwrap()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" - first"));
    assert!(lines[1].ends_with(" - second"));
  }

  #[tokio::test]
  async fn disabled_log_is_silent() {
    DebugLog::default().append("nothing").await;
  }
}
