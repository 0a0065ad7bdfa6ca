//! Interactive scan sessions: reset, read, process, report, repeat.

use std::future::Future;

use rollcall_core::{reset::maybe_reset_statuses, store::RecordStore};
use rollcall_sms::SmsTransport;

use crate::{
  Phase, Processor, ScanError, ScanMode, ScanOutcome, Speaker, TagRead, TagSource,
};

/// Tallies for one session, for the caller's closing message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
  pub clocked:   usize,
  pub tags:      usize,
  pub rejected:  usize,
  pub debounced: usize,
}

impl SessionSummary {
  fn record(&mut self, result: &Result<ScanOutcome, ScanError>) {
    match result {
      Ok(ScanOutcome::Clocked(_)) => self.clocked += 1,
      Ok(ScanOutcome::TagOnly { .. }) => self.tags += 1,
      Ok(ScanOutcome::Debounced) => self.debounced += 1,
      Err(_) => self.rejected += 1,
    }
  }
}

/// Run one scan session until the source closes (or, without continuous
/// scanning, until the first reported attempt).
///
/// In normal mode the daily reset policy runs before the first read and again
/// before every continuous-scan restart, so a session left open past midnight
/// still lets students clock in the next day. Every attempt that was not
/// debounced is passed to `on_report`, including rejected ones. Store and
/// source failures end the session with an error. The source is always
/// stopped on the way out; sends already in flight are not cancelled.
pub async fn run_session<S, T, V, Src, F>(
  processor: &mut Processor<S, T, V>,
  source: &mut Src,
  mode: ScanMode,
  on_report: F,
) -> Result<SessionSummary, ScanError>
where
  S: RecordStore,
  T: SmsTransport,
  V: Speaker,
  Src: TagSource,
  F: FnMut(&Result<ScanOutcome, ScanError>),
{
  run_session_until(processor, source, mode, on_report, std::future::pending()).await
}

/// [`run_session`], ending early once `shutdown` resolves.
///
/// Shutdown is only observed while waiting for a tag or between continuous
/// scans; an attempt already being processed runs to completion. An
/// interrupted session still stops the source and returns its summary.
pub async fn run_session_until<S, T, V, Src, F, Stop>(
  processor: &mut Processor<S, T, V>,
  source: &mut Src,
  mode: ScanMode,
  mut on_report: F,
  shutdown: Stop,
) -> Result<SessionSummary, ScanError>
where
  S: RecordStore,
  T: SmsTransport,
  V: Speaker,
  Src: TagSource,
  F: FnMut(&Result<ScanOutcome, ScanError>),
  Stop: Future<Output = ()>,
{
  let result = match source.start(mode).await {
    Ok(()) => drive(processor, source, mode, &mut on_report, shutdown).await,
    Err(e) => Err(e.into()),
  };
  source.stop().await;
  processor.reset_session();
  result
}

async fn drive<S, T, V, Src, F, Stop>(
  processor: &mut Processor<S, T, V>,
  source: &mut Src,
  mode: ScanMode,
  on_report: &mut F,
  shutdown: Stop,
) -> Result<SessionSummary, ScanError>
where
  S: RecordStore,
  T: SmsTransport,
  V: Speaker,
  Src: TagSource,
  F: FnMut(&Result<ScanOutcome, ScanError>),
  Stop: Future<Output = ()>,
{
  let mut summary = SessionSummary::default();
  tokio::pin!(shutdown);

  loop {
    if mode == ScanMode::Normal {
      prepare_day(processor).await?;
    }

    processor.enter(Phase::AwaitingTag);
    let next = tokio::select! {
      next = source.next_event() => next?,
      () = &mut shutdown => {
        tracing::info!("scan session interrupted");
        break;
      }
    };
    let Some(event) = next else {
      tracing::info!("tag source closed");
      break;
    };

    let read = TagRead::new(event.id, event.at);
    let result = processor.process(read, mode).await;
    summary.record(&result);

    match result {
      Ok(ScanOutcome::Debounced) => continue,
      Err(e) if e.is_fatal() => return Err(e),
      other => on_report(&other),
    }

    if !processor.settings().continuous_scan_enabled {
      break;
    }
    tokio::select! {
      () = tokio::time::sleep(processor.settings().retry_delay()) => {}
      () = &mut shutdown => {
        tracing::info!("scan session interrupted");
        break;
      }
    }
  }

  Ok(summary)
}

async fn prepare_day<S, T, V>(processor: &Processor<S, T, V>) -> Result<(), ScanError>
where
  S: RecordStore,
  T: SmsTransport,
  V: Speaker,
{
  maybe_reset_statuses(processor.store(), processor.now())
    .await
    .map_err(ScanError::store)?;
  Ok(())
}
