//! Subcommand definitions and handlers.

use std::{
  fs::File,
  io::{BufReader, BufWriter},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use rollcall_core::{
  clock::{self, Clock as _, SystemClock},
  log::{AttendanceLog, MessageLog},
  reset::maybe_reset_statuses,
  store::RecordStore,
  student::{Event, Student},
};
use rollcall_scan::{
  ClockReceipt, LineTagSource, ScanError, ScanMode, ScanOutcome, run_session_until,
};
use rollcall_store_sqlite::SqliteStore;

use crate::{config::Config, pipeline};

// ─── Command tree ────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Read tags from a keyboard-wedge reader on stdin and clock students.
  Scan {
    /// Only print tag identifiers; record nothing.
    #[arg(long)]
    read_only: bool,
  },

  /// Record an attendance event by hand.
  Clock {
    rfid:  String,
    #[arg(value_name = "in|out")]
    event: Event,
  },

  /// Register a new student.
  Register {
    #[arg(long)]
    rfid:             String,
    #[arg(long)]
    name:             String,
    #[arg(long)]
    admission_number: String,
    /// Primary parent phone, 10 digits.
    #[arg(long, value_parser = parse_phone)]
    phone:            String,
    /// Secondary parent phone, 10 digits.
    #[arg(long, value_parser = parse_phone)]
    phone2:           Option<String>,
  },

  #[command(subcommand)]
  Students(StudentsCommand),

  #[command(subcommand)]
  Attendance(AttendanceCommand),

  #[command(subcommand)]
  Messages(MessagesCommand),

  /// Clear every student's last event if that has not happened today.
  Reset,
}

#[derive(Subcommand, Debug)]
pub enum StudentsCommand {
  /// List students, optionally filtered by name, admission number, or tag.
  List {
    #[arg(long)]
    search: Option<String>,
  },
  /// Change fields of a registered student.
  Edit {
    rfid:             String,
    #[arg(long)]
    name:             Option<String>,
    #[arg(long)]
    admission_number: Option<String>,
    #[arg(long, value_parser = parse_phone)]
    phone:            Option<String>,
    #[arg(long, value_parser = parse_phone)]
    phone2:           Option<String>,
  },
  Delete { rfid: String },
  /// Import students from a CSV file. Existing tags are skipped.
  Import { path: PathBuf },
  Export { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommand {
  List {
    /// Only entries on this local date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// Delete entries by timestamp.
  Delete {
    #[arg(required = true)]
    timestamps: Vec<i64>,
  },
  Clear,
  Export { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
  List,
  /// Delete entries by timestamp.
  Delete {
    #[arg(required = true)]
    timestamps: Vec<i64>,
  },
  Clear,
}

/// Parent phones are entered as exactly ten digits.
fn parse_phone(s: &str) -> Result<String, String> {
  let s = s.trim();
  if s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit()) {
    Ok(s.to_owned())
  } else {
    Err("phone numbers must be exactly 10 digits".into())
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub async fn run(command: Command, config: &Config, store: Arc<SqliteStore>) -> anyhow::Result<()> {
  match command {
    Command::Scan { read_only } => scan(config, store, read_only).await,
    Command::Clock { rfid, event } => {
      let mut processor = pipeline::build(config, store)?;
      let receipt = processor.clock_manual(&rfid, event).await?;
      print_receipt(&receipt);
      Ok(())
    }
    Command::Register { rfid, name, admission_number, phone, phone2 } => {
      let mut student = Student::new(rfid.trim(), name.trim(), admission_number.trim(), phone);
      student.parent_phone2 = phone2;
      register(&store, student).await?;
      println!("Registered {}.", rfid.trim());
      Ok(())
    }
    Command::Students(cmd) => students(cmd, &store).await,
    Command::Attendance(cmd) => attendance(cmd, &store).await,
    Command::Messages(cmd) => messages(cmd, &store).await,
    Command::Reset => {
      if maybe_reset_statuses(store.as_ref(), SystemClock.now()).await? {
        println!("Student statuses reset.");
      } else {
        println!("Statuses were already reset today.");
      }
      Ok(())
    }
  }
}

// ─── Scanning ────────────────────────────────────────────────────────────────

async fn scan(config: &Config, store: Arc<SqliteStore>, read_only: bool) -> anyhow::Result<()> {
  let mode = if read_only { ScanMode::ReadOnly } else { ScanMode::Normal };
  let mut processor = pipeline::build(config, store)?;
  let mut source = LineTagSource::stdin(Arc::new(SystemClock));

  eprintln!("Waiting for tags. Press Ctrl-D or Ctrl-C to finish.");
  let interrupted = async {
    if tokio::signal::ctrl_c().await.is_ok() {
      eprintln!("Interrupted.");
    } else {
      std::future::pending::<()>().await;
    }
  };
  let summary =
    run_session_until(&mut processor, &mut source, mode, print_report, interrupted).await?;

  eprintln!(
    "{} clocked, {} rejected, {} tags read.",
    summary.clocked, summary.rejected, summary.tags
  );
  Ok(())
}

fn print_report(result: &Result<ScanOutcome, ScanError>) {
  match result {
    Ok(ScanOutcome::Clocked(receipt)) => print_receipt(receipt),
    Ok(ScanOutcome::TagOnly { rfid }) => println!("{rfid}"),
    Ok(ScanOutcome::Debounced) => {}
    Err(e) => println!("{e}"),
  }
}

fn print_receipt(receipt: &ClockReceipt) {
  let manual = if receipt.manual { " (manual)" } else { "" };
  println!("{}: {}{manual}", receipt.student.short_name(), receipt.message);
  for delivery in &receipt.deliveries {
    if let Err(e) = &delivery.result {
      println!("  SMS to {} failed: {e}", delivery.phone);
    }
  }
  if receipt.sms_failed() {
    println!("  No parent was notified.");
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

async fn register(store: &SqliteStore, student: Student) -> anyhow::Result<()> {
  let rfid = student.rfid.clone();
  match store.register_student(student).await {
    Err(e) if e.is_duplicate_key() => bail!("a student with RFID {rfid} is already registered"),
    other => other.with_context(|| format!("failed to register {rfid}")),
  }
}

async fn students(cmd: StudentsCommand, store: &SqliteStore) -> anyhow::Result<()> {
  match cmd {
    StudentsCommand::List { search } => {
      let needle = search.map(|s| s.to_lowercase());
      for s in store.list_students().await? {
        if let Some(needle) = &needle
          && !matches_search(&s, needle)
        {
          continue;
        }
        let last = match s.last_event {
          Some(last) => format!("{} {}", last.event, format_millis(last.timestamp)),
          None => "-".into(),
        };
        println!("{}\t{}\t{}\t{}\t{last}", s.rfid, s.name, s.admission_number, phones(&s));
      }
    }
    StudentsCommand::Edit { rfid, name, admission_number, phone, phone2 } => {
      let Some(mut student) = store.get_student(&rfid).await? else {
        bail!("no student registered with RFID {rfid}");
      };
      if let Some(name) = name {
        student.name = name;
      }
      if let Some(admission_number) = admission_number {
        student.admission_number = admission_number;
      }
      if let Some(phone) = phone {
        student.parent_phone = phone;
      }
      if phone2.is_some() {
        student.parent_phone2 = phone2;
      }
      store.update_student(&rfid, student).await?;
      println!("Updated {rfid}.");
    }
    StudentsCommand::Delete { rfid } => {
      store.delete_student(&rfid).await?;
      println!("Deleted {rfid}.");
    }
    StudentsCommand::Import { path } => import(store, &path).await?,
    StudentsCommand::Export { path } => {
      let students = store.list_students().await?;
      rollcall_csv::write_students(create(&path)?, &students)?;
      println!("Exported {} students to {}.", students.len(), path.display());
    }
  }
  Ok(())
}

fn matches_search(student: &Student, needle: &str) -> bool {
  [&student.name, &student.admission_number, &student.rfid]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn phones(student: &Student) -> String { student.phones().collect::<Vec<_>>().join(",") }

async fn import(store: &SqliteStore, path: &Path) -> anyhow::Result<()> {
  let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
  let parsed = rollcall_csv::parse_students(BufReader::new(file))
    .with_context(|| format!("failed to import {}", path.display()))?;

  for row in &parsed.skipped {
    println!("Skipped line {}: {}", row.line, row.reason);
  }

  let summary = store.import_students(parsed.students).await?;
  for rfid in &summary.skipped {
    println!("Skipped duplicate RFID {rfid}");
  }
  if summary.imported == 0 {
    bail!("no new students to import (all RFIDs already exist)");
  }
  println!("Imported {} students.", summary.imported);
  Ok(())
}

async fn attendance(cmd: AttendanceCommand, store: &SqliteStore) -> anyhow::Result<()> {
  match cmd {
    AttendanceCommand::List { date } => {
      for log in store.list_attendance().await? {
        if let Some(date) = date
          && clock::local_date(log.timestamp)? != date
        {
          continue;
        }
        print_attendance(&log);
      }
    }
    AttendanceCommand::Delete { timestamps } => {
      store.delete_attendance(&timestamps).await?;
    }
    AttendanceCommand::Clear => store.clear_attendance().await?,
    AttendanceCommand::Export { path } => {
      let logs = store.list_attendance().await?;
      rollcall_csv::write_attendance(create(&path)?, &logs)?;
      println!("Exported {} entries to {}.", logs.len(), path.display());
    }
  }
  Ok(())
}

fn print_attendance(log: &AttendanceLog) {
  let name = log.student_name.as_deref().unwrap_or("-");
  let manual = if log.manual { "\tmanual" } else { "" };
  println!(
    "{}\t{}\t{}\t{name}\t{}{manual}",
    log.timestamp,
    format_millis(log.timestamp),
    log.rfid,
    log.event,
  );
}

async fn messages(cmd: MessagesCommand, store: &SqliteStore) -> anyhow::Result<()> {
  match cmd {
    MessagesCommand::List => {
      for log in store.list_messages().await? {
        print_message(&log);
      }
    }
    MessagesCommand::Delete { timestamps } => store.delete_messages(&timestamps).await?,
    MessagesCommand::Clear => store.clear_messages().await?,
  }
  Ok(())
}

fn print_message(log: &MessageLog) {
  println!(
    "{}\t{}\t{}\t{}\t{}\t{}",
    log.timestamp,
    format_millis(log.timestamp),
    log.student_name.as_deref().unwrap_or("-"),
    log.phone_number,
    log.status,
    log.message,
  );
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn format_millis(ms: i64) -> String {
  clock::from_millis(ms)
    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|_| ms.to_string())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
  let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
  Ok(BufWriter::new(file))
}
