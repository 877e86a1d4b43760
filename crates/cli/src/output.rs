//! CLI output formatting utilities.
//!
//! Colored status lines, human-readable sizes and durations, and the terminal
//! [`Reporter`] used by builds and downloads.

use std::io::Write;
use std::time::Duration;

use owo_colors::{OwoColorize, Stream};
use sasspipe_lib::reporter::Reporter;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;

  if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_item(value: &str) {
  println!(
    "    {} {}",
    symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// Writes build notes and compiler output to the terminal.
pub struct TermReporter {
  verbose: bool,
}

impl TermReporter {
  pub fn new(verbose: bool) -> Self {
    Self { verbose }
  }
}

impl Reporter for TermReporter {
  fn note(&self, message: &str) {
    print_info(message);
  }

  fn write(&self, text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
  }

  fn is_verbose(&self) -> bool {
    self.verbose
  }

  fn progress(&self, downloaded: u64, total: u64) {
    let percent = downloaded * 100 / total.max(1);
    eprint!(
      "\r  {} / {} ({}%)",
      format_bytes(downloaded),
      format_bytes(total),
      percent
    );
  }

  fn finish_progress(&self) {
    eprintln!();
  }
}
