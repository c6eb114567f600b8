//! Console and log-file output for sync events
//!
//! Every line has the form `[YYYY-MM-DD HH:MM:SS] [LEVEL] message`. The same
//! line goes to the console (coloured by severity) and is appended to the
//! log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use mirror_core::{ActionEvent, EventSink, Severity};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// [`EventSink`] writing to stdout and an append-only log file.
///
/// Debug lines (unchanged files, error details) always reach the file but
/// only appear on the console in verbose mode.
pub struct LogSink {
    file: Mutex<File>,
    verbose: bool,
}

impl LogSink {
    /// Open `path` for appending, creating it and its parent directory if
    /// needed.
    pub fn open(path: &Path, verbose: bool) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            verbose,
        })
    }

    fn write_line(&self, severity: Severity, message: &str) {
        let line = format_line(Local::now().naive_local(), severity, message);

        // One guard per line keeps console and file output in the same order
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        if severity != Severity::Debug || self.verbose {
            println!("{}", paint(severity, &line));
        }
        if let Err(e) = writeln!(file, "{line}").and_then(|()| file.flush()) {
            tracing::warn!(error = %e, "Failed to write log file");
        }
    }
}

impl EventSink for LogSink {
    fn record(&self, event: &ActionEvent) {
        self.write_line(event.severity(), &render_event(event));
    }

    fn notice(&self, severity: Severity, message: &str) {
        self.write_line(severity, message);
    }
}

/// Render a log line without colour.
pub fn format_line(time: NaiveDateTime, severity: Severity, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        time.format(TIMESTAMP_FORMAT),
        severity.label(),
        message
    )
}

/// `VERB    path`, with the verb padded so paths line up.
pub fn render_event(event: &ActionEvent) -> String {
    let mut line = format!("{:<7} {}", event.verb.as_str(), event.path);
    if let Some(detail) = &event.detail {
        line.push_str(": ");
        line.push_str(detail);
    }
    line
}

fn paint(severity: Severity, line: &str) -> String {
    match severity {
        Severity::Info => line.cyan().to_string(),
        Severity::Action => line.green().to_string(),
        Severity::Error => line.red().to_string(),
        Severity::Debug => line.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mirror_core::Verb;
    use mirror_fs::RelativePath;
    use rstest::rstest;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 3)
            .unwrap()
    }

    #[rstest]
    #[case(Severity::Info, "[2024-03-09 07:05:03] [INFO] started")]
    #[case(Severity::Action, "[2024-03-09 07:05:03] [SYNC] started")]
    #[case(Severity::Error, "[2024-03-09 07:05:03] [ERROR] started")]
    #[case(Severity::Debug, "[2024-03-09 07:05:03] [DEBUG] started")]
    fn line_format(#[case] severity: Severity, #[case] expected: &str) {
        assert_eq!(format_line(fixed_time(), severity, "started"), expected);
    }

    #[test]
    fn action_lines_are_aligned() {
        let create = ActionEvent::new(Verb::Create, RelativePath::new("a.txt"));
        let mkdir = ActionEvent::new(Verb::Mkdir, RelativePath::new("sub"));
        let delete = ActionEvent::new(Verb::Delete, RelativePath::new("old"));
        assert_eq!(render_event(&create), "CREATE  a.txt");
        assert_eq!(render_event(&mkdir), "MKDIR   sub");
        assert_eq!(render_event(&delete), "DELETE  old");
    }

    #[test]
    fn error_lines_carry_the_reason() {
        let event = ActionEvent::error(RelativePath::new("x.txt"), "delete failed: denied");
        assert_eq!(render_event(&event), "ERROR   x.txt: delete failed: denied");
    }

    #[test]
    fn sink_appends_to_file_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/mirror.log");

        let sink = LogSink::open(&path, false).unwrap();
        sink.notice(Severity::Info, "first");
        sink.record(&ActionEvent::new(Verb::Skip, RelativePath::new("a.txt")));
        drop(sink);

        let sink = LogSink::open(&path, false).unwrap();
        sink.notice(Severity::Info, "second");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("[INFO] first"));
        assert!(lines[1].ends_with("[DEBUG] SKIP    a.txt"));
        assert!(lines[2].ends_with("[INFO] second"));
    }
}
