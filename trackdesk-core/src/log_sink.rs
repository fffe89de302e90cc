//! Best-effort file logging into the backend working directory
//!
//! Each severity has its own file (`info.log`, `warning.log`, `error.log`).
//! Write failures never reach the caller of [`append`]; they are reported on
//! the `tracing` channel instead.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.log", self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a single log line: `<timestamp> - <SEVERITY>: <message>\n`.
pub fn format_line(message: &str, severity: Severity) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        "{timestamp} - {}: {message}\n",
        severity.as_str().to_uppercase()
    )
}

/// Append one line to `<directory>/<severity>.log`, creating the directory.
pub fn try_append(directory: &Path, message: &str, severity: Severity) -> std::io::Result<()> {
    std::fs::create_dir_all(directory)?;
    let line = format_line(message, severity);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(directory.join(severity.file_name()))?;
    file.write_all(line.as_bytes())
}

/// Append one line, ignoring failures. Losing a log line must never abort startup.
pub fn append(directory: &Path, message: &str, severity: Severity) {
    if let Err(e) = try_append(directory, message, severity) {
        tracing::warn!(
            directory = %directory.display(),
            severity = %severity,
            error = %e,
            "Failed to write to log file"
        );
    }
}

/// Log sink bound to one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSink {
    directory: PathBuf,
}

impl LogSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn log(&self, message: &str, severity: Severity) {
        append(&self.directory, message, severity);
    }

    pub fn info(&self, message: &str) {
        self.log(message, Severity::Info);
    }

    pub fn warning(&self, message: &str) {
        self.log(message, Severity::Warning);
    }

    pub fn error(&self, message: &str) {
        self.log(message, Severity::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn creates_missing_directory_and_writes_one_line() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/c");

        try_append(&target, "hello", Severity::Info).unwrap();

        let lines = read_lines(&target.join("info.log"));
        assert_eq!(lines.len(), 1);
        let (timestamp, rest) = lines[0].split_once(" - ").unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");
        assert_eq!(rest, "INFO: hello");
    }

    #[test]
    fn severity_selects_file_and_tag() {
        let dir = TempDir::new().unwrap();
        let sink = LogSink::new(dir.path());

        sink.warning("slow");
        sink.error("boom");
        sink.info("ok");
        sink.info("again");

        assert_eq!(read_lines(&dir.path().join("info.log")).len(), 2);
        assert!(read_lines(&dir.path().join("warning.log"))[0].ends_with(" - WARNING: slow"));
        assert!(read_lines(&dir.path().join("error.log"))[0].ends_with(" - ERROR: boom"));
    }

    #[test]
    fn append_swallows_write_failures() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        assert!(try_append(&blocker, "x", Severity::Info).is_err());
        // Must not panic or propagate.
        append(&blocker, "x", Severity::Info);
    }

    #[test]
    fn concurrent_writers_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(LogSink::new(dir.path().join("logs")));

        let handles: Vec<_> = [Severity::Info, Severity::Error]
            .into_iter()
            .map(|severity| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        sink.log(&format!("{severity} line {i}"), severity);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for severity in [Severity::Info, Severity::Error] {
            let lines = read_lines(&sink.directory().join(severity.file_name()));
            assert_eq!(lines.len(), 200);
            let tag = format!(" - {}: {severity} line ", severity.as_str().to_uppercase());
            for line in lines {
                assert!(line.contains(&tag), "corrupted line: {line}");
            }
        }
    }
}
