use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use trackdesk_core::{LogSink, Window, WindowError, WindowKind, WindowSystem};

/// Window system for terminal sessions.
///
/// The loading window is a spinner on stderr; the main window hands the entry
/// file to the system browser.
pub struct TerminalWindows {
    interactive: bool,
    sink: LogSink,
}

impl TerminalWindows {
    pub fn new(sink: LogSink) -> Self {
        Self {
            interactive: std::io::stderr().is_terminal(),
            sink,
        }
    }
}

impl WindowSystem for TerminalWindows {
    fn open(&mut self, kind: WindowKind) -> Result<Box<dyn Window>, WindowError> {
        match kind {
            WindowKind::Loading => Ok(Box::new(SpinnerWindow::start(self.interactive))),
            WindowKind::Main => Ok(Box::new(BrowserWindow {
                current: None,
                log_dir: self.sink.directory().to_path_buf(),
            })),
        }
    }
}

struct SpinnerWindow {
    bar: Option<ProgressBar>,
}

impl SpinnerWindow {
    fn start(interactive: bool) -> Self {
        if !interactive {
            tracing::info!("Starting backend...");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(spinner);
        }
        bar.set_message("Starting backend...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }
}

impl Window for SpinnerWindow {
    fn load_file(&mut self, path: &Path) -> Result<(), WindowError> {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("Loading {}", path.display()));
        }
        Ok(())
    }

    fn open_inspector(&mut self) {}

    fn close(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for SpinnerWindow {
    fn drop(&mut self) {
        self.close();
    }
}

struct BrowserWindow {
    current: Option<PathBuf>,
    log_dir: PathBuf,
}

impl Window for BrowserWindow {
    fn load_file(&mut self, path: &Path) -> Result<(), WindowError> {
        open::that(path).map_err(|e| WindowError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        eprintln!(
            "{} {}",
            style("Opened").green().bold(),
            style(path.display()).cyan()
        );
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn open_inspector(&mut self) {
        tracing::info!(
            logs = %self.log_dir.display(),
            "Development build loaded; use the browser developer tools to inspect it"
        );
    }

    fn close(&mut self) {
        if let Some(path) = self.current.take() {
            tracing::debug!(entry = %path.display(), "Main window released");
        }
    }
}
