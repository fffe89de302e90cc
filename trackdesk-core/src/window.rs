//! Window lifecycle for the loading and main windows
//!
//! [`WindowManager`] owns at most one window of each kind. Creation is
//! idempotent; closing a window releases the reference so a later call builds
//! a fresh one. How windows are actually shown is up to the [`WindowSystem`].

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::log_sink::LogSink;
use crate::paths::FrontendEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Loading,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    None,
    Loading,
    Main,
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("Failed to create window: {0}")]
    Create(String),

    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Frontend entry not found (looked for {primary} and {fallback})")]
    EntryNotFound { primary: PathBuf, fallback: PathBuf },
}

/// A window opened by a [`WindowSystem`]
pub trait Window: Send {
    fn load_file(&mut self, path: &Path) -> Result<(), WindowError>;

    /// Open the diagnostic inspector (used on the development fallback).
    fn open_inspector(&mut self);

    fn close(&mut self);
}

/// Platform that can open windows
pub trait WindowSystem {
    fn open(&mut self, kind: WindowKind) -> Result<Box<dyn Window>, WindowError>;
}

pub struct WindowManager<S> {
    system: S,
    sink: LogSink,
    loading: Option<Box<dyn Window>>,
    main: Option<Box<dyn Window>>,
}

impl<S: WindowSystem> WindowManager<S> {
    /// `sink` receives window diagnostics (the backend working directory).
    pub fn new(system: S, sink: LogSink) -> Self {
        Self {
            system,
            sink,
            loading: None,
            main: None,
        }
    }

    pub fn state(&self) -> WindowState {
        if self.main.is_some() {
            WindowState::Main
        } else if self.loading.is_some() {
            WindowState::Loading
        } else {
            WindowState::None
        }
    }

    pub fn is_open(&self, kind: WindowKind) -> bool {
        match kind {
            WindowKind::Loading => self.loading.is_some(),
            WindowKind::Main => self.main.is_some(),
        }
    }

    /// Returns the existing loading window, or opens one.
    ///
    /// Construction failures are logged and yield `None`; startup continues
    /// without a loading window.
    pub fn create_loading_window(&mut self) -> Option<&mut Box<dyn Window>> {
        let window = match self.loading.take() {
            Some(window) => window,
            None => match self.system.open(WindowKind::Loading) {
                Ok(window) => window,
                Err(e) => {
                    self.sink.error(&e.to_string());
                    tracing::error!(error = %e, "Error creating loading window");
                    return None;
                }
            },
        };
        Some(self.loading.insert(window))
    }

    /// Returns the existing main window, or opens one and loads the frontend.
    ///
    /// The packaged entry is preferred; when it is missing the development
    /// entry is loaded and the inspector opened.
    pub fn create_window(
        &mut self,
        entry: &FrontendEntry,
    ) -> Result<&mut Box<dyn Window>, WindowError> {
        let window = match self.main.take() {
            Some(window) => window,
            None => self.open_main(entry)?,
        };
        Ok(self.main.insert(window))
    }

    fn open_main(&mut self, entry: &FrontendEntry) -> Result<Box<dyn Window>, WindowError> {
        let mut window = self.system.open(WindowKind::Main).inspect_err(|e| {
            self.sink.error(&e.to_string());
        })?;

        self.sink
            .info(&format!("Loading file: {}", entry.primary.display()));
        if entry.primary.exists() {
            if let Err(e) = window.load_file(&entry.primary) {
                window.close();
                self.sink.error(&e.to_string());
                return Err(e);
            }
            return Ok(window);
        }

        self.sink
            .info(&format!("Dev fallback file: {}", entry.fallback.display()));
        if !entry.fallback.exists() {
            window.close();
            let err = WindowError::EntryNotFound {
                primary: entry.primary.clone(),
                fallback: entry.fallback.clone(),
            };
            self.sink.error(&err.to_string());
            return Err(err);
        }

        if let Err(e) = window.load_file(&entry.fallback) {
            window.close();
            self.sink.error(&e.to_string());
            return Err(e);
        }
        window.open_inspector();
        Ok(window)
    }

    /// Close the loading window if open. Returns whether a window was closed.
    pub fn close_loading_window(&mut self) -> bool {
        Self::close_slot(&mut self.loading)
    }

    pub fn close_main_window(&mut self) -> bool {
        Self::close_slot(&mut self.main)
    }

    /// The window system reports that a window was closed externally.
    pub fn on_closed(&mut self, kind: WindowKind) {
        match kind {
            WindowKind::Loading => self.loading = None,
            WindowKind::Main => self.main = None,
        }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    fn close_slot(slot: &mut Option<Box<dyn Window>>) -> bool {
        match slot.take() {
            Some(mut window) => {
                window.close();
                true
            }
            None => false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{RecordingWindows, WindowEvent};
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir, windows: RecordingWindows) -> WindowManager<RecordingWindows> {
        WindowManager::new(windows, LogSink::new(dir.path().join("logs")))
    }

    #[test]
    fn loading_window_is_created_once() {
        let dir = TempDir::new().unwrap();
        let windows = RecordingWindows::default();
        let mut wm = manager(&dir, windows.clone());

        assert_eq!(wm.state(), WindowState::None);
        assert!(wm.create_loading_window().is_some());
        assert!(wm.create_loading_window().is_some());
        assert_eq!(wm.state(), WindowState::Loading);
        assert_eq!(
            windows.count(|e| matches!(e, WindowEvent::Opened(WindowKind::Loading, _))),
            1
        );
    }

    #[test]
    fn loading_window_failure_returns_none_and_logs() {
        let dir = TempDir::new().unwrap();
        let windows = RecordingWindows {
            fail_open: Some(WindowKind::Loading),
            ..Default::default()
        };
        let mut wm = manager(&dir, windows);

        assert!(wm.create_loading_window().is_none());
        assert_eq!(wm.state(), WindowState::None);
        let errors = std::fs::read_to_string(dir.path().join("logs/error.log")).unwrap();
        assert!(errors.contains("Loading unavailable"));
    }

    #[test]
    fn main_window_prefers_packaged_entry() {
        let dir = TempDir::new().unwrap();
        let primary = dir.path().join("index.html");
        std::fs::write(&primary, "<html></html>").unwrap();
        let entry = FrontendEntry {
            primary: primary.clone(),
            fallback: dir.path().join("dev/index.html"),
        };
        let windows = RecordingWindows::default();
        let mut wm = manager(&dir, windows.clone());

        wm.create_window(&entry).unwrap();
        wm.create_window(&entry).unwrap();

        assert_eq!(wm.state(), WindowState::Main);
        assert_eq!(
            windows.events(),
            vec![
                WindowEvent::Opened(WindowKind::Main, 0),
                WindowEvent::Loaded(0, primary),
            ]
        );
    }

    #[test]
    fn main_window_falls_back_to_dev_entry_with_inspector() {
        let dir = TempDir::new().unwrap();
        let fallback = dir.path().join("dev/index.html");
        std::fs::create_dir_all(fallback.parent().unwrap()).unwrap();
        std::fs::write(&fallback, "").unwrap();
        let entry = FrontendEntry {
            primary: dir.path().join("missing/index.html"),
            fallback: fallback.clone(),
        };
        let windows = RecordingWindows::default();
        let mut wm = manager(&dir, windows.clone());

        wm.create_window(&entry).unwrap();
        assert!(windows.events().contains(&WindowEvent::Loaded(0, fallback)));
        assert!(windows.events().contains(&WindowEvent::Inspector(0)));

        let info = std::fs::read_to_string(dir.path().join("logs/info.log")).unwrap();
        assert!(info.contains("Dev fallback file: "));
    }

    #[test]
    fn missing_entries_are_an_error_and_leave_no_main_window() {
        let dir = TempDir::new().unwrap();
        let entry = FrontendEntry {
            primary: dir.path().join("a.html"),
            fallback: dir.path().join("b.html"),
        };
        let windows = RecordingWindows::default();
        let mut wm = manager(&dir, windows.clone());

        let err = wm.create_window(&entry).err().expect("should fail");
        assert!(matches!(err, WindowError::EntryNotFound { .. }));
        assert!(!wm.is_open(WindowKind::Main));
        assert_eq!(windows.count(|e| matches!(e, WindowEvent::Closed(_))), 1);
    }

    #[test]
    fn closing_releases_reference_for_fresh_instance() {
        let dir = TempDir::new().unwrap();
        let windows = RecordingWindows::default();
        let mut wm = manager(&dir, windows.clone());

        wm.create_loading_window();
        assert!(wm.close_loading_window());
        assert!(!wm.close_loading_window());
        wm.create_loading_window();

        wm.on_closed(WindowKind::Loading);
        assert_eq!(wm.state(), WindowState::None);
        assert_eq!(
            windows.count(|e| matches!(e, WindowEvent::Opened(WindowKind::Loading, _))),
            2
        );
        assert_eq!(windows.count(|e| matches!(e, WindowEvent::Closed(_))), 1);
    }
}
