//! Filesystem layout resolution for backend and frontend artifacts
//!
//! Packaged builds place artifacts under the resources root
//! (`<resources>/<name>/...`); development runs use the project checkout
//! (`<project>/dist/<name>/...`). Every lookup walks an ordered candidate list
//! and returns the first existing path, or the first candidate when nothing
//! exists so the caller reports a concrete missing path.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::defaults::RUNTIME_ENTRY_FILE;
use crate::environment::RuntimeEnvironment;
use crate::profile::{self, BackendKind, FrontendKind, Overrides};

/// Root directories the resolver searches from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Packaged resources directory
    pub resources_root: PathBuf,
    /// Project checkout (the current directory in development)
    pub project_root: PathBuf,
}

impl Layout {
    pub fn new(resources_root: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            resources_root: resources_root.into(),
            project_root: project_root.into(),
        }
    }
}

/// Where the main window should load from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontendEntry {
    /// Packaged entry file
    pub primary: PathBuf,
    /// Development build used when the packaged entry is missing
    pub fallback: PathBuf,
}

/// Resolve the backend working directory for this run.
pub fn backend_working_directory(
    env: RuntimeEnvironment,
    layout: &Layout,
    overrides: &Overrides,
    profile: Option<&str>,
) -> PathBuf {
    if env.is_packaged() {
        return packaged_backend_directory(&layout.resources_root, overrides, profile);
    }

    let backend = profile::resolve_backend(overrides.backend.as_deref(), profile);
    layout.project_root.join("dist").join(backend.dir_name())
}

/// Ordered candidates for the packaged backend directory.
pub fn packaged_backend_candidates(
    resources_root: &Path,
    overrides: &Overrides,
    profile: Option<&str>,
) -> Vec<PathBuf> {
    let inferred = BackendKind::infer(profile.unwrap_or_default());
    let names = ordered_unique(overrides.backend(), inferred, BackendKind::ALL);

    let mut candidates: Vec<PathBuf> = names
        .into_iter()
        .map(|name| resources_root.join(name.dir_name()))
        .collect();

    // Legacy packages put main.js directly in the resources root.
    if resources_root.join(RUNTIME_ENTRY_FILE).exists() {
        candidates.push(resources_root.to_path_buf());
    }

    candidates
}

fn packaged_backend_directory(
    resources_root: &Path,
    overrides: &Overrides,
    profile: Option<&str>,
) -> PathBuf {
    first_existing(packaged_backend_candidates(resources_root, overrides, profile))
}

/// Resolve the frontend entry file for both the packaged and development layout.
pub fn frontend_entry(layout: &Layout, overrides: &Overrides, profile: Option<&str>) -> FrontendEntry {
    let frontend = profile::resolve_frontend(overrides.frontend.as_deref(), profile);
    FrontendEntry {
        primary: production_frontend_entry(&layout.resources_root, overrides, profile),
        fallback: development_frontend_entry(&layout.project_root, frontend),
    }
}

pub fn production_frontend_entry(
    resources_root: &Path,
    overrides: &Overrides,
    profile: Option<&str>,
) -> PathBuf {
    let inferred = FrontendKind::infer(profile.unwrap_or_default());
    let names = ordered_unique(overrides.frontend(), inferred, FrontendKind::ALL);

    let mut candidates = Vec::new();
    for name in names {
        let dir = resources_root.join(name.dir_name());
        if name.nests_browser_dir() {
            candidates.push(dir.join("browser").join("index.html"));
        }
        candidates.push(dir.join("index.html"));
    }

    first_existing(candidates)
}

pub fn development_frontend_entry(project_root: &Path, frontend: FrontendKind) -> PathBuf {
    let name = frontend.dir_name();
    let dist = project_root.join("dist").join(name);

    let candidates = if frontend.nests_browser_dir() {
        vec![dist.join("browser").join("index.html"), dist.join("index.html")]
    } else {
        vec![
            dist.join("index.html"),
            project_root
                .join("apps")
                .join(name)
                .join("dist")
                .join(name)
                .join("index.html"),
        ]
    };

    first_existing(candidates)
}

/// First candidate that exists on disk, falling back to the first candidate.
pub fn first_existing(candidates: Vec<PathBuf>) -> PathBuf {
    match candidates.iter().position(|p| p.exists()) {
        Some(index) => candidates[index].clone(),
        None => candidates.into_iter().next().unwrap_or_default(),
    }
}

fn ordered_unique<T, const N: usize>(preferred: Option<T>, inferred: T, known: [T; N]) -> Vec<T>
where
    T: PartialEq + Copy,
{
    let mut out = Vec::with_capacity(N + 2);
    for name in preferred.into_iter().chain([inferred]).chain(known) {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
