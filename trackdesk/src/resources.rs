use std::path::{Path, PathBuf};

/// Locate the packaged resources directory relative to the executable.
///
/// - `<exe_dir>/resources` (Windows/Linux packages)
/// - `<exe_dir>/../Resources` (macOS app bundles)
pub fn resources_dir_from_exe(exe_path: &Path) -> Option<PathBuf> {
    let exe_dir = exe_path.parent()?;

    let sibling = exe_dir.join("resources");
    if sibling.is_dir() {
        return Some(sibling);
    }

    let bundle = exe_dir.parent()?.join("Resources");
    bundle.is_dir().then_some(bundle)
}

/// Resources root: explicit value, then the executable's package when
/// `packaged`, then `cwd`.
pub fn default_resources_root(explicit: Option<&Path>, packaged: bool, cwd: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if packaged
        && let Ok(exe) = std::env::current_exe()
        && let Some(dir) = resources_dir_from_exe(&exe)
    {
        return dir;
    }

    cwd.to_path_buf()
}
