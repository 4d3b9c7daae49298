//! Device node discovery

use crate::backend::error::{BackendError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// List device nodes in `dir` whose file name starts with `prefix`
///
/// The scan happens once; devices plugged in later are not picked up.
/// Results are sorted so registration order is stable across runs.
pub fn discover_devices(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| BackendError::DeviceDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut devices: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(prefix))
        })
        .map(|entry| entry.path())
        .collect();

    devices.sort();
    debug!(
        "Found {} device node(s) matching {}/{}*",
        devices.len(),
        dir.display(),
        prefix
    );

    Ok(devices)
}
