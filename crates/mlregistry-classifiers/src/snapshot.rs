//! JSON snapshot files for the built-in classifiers
//!
//! A snapshot is a single JSON document:
//!
//! ```json
//! { "class_type": "nearest_neighbor", "format_version": 1, "state": "trained", "data": { ... } }
//! ```
//!
//! Writes go to a temporary sibling file that is renamed over the target, so a
//! failed save never leaves a truncated snapshot behind.

use crate::classifier::ClassifierState;
use mlregistry_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Current snapshot format version
pub const FORMAT_VERSION: u32 = 1;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// On-disk snapshot document
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub class_type: String,
    pub format_version: u32,
    pub state: ClassifierState,
    pub data: T,
}

/// Write a snapshot for `class_type` to `path`
pub fn write_snapshot<T: Serialize>(
    path: &Path,
    class_type: &str,
    state: ClassifierState,
    data: &T,
) -> Result<()> {
    let snapshot = Snapshot {
        class_type: class_type.to_string(),
        format_version: FORMAT_VERSION,
        state,
        data,
    };
    let bytes = serde_json::to_vec_pretty(&snapshot)
        .map_err(|e| Error::persistence(format!("failed to encode snapshot: {e}")))?;

    let tmp = tmp_path(path)?;
    if let Err(e) = write_and_sync(&tmp, &bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::persistence(format!(
            "failed to write snapshot {}: {e}",
            path.display()
        )));
    }

    debug!(path = %path.display(), bytes = bytes.len(), "Snapshot written");
    Ok(())
}

/// Read a snapshot written for `expected_class_type`
pub fn read_snapshot<T: DeserializeOwned>(
    path: &Path,
    expected_class_type: &str,
) -> Result<(ClassifierState, T)> {
    let bytes = fs::read(path).map_err(|e| {
        Error::persistence(format!("failed to read snapshot {}: {e}", path.display()))
    })?;
    let snapshot: Snapshot<T> = serde_json::from_slice(&bytes).map_err(|e| {
        Error::persistence(format!("malformed snapshot {}: {e}", path.display()))
    })?;

    if snapshot.class_type != expected_class_type {
        return Err(Error::persistence(format!(
            "snapshot {} was written by '{}', not '{}'",
            path.display(),
            snapshot.class_type,
            expected_class_type
        )));
    }
    if snapshot.format_version != FORMAT_VERSION {
        return Err(Error::persistence(format!(
            "snapshot {} has unsupported format version {}",
            path.display(),
            snapshot.format_version
        )));
    }

    Ok((snapshot.state, snapshot.data))
}

fn tmp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::persistence(format!("{} is not a file path", path.display())))?;
    let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".tmp-{}-{n}", std::process::id()));
    Ok(path.with_file_name(tmp_name))
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlregistry_core::ErrorKind;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        write_snapshot(&path, "zero", ClassifierState::Trained, &vec![1u32, 2, 3]).unwrap();
        let (state, data): (ClassifierState, Vec<u32>) = read_snapshot(&path, "zero").unwrap();

        assert_eq!(state, ClassifierState::Trained);
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_class_type_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_snapshot(&path, "zero", ClassifierState::Untrained, &()).unwrap();

        let err = read_snapshot::<()>(&path, "nearest_neighbor").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_write_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("model.json");

        let err = write_snapshot(&path, "zero", ClassifierState::Untrained, &()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(!path.exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_snapshot(&path, "zero", ClassifierState::Untrained, &()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("model.json")]);
    }

    #[test]
    fn test_garbage_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"not json").unwrap();

        let err = read_snapshot::<()>(&path, "zero").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}
