//! Campaign linker (§4.6)
//!
//! UPLOAD campaigns append produced remote names to `uploaded.list`.
//! DOWNLOAD campaigns consume that list, keyed by a prior run's test ID,
//! and size their workload from it.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkerError {
    #[error("missing uploaded files list")]
    MissingUploadedList,
    #[error("failed to open uploaded list {0}: {1}")]
    Open(PathBuf, std::io::Error),
    #[error("failed to write uploaded list {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

pub fn uploaded_list_path(work_root: &Path, test_id: &str) -> PathBuf {
    work_root.join(test_id).join("uploaded.list")
}

/// Serializes concurrent appends from all UPLOAD workers behind a single
/// mutex rather than relying on OS-level atomicity of `O_APPEND` writes
/// for arbitrary-size lines (§9 "Per-run manifest as shared state").
pub struct UploadedListWriter {
    file: Mutex<File>,
    path: PathBuf,
}

impl UploadedListWriter {
    pub fn create(work_dir: &Path) -> Result<Self, LinkerError> {
        let path = work_dir.join("uploaded.list");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LinkerError::Open(path.clone(), e))?;
        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Append one remote name, under the writer's single mutex.
    pub fn append(&self, remote_name: &str) -> Result<(), LinkerError> {
        let mut file = self.file.lock().expect("uploaded.list mutex poisoned");
        writeln!(file, "{remote_name}").map_err(|e| LinkerError::Write(self.path.clone(), e))?;
        file.flush()
            .map_err(|e| LinkerError::Write(self.path.clone(), e))
    }

    pub fn line_count(&self) -> Result<usize, LinkerError> {
        let path = self.path.clone();
        let contents = std::fs::read_to_string(&path).map_err(|e| LinkerError::Open(path, e))?;
        Ok(contents.lines().filter(|l| !l.is_empty()).count())
    }
}

/// Load the remote names a prior UPLOAD run produced. Refuses to start if
/// `uploaded.list` is missing or empty (§4.6).
pub fn load_uploaded_list(work_root: &Path, upload_test_id: &str) -> Result<Vec<String>, LinkerError> {
    if upload_test_id.is_empty() {
        return Err(LinkerError::MissingUploadedList);
    }
    let path = uploaded_list_path(work_root, upload_test_id);
    let file = File::open(&path).map_err(|_| LinkerError::MissingUploadedList)?;
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .filter_map(|l| l.ok())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(LinkerError::MissingUploadedList);
    }
    Ok(lines)
}

/// DOWNLOAD file selection (§4.3 step 4):
/// `idx = ((worker_id-1) × R + (transfer_id-1)) mod lines`.
pub fn download_target_index(worker_id: usize, transfer_id: usize, requests_per_worker: usize, lines: usize) -> usize {
    if lines == 0 {
        return 0;
    }
    ((worker_id - 1) * requests_per_worker + (transfer_id - 1)) % lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_list_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_uploaded_list(dir.path(), "test_123").unwrap_err();
        assert!(matches!(err, LinkerError::MissingUploadedList));
    }

    #[test]
    fn empty_upload_test_id_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_uploaded_list(dir.path(), "").unwrap_err();
        assert!(matches!(err, LinkerError::MissingUploadedList));
    }

    #[test]
    fn appended_lines_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().join("test_123");
        std::fs::create_dir_all(&work_dir).unwrap();
        let writer = UploadedListWriter::create(&work_dir).unwrap();
        writer.append("a.dat").unwrap();
        writer.append("b.dat").unwrap();
        assert_eq!(writer.line_count().unwrap(), 2);

        let lines = load_uploaded_list(dir.path(), "test_123").unwrap();
        assert_eq!(lines, vec!["a.dat".to_string(), "b.dat".to_string()]);
    }

    #[test]
    fn download_index_wraps_modulo_line_count() {
        assert_eq!(download_target_index(1, 1, 5, 10), 0);
        assert_eq!(download_target_index(2, 1, 5, 10), 5);
        assert_eq!(download_target_index(1, 11, 5, 10), 0);
    }
}
