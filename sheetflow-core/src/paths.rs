//! Path state manager
//!
//! Holds the live source/destination/output triple and takes the
//! timestamped safety copy of an existing base file before its path is
//! adopted as the destination.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::domain::paths::SheetPaths;
use crate::error::{PipelineError, Result};

/// Manages the process-wide file path state
pub struct PathManager {
    output_dir: PathBuf,
    backup_dir: PathBuf,
    paths: Mutex<Option<SheetPaths>>,
}

impl PathManager {
    pub fn new(output_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            backup_dir: backup_dir.into(),
            paths: Mutex::new(None),
        }
    }

    /// Adopts freshly uploaded files as the live path state
    ///
    /// A file already present at the base path is copied to the backup
    /// directory first; callers must therefore update paths before
    /// writing the new upload over the old file. If the backup copy
    /// fails the previous state stays live and the error propagates to
    /// the upload response.
    pub fn update_file_paths(&self, base: &Path, new_data: &Path) -> Result<SheetPaths> {
        if base.exists() {
            let backup_path = self.backup_path_for(base);
            fs::copy(base, &backup_path).map_err(|source| PipelineError::Backup {
                path: base.to_path_buf(),
                source,
            })?;
            debug!("created backup at {}", backup_path.display());
        }

        let next = SheetPaths::derive(new_data, base, &self.output_dir);
        *self.paths.lock().unwrap() = Some(next.clone());
        debug!(
            source = %next.source.display(),
            destination = %next.destination.display(),
            output = %next.output.display(),
            "updated file paths"
        );
        Ok(next)
    }

    /// Read-only view for the runner; `None` until the first upload
    pub fn snapshot(&self) -> Option<SheetPaths> {
        self.paths.lock().unwrap().clone()
    }

    /// Backup name: timestamp to second precision plus the original
    /// file name. Collisions within the same second overwrite.
    fn backup_path_for(&self, base: &Path) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let file_name = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sheet".to_string());
        self.backup_dir.join(format!("backup_{stamp}_{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_upload_sets_paths_without_backup() {
        let dir = tempdir().unwrap();
        let manager = PathManager::new(dir.path().join("output"), dir.path().join("backups"));

        let base = dir.path().join("base_sheet.xlsx");
        let new_data = dir.path().join("new_data.xlsx");

        let paths = manager.update_file_paths(&base, &new_data).unwrap();

        assert_eq!(paths.destination, base);
        assert_eq!(paths.source, new_data);
        assert_eq!(
            paths.output,
            dir.path().join("output").join("processed_base_sheet.xlsx")
        );
        assert_eq!(manager.snapshot(), Some(paths));
    }

    #[test]
    fn test_existing_base_file_is_backed_up_byte_identical() {
        let dir = tempdir().unwrap();
        let backup_dir = dir.path().join("backups");
        fs::create_dir_all(&backup_dir).unwrap();
        let manager = PathManager::new(dir.path().join("output"), &backup_dir);

        let base = dir.path().join("base_sheet.xlsx");
        fs::write(&base, b"previous contents").unwrap();

        manager
            .update_file_paths(&base, &dir.path().join("new_data.xlsx"))
            .unwrap();

        let backups: Vec<_> = fs::read_dir(&backup_dir)
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(backups.len(), 1);

        let name = backups[0].file_name().to_string_lossy().into_owned();
        let today = chrono::Local::now().format("%Y%m%d").to_string();
        assert!(name.starts_with(&format!("backup_{today}")));
        assert!(name.ends_with("base_sheet.xlsx"));

        let copied = fs::read(backups[0].path()).unwrap();
        assert_eq!(copied, b"previous contents");
    }

    #[test]
    fn test_backup_failure_leaves_previous_state_live() {
        let dir = tempdir().unwrap();
        // Backup directory intentionally missing, so the copy fails
        let manager = PathManager::new(dir.path().join("output"), dir.path().join("absent"));

        let first_base = dir.path().join("first.xlsx");
        let previous = manager
            .update_file_paths(&first_base, &dir.path().join("new_data.xlsx"))
            .unwrap();

        let second_base = dir.path().join("second.xlsx");
        fs::write(&second_base, b"contents").unwrap();

        let result = manager.update_file_paths(&second_base, &dir.path().join("other.xlsx"));

        assert!(matches!(result, Err(PipelineError::Backup { .. })));
        assert_eq!(manager.snapshot(), Some(previous));
    }
}
