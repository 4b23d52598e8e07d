//! Server configuration
//!
//! Bind address, storage directories, and the upload size cap. All
//! values can be overridden from the environment for different
//! deployment scenarios.

use std::path::{Path, PathBuf};

/// File extensions accepted by the upload endpoint
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

const DEFAULT_MAX_UPLOAD_MB: usize = 16;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Where uploaded spreadsheets are persisted
    pub upload_dir: PathBuf,

    /// Where finished output artifacts are copied
    pub output_dir: PathBuf,

    /// Where pre-upload safety copies are kept
    pub backup_dir: PathBuf,

    /// Maximum accepted upload body size in bytes
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Creates configuration from environment variables
    ///
    /// Recognized variables, all optional:
    /// - SHEETFLOW_BIND_ADDR (default: 0.0.0.0:8080)
    /// - SHEETFLOW_UPLOAD_DIR (default: uploads)
    /// - SHEETFLOW_OUTPUT_DIR (default: output)
    /// - SHEETFLOW_BACKUP_DIR (default: backups)
    /// - SHEETFLOW_MAX_UPLOAD_MB (default: 16)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_upload_bytes = std::env::var("SHEETFLOW_MAX_UPLOAD_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            bind_addr: std::env::var("SHEETFLOW_BIND_ADDR").unwrap_or(defaults.bind_addr),
            upload_dir: env_path("SHEETFLOW_UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            output_dir: env_path("SHEETFLOW_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            backup_dir: env_path("SHEETFLOW_BACKUP_DIR").unwrap_or(defaults.backup_dir),
            max_upload_bytes,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than 0");
        }

        for (name, dir) in [
            ("upload_dir", &self.upload_dir),
            ("output_dir", &self.output_dir),
            ("backup_dir", &self.backup_dir),
        ] {
            if dir.as_os_str().is_empty() {
                anyhow::bail!("{name} cannot be empty");
            }
        }

        Ok(())
    }

    /// Creates the storage directories (idempotent)
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [&self.upload_dir, &self.output_dir, &self.backup_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
            backup_dir: PathBuf::from("backups"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var).ok().map(PathBuf::from)
}

/// True when `filename` carries an allowed spreadsheet extension
pub fn allowed_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
