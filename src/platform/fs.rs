// PieLog - platform/fs.rs
//
// Filesystem side of the logger: project-root discovery, the per-run log
// directory, and the size-rotated log file.
//
// Rotation scheme (index 1 is always the newest backup):
//   <name>-<start>.log          current file
//   <name>-<start>-(1).log      most recent backup
//   <name>-<start>-(N).log      oldest retained backup, N = max_backups
// Before a record is written, if it would take the current file to the
// size limit, the oldest backup is deleted, the others shift up by one,
// the current file becomes (1), and a fresh current file is opened.
// With zero backups the current file is truncated instead.

use crate::util::constants::{LOG_FILE_EXTENSION, PROJECT_ROOT_SENTINEL};
use crate::util::error::SinkError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// Project root
// =============================================================================

/// Walk upward from `start` looking for the project-root sentinel file.
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_ROOT_SENTINEL).is_file())
        .map(Path::to_path_buf)
}

/// Explicit root if configured, else the discovered root, else the current
/// directory.
pub fn resolve_project_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match discover_project_root(&cwd) {
        Some(root) => {
            tracing::debug!(root = %root.display(), "Project root discovered");
            root
        }
        None => {
            tracing::debug!(
                cwd = %cwd.display(),
                sentinel = PROJECT_ROOT_SENTINEL,
                "No project root sentinel found; using current directory"
            );
            cwd
        }
    }
}

// =============================================================================
// Run directory
// =============================================================================

/// Create `<base>/<start_timestamp>/` (idempotent) and return it.
pub fn create_run_directory(base: &Path, start_timestamp: &str) -> Result<PathBuf, SinkError> {
    let dir = base.join(start_timestamp);
    fs::create_dir_all(&dir).map_err(|e| SinkError::CreateDirectory {
        path: dir.clone(),
        source: e,
    })?;
    tracing::debug!(path = %dir.display(), "Log directory ready");
    Ok(dir)
}

// =============================================================================
// RotatingFile
// =============================================================================

/// Append-only log file that rotates by size.
#[derive(Debug)]
pub struct RotatingFile {
    dir: PathBuf,
    stem: String,
    file: File,
    written: u64,
    max_bytes: u64,
    max_backups: usize,
}

impl RotatingFile {
    /// Open (or continue) `<dir>/<stem>.log`.
    pub fn open(
        dir: &Path,
        stem: &str,
        max_bytes: u64,
        max_backups: usize,
    ) -> Result<Self, SinkError> {
        let path = current_path(dir, stem);
        let file = open_append(&path).map_err(|e| SinkError::Open {
            path: path.clone(),
            source: e,
        })?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        tracing::debug!(
            path = %path.display(),
            size = written,
            max_bytes,
            max_backups,
            "File sink opened"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            file,
            written,
            max_bytes,
            max_backups,
        })
    }

    /// Path of the file currently being written.
    pub fn path(&self) -> PathBuf {
        current_path(&self.dir, &self.stem)
    }

    /// Path of backup number `index` (1 = newest).
    pub fn backup_path(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}-({index}).{LOG_FILE_EXTENSION}", self.stem))
    }

    /// Write one record followed by a newline as a single write, rotating
    /// first if needed.
    pub fn write_record(&mut self, record: &str) -> Result<(), SinkError> {
        let line = terminated(record);
        let len = line.len() as u64;
        if self.should_rotate(len) {
            self.rotate()?;
        }

        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| SinkError::Write {
                sink: "file",
                source: e,
            })?;
        self.written += len;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.file.flush().map_err(|e| SinkError::Write {
            sink: "file",
            source: e,
        })
    }

    fn should_rotate(&self, incoming: u64) -> bool {
        self.max_bytes > 0 && self.written > 0 && self.written + incoming >= self.max_bytes
    }

    fn rotate(&mut self) -> Result<(), SinkError> {
        let current = self.path();
        let rotate_err = |path: &Path, e: io::Error| SinkError::Rotate {
            path: path.to_path_buf(),
            source: e,
        };

        if self.max_backups == 0 {
            self.file = OpenOptions::new()
                .write(true)
                .truncate(true)
                .open(&current)
                .map_err(|e| rotate_err(&current, e))?;
            self.written = 0;
            tracing::debug!(path = %current.display(), "Log file truncated (no backups kept)");
            return Ok(());
        }

        let oldest = self.backup_path(self.max_backups);
        remove_if_exists(&oldest).map_err(|e| rotate_err(&oldest, e))?;
        for index in (1..self.max_backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1)).map_err(|e| rotate_err(&from, e))?;
            }
        }
        let newest = self.backup_path(1);
        fs::rename(&current, &newest).map_err(|e| rotate_err(&current, e))?;

        self.file = open_append(&current).map_err(|e| rotate_err(&current, e))?;
        self.written = 0;

        tracing::debug!(
            path = %current.display(),
            backup = %newest.display(),
            "Log file rotated"
        );
        Ok(())
    }
}

/// `record` plus its trailing newline in one buffer.
pub fn terminated(record: &str) -> String {
    let mut line = String::with_capacity(record.len() + 1);
    line.push_str(record);
    line.push('\n');
    line
}

fn current_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{LOG_FILE_EXTENSION}"))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
