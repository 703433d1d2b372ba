use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::consts::HANDLE_MARKER;
use crate::error::AppError;
use crate::presence::Category;

/// Appends processed usernames to per-category files in the results folder
#[derive(Debug)]
pub(crate) struct ResultWriter {
    folder: PathBuf,
    write_lock: Mutex<()>,
}

impl ResultWriter {
    pub(crate) fn new(folder: &Path) -> Self {
        Self {
            folder: folder.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create the folder and, when asked, wipe results of previous runs.
    pub(crate) fn prepare(&self, clear: bool) -> Result<(), AppError> {
        let results_err = |e: io::Error| AppError::Results {
            path: self.folder.clone(),
            source: e,
        };
        if !self.folder.exists() {
            debug!("Creating folder for results: {}", self.folder.display());
        }
        fs::create_dir_all(&self.folder).map_err(results_err)?;

        if clear {
            for entry in fs::read_dir(&self.folder).map_err(results_err)? {
                let path = entry.map_err(results_err)?.path();
                if path.is_file() {
                    debug!("Deleting {}...", path.display());
                    fs::remove_file(&path).map_err(results_err)?;
                }
            }
        }
        Ok(())
    }

    /// Append `@username` to the category's file. Never truncates.
    pub(crate) fn append(&self, username: &str, category: &Category) -> io::Result<PathBuf> {
        let path = self.folder.join(category.file_name().as_ref());
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        fs::create_dir_all(&self.folder)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let handle = username.trim_start_matches(HANDLE_MARKER);
        writeln!(file, "{HANDLE_MARKER}{handle}")?;
        Ok(path)
    }
}
