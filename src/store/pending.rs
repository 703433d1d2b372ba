use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::AppError;

/// Usernames still waiting to be processed, mirrored to a text file.
///
/// Every removal rewrites the whole file while holding the lock, so the file
/// always reflects unfinished work and concurrent removals cannot undo each
/// other.
#[derive(Debug)]
pub(crate) struct PendingList {
    path: PathBuf,
    entries: Mutex<Vec<String>>,
}

impl PendingList {
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::PendingList {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("Parsing usernames from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(parse_usernames(&content)),
        })
    }

    /// Snapshot in file order
    pub(crate) fn usernames(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Drop the first exact match and persist. Returns whether it was present.
    pub(crate) fn remove(&self, username: &str) -> io::Result<bool> {
        let mut entries = self.lock();
        let Some(pos) = entries.iter().position(|u| u == username) else {
            return Ok(false);
        };
        let removed = entries.remove(pos);
        if let Err(e) = write_atomically(&self.path, &entries.join("\n")) {
            entries.insert(pos, removed);
            return Err(e);
        }
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic inside the lock leaves the Vec itself consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One username per line; blanks dropped, duplicates keep their first position.
fn parse_usernames(content: &str) -> Vec<String> {
    let mut usernames: Vec<String> = Vec::new();
    for line in content.lines() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        if usernames.iter().any(|u| u == name) {
            warn!("Skipping duplicate username {name}");
            continue;
        }
        usernames.push(name.to_string());
    }
    usernames
}

fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}
