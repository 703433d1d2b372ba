use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AuthError};

/// A pre-authenticated credential stored as one file in the sessions folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

impl Session {
    pub(crate) fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    /// Session file contents, trimmed. Empty files are unusable.
    pub(crate) fn read_token(&self) -> Result<String, AuthError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| AuthError::InvalidSession {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidSession {
                path: self.path.clone(),
                reason: "file is empty".to_string(),
            });
        }
        Ok(token.to_string())
    }
}

/// List session files matching `pattern` inside `folder`, sorted by path.
pub(crate) fn discover_sessions(folder: &Path, pattern: &str) -> Result<Vec<Session>, AppError> {
    let folder_err = |reason: String| AppError::SessionsFolder {
        folder: folder.to_path_buf(),
        reason,
    };
    if !folder.is_dir() {
        return Err(AppError::NoSessions {
            folder: folder.to_path_buf(),
        });
    }

    let escaped = PathBuf::from(glob::Pattern::escape(&folder.to_string_lossy()));
    let full_pattern = escaped.join(pattern);
    let entries =
        glob::glob(&full_pattern.to_string_lossy()).map_err(|e| folder_err(e.to_string()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.'))
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::NoSessions {
            folder: folder.to_path_buf(),
        });
    }
    Ok(paths.into_iter().map(Session::from_path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.session"), "tok-b").unwrap();
        fs::write(dir.path().join("a.session"), "tok-a").unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let sessions = discover_sessions(dir.path(), "*").unwrap();
        let names: Vec<_> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn pattern_filters_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.session"), "tok").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a session").unwrap();

        let sessions = discover_sessions(dir.path(), "*.session").unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name, "main");
    }

    #[test]
    fn empty_folder_has_no_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_sessions(dir.path(), "*").unwrap_err();
        assert!(matches!(err, AppError::NoSessions { .. }));
    }

    #[test]
    fn missing_folder_has_no_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_sessions(&dir.path().join("nope"), "*").unwrap_err();
        assert!(matches!(err, AppError::NoSessions { .. }));
    }

    #[test]
    fn token_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.session");
        fs::write(&path, "  secret-token\n").unwrap();
        assert_eq!(Session::from_path(path).read_token().unwrap(), "secret-token");
    }

    #[test]
    fn empty_token_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.session");
        fs::write(&path, "\n").unwrap();
        let err = Session::from_path(path).read_token().unwrap_err();
        assert!(matches!(err, AuthError::InvalidSession { .. }));
    }
}
