use std::path::{Path, PathBuf};
use tracing::debug;

/// File system utilities
pub struct FileUtils;

impl FileUtils {
    /// Get a uuid-based file path in the system temp directory
    pub fn temp_file_path(prefix: &str, suffix: &str) -> PathBuf {
        let temp_dir = std::env::temp_dir();
        let filename = format!("{}_{}.{}", prefix, uuid::Uuid::new_v4(), suffix);
        temp_dir.join(filename)
    }
}

/// A temp file that is removed when the guard goes out of scope.
/// The file is not created by the guard; it only owns the path.
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            path: FileUtils::temp_file_path(prefix, suffix),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                debug!("Failed to remove temp file {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_paths_are_unique() {
        let a = FileUtils::temp_file_path("dl", "m4a");
        let b = FileUtils::temp_file_path("dl", "m4a");
        assert_ne!(a, b);
        assert_eq!(a.extension().unwrap(), "m4a");
    }

    #[test]
    fn temp_file_guard_removes_file_on_drop() {
        let path = {
            let temp = TempFile::new("guard", "bin");
            std::fs::write(temp.path(), b"payload").unwrap();
            assert!(temp.path().exists());
            temp.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn temp_file_guard_tolerates_missing_file() {
        let temp = TempFile::new("never-created", "bin");
        let path = temp.path().to_path_buf();
        drop(temp);
        assert!(!path.exists());
    }
}
