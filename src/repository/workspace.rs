use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::error::Result;

const WORKSPACE_PREFIX: &str = "readmesmith-";

/// Exclusively owned scratch directory for one request.
///
/// The directory is removed by [`Workspace::close`] or, on any other exit path,
/// when the value is dropped. A failed removal is logged and never returned.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Creates a fresh, uniquely named directory under `parent`
    pub fn create(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        debug!("Created working directory {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Location of the working directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory now
    pub fn close(mut self) {
        if let Some(dir) = self.dir.take() {
            release(dir, &self.path);
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            release(dir, &self.path);
        }
    }
}

fn release(dir: TempDir, path: &Path) {
    match dir.close() {
        Ok(()) => debug!("Removed working directory {}", path.display()),
        Err(e) => warn!("Failed to remove working directory {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_close_removes_directory_and_contents() {
        let parent = TempDir::new().unwrap();
        let workspace = Workspace::create(parent.path()).unwrap();
        let path = workspace.path().to_path_buf();
        fs::create_dir_all(path.join("src/deep")).unwrap();
        fs::write(path.join("src/deep/file.rs"), "fn x() {}").unwrap();

        assert!(path.starts_with(parent.path()));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(WORKSPACE_PREFIX));

        workspace.close();
        assert!(!path.exists());
        assert_eq!(entries(parent.path()), 0);
    }

    #[test]
    fn test_drop_removes_directory() {
        let parent = TempDir::new().unwrap();
        let path = {
            let workspace = Workspace::create(parent.path()).unwrap();
            fs::write(workspace.path().join("a"), "a").unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_on_error_path() {
        fn failing(parent: &Path) -> Result<PathBuf> {
            let workspace = Workspace::create(parent)?;
            let path = workspace.path().to_path_buf();
            fs::read_to_string(workspace.path().join("missing"))?;
            Ok(path)
        }

        let parent = TempDir::new().unwrap();
        assert!(failing(parent.path()).is_err());
        assert_eq!(entries(parent.path()), 0);
    }

    #[test]
    fn test_workspaces_are_unique() {
        let parent = TempDir::new().unwrap();
        let a = Workspace::create(parent.path()).unwrap();
        let b = Workspace::create(parent.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_creates_missing_parent() {
        let parent = TempDir::new().unwrap();
        let nested = parent.path().join("a/b");
        let workspace = Workspace::create(&nested).unwrap();
        assert!(workspace.path().starts_with(&nested));
    }
}
