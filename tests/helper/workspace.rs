//! Temporary project trees

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A temporary directory populated with manifest files
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        let path = self.dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
