//! File lookup for feuille
//!
//! A [`Locator`] resolves a bare file name against a base directory: first
//! `base/name` directly, then a depth-first walk of every subdirectory.
//!
//! ```no_run
//! use feuille_locate::Locator;
//!
//! let locator = Locator::beside_executable().unwrap();
//! match locator.locate("budget.xlsx") {
//!     Some(path) => println!("found {}", path.display()),
//!     None => println!("not found"),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Finds files by name under a fixed base directory
#[derive(Debug, Clone)]
pub struct Locator {
    base: PathBuf,
}

impl Locator {
    /// Create a locator rooted at `base`.
    ///
    /// A relative base is resolved against the current directory, so every
    /// located path is absolute.
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        let base = base.into();
        let base = std::path::absolute(&base).unwrap_or(base);
        Locator { base }
    }

    /// Create a locator rooted at the directory of the running program
    pub fn beside_executable() -> io::Result<Self> {
        let exe = std::env::current_exe()?;
        let base = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent"))?;
        Ok(Self::new(base))
    }

    /// The base directory
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve `file_name` to a path under the base directory.
    ///
    /// `base/file_name` is returned as soon as it exists, without looking at
    /// any subdirectory. Otherwise the tree is walked depth-first: in each
    /// directory the files are checked (in name order) before any
    /// subdirectory is entered, and the first exact name match wins.
    /// Symlinked directories are not entered and unreadable directories are
    /// skipped.
    #[must_use]
    pub fn locate(&self, file_name: &str) -> Option<PathBuf> {
        let direct = self.base.join(file_name);
        if direct.exists() {
            tracing::debug!("Found {} in base directory", direct.display());
            return Some(direct);
        }

        let found = search(&self.base, file_name);
        match &found {
            Some(path) => tracing::debug!("Found {} by traversal", path.display()),
            None => tracing::debug!(
                "No file named '{}' under {}",
                file_name,
                self.base.display()
            ),
        }
        found
    }
}

fn search(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let mut entries: Vec<fs::DirEntry> = match fs::read_dir(dir) {
        Ok(read) => read.filter_map(Result::ok).collect(),
        Err(err) => {
            tracing::debug!("Skipping {}: {}", dir.display(), err);
            return None;
        }
    };
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut subdirs = Vec::new();
    for entry in &entries {
        let path = entry.path();
        if path.is_dir() {
            // file_type() does not follow links, so symlinked dirs stay unvisited
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                subdirs.push(path);
            }
        } else if entry.file_name() == file_name {
            return Some(path);
        }
    }

    subdirs.iter().find_map(|sub| search(sub, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_base_accessor() {
        let locator = Locator::new("/srv/data");
        assert_eq!(locator.base(), Path::new("/srv/data"));
    }

    #[test]
    fn test_relative_base_is_made_absolute() {
        let locator = Locator::new(".");
        assert!(locator.base().is_absolute());
        assert_eq!(locator.base(), std::env::current_dir().unwrap());
    }

    #[test]
    fn test_files_before_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/deep")).unwrap();
        fs::write(dir.path().join("a/deep/target.xlsx"), b"deep").unwrap();
        fs::write(dir.path().join("a/target.xlsx"), b"shallow").unwrap();

        let found = search(dir.path(), "target.xlsx").unwrap();
        assert_eq!(found, dir.path().join("a/target.xlsx"));
    }

    #[test]
    fn test_directory_named_like_target_is_not_a_match() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/report.xlsx")).unwrap();

        assert_eq!(search(dir.path(), "report.xlsx"), None);
    }

    #[test]
    fn test_beside_executable_uses_exe_parent() {
        let locator = Locator::beside_executable().unwrap();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(Some(locator.base()), exe.parent());
    }
}
