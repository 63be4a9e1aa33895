//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Other,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// Abstraction over the file system reads the job driver performs, so that
/// descriptor lookups can be tested without touching disk.
pub trait FileSystem {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// List directory contents (not recursive, order unspecified)
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry() {
        let entry = DirEntry {
            path: PathBuf::from("/repo/Motion.sln"),
            name: "Motion.sln".to_string(),
            file_type: FileType::File,
        };
        assert_eq!(entry.path(), Path::new("/repo/Motion.sln"));
        assert_eq!(entry.file_name(), "Motion.sln");
        assert!(entry.is_file());
    }

    #[test]
    fn test_dir_entry_directory_is_not_file() {
        let entry = DirEntry {
            path: PathBuf::from("/repo/_Config"),
            name: "_Config".to_string(),
            file_type: FileType::Directory,
        };
        assert!(!entry.is_file());
    }
}
