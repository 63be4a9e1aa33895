use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct MockEntry {
    content: Option<String>,
    file_type: FileType,
}

/// In-memory file system. Relative paths are resolved against `root`.
///
/// Every successful `read_to_string` is counted per path so tests can assert
/// that cached lookups do not read a descriptor twice.
pub struct MockFileSystem {
    entries: RefCell<BTreeMap<PathBuf, MockEntry>>,
    reads: RefCell<HashMap<PathBuf, usize>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            entries: RefCell::new(BTreeMap::new()),
            reads: RefCell::new(HashMap::new()),
            root,
        };
        let root = fs.root.clone();
        fs.add_dir(root);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        if let Some(parent) = path.parent() {
            self.ensure_parents(parent);
        }

        self.entries.borrow_mut().insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.ensure_parents(&path);
    }

    /// Number of times `path` has been read through `read_to_string`.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        let path = self.normalize_path(path.as_ref());
        self.reads.borrow().get(&path).copied().unwrap_or(0)
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(&self, path: &Path) {
        let mut entries = self.entries.borrow_mut();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            entries.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }

    fn file_type(&self, path: &Path) -> Option<FileType> {
        let path = self.normalize_path(path);
        self.entries.borrow().get(&path).map(|e| e.file_type)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.file_type(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.file_type(path) == Some(FileType::Directory)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.file_type(path) == Some(FileType::File)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let content = {
            let entries = self.entries.borrow();
            let entry = entries
                .get(&path)
                .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
            entry
                .content
                .clone()
                .ok_or_else(|| anyhow!("Not a file: {:?}", path))?
        };

        *self.reads.borrow_mut().entry(path).or_insert(0) += 1;
        Ok(content)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let entries = self.entries.borrow();

        if !matches!(
            entries.get(&path).map(|e| e.file_type),
            Some(FileType::Directory)
        ) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        Ok(entries
            .iter()
            .filter(|(entry_path, _)| entry_path.parent() == Some(path.as_path()))
            .map(|(entry_path, entry)| DirEntry {
                path: entry_path.clone(),
                name: entry_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                file_type: entry.file_type,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let fs = MockFileSystem::new();
        fs.add_file("Motion/Motion.tsproj", "<TcSmProject/>");

        assert!(fs.is_dir(Path::new("/mock/Motion")));
        assert!(fs.is_file(Path::new("/mock/Motion/Motion.tsproj")));
        assert!(fs.exists(Path::new("Motion/Motion.tsproj")));
    }

    #[test]
    fn test_read_to_string_counts_reads() {
        let fs = MockFileSystem::new();
        fs.add_file("Motion.sln", "content");

        assert_eq!(fs.read_count("Motion.sln"), 0);
        assert_eq!(fs.read_to_string(Path::new("Motion.sln")).unwrap(), "content");
        fs.read_to_string(Path::new("/mock/Motion.sln")).unwrap();
        assert_eq!(fs.read_count("Motion.sln"), 2);
    }

    #[test]
    fn test_read_directory_as_file_fails() {
        let fs = MockFileSystem::new();
        fs.add_dir("_Config");

        assert!(fs.read_to_string(Path::new("_Config")).is_err());
        assert!(fs.read_to_string(Path::new("missing")).is_err());
    }

    #[test]
    fn test_read_dir_lists_direct_children_only() {
        let fs = MockFileSystem::new();
        fs.add_file("b.sln", "");
        fs.add_file("a.sln", "");
        fs.add_file("Motion/Motion.tsproj", "");

        let names: Vec<String> = fs
            .read_dir(Path::new("/mock"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Motion", "a.sln", "b.sln"]);
    }

    #[test]
    fn test_read_dir_missing_directory() {
        let fs = MockFileSystem::new();
        assert!(fs.read_dir(Path::new("/elsewhere")).is_err());
    }
}
