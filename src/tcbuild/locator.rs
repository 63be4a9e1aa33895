//! Locates the solution, TwinCAT project and PLC project descriptors
//!
//! A TwinCAT repository nests three descriptors:
//!
//! - `<name>.sln` in the repository root, referencing the `.tsproj` with a
//!   `Project(...) = "name", "relative\path.tsproj", ...` line
//! - `<name>.tsproj`, whose `TcSmProject/Project/Plc/Project` node either
//!   points at the `.plcproj` directly (`PrjFilePath`) or names an `.xti`
//!   file under `_Config/PLC` (`File`) that carries the `PrjFilePath`
//! - `<name>.plcproj`, the MSBuild project with the library metadata

use super::cache::BoundedCache;
use super::error::{JobError, Result};
use super::xml::{child_element, parse_document};
use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const SOLUTION_EXTENSION: &str = "sln";
const XTI_FOLDER: [&str; 2] = ["_Config", "PLC"];

fn tsproj_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#",\s*"([^"]*\.tsproj)""#).expect("valid regex"))
}

pub struct ProjectLocator<'fs> {
    fs: &'fs dyn FileSystem,
    working_dir: PathBuf,
    sub_projects: BoundedCache<PathBuf, PathBuf>,
    packages: BoundedCache<PathBuf, PathBuf>,
}

impl<'fs> ProjectLocator<'fs> {
    /// `working_dir` should be absolute; relative paths are only normalized.
    pub fn new(fs: &'fs dyn FileSystem, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            working_dir: normalize_path(&working_dir.into()),
            sub_projects: BoundedCache::default(),
            packages: BoundedCache::default(),
        }
    }

    /// Finds the `.sln` in the working directory (not recursive).
    ///
    /// With several candidates the lexicographically first file name wins.
    pub fn find_top_level(&self) -> Result<PathBuf> {
        let entries = self
            .fs
            .read_dir(&self.working_dir)
            .map_err(|e| JobError::io(&self.working_dir, e))?;

        let mut candidates: Vec<PathBuf> = entries
            .into_iter()
            .filter(|entry| entry.is_file())
            .filter(|entry| {
                Path::new(entry.file_name())
                    .extension()
                    .map(|ext| ext == SOLUTION_EXTENSION)
                    .unwrap_or(false)
            })
            .map(|entry| self.working_dir.join(entry.file_name()))
            .collect();
        candidates.sort();

        let Some(first) = candidates.first().cloned() else {
            return Err(JobError::NotFound(format!(
                "no .{} file in {}",
                SOLUTION_EXTENSION,
                self.working_dir.display()
            )));
        };

        if candidates.len() > 1 {
            warn!(
                "Found {} solution files {:?}, using {}",
                candidates.len(),
                candidates,
                first.display()
            );
        }

        debug!("Using solution {}", first.display());
        Ok(first)
    }

    /// Resolves the `.tsproj` referenced by `solution`.
    pub fn find_sub_project(&mut self, solution: &Path) -> Result<PathBuf> {
        let key = solution.to_path_buf();
        if let Some(cached) = self.sub_projects.get(&key) {
            return Ok(cached);
        }

        let content = self
            .fs
            .read_to_string(solution)
            .map_err(|e| JobError::io(solution, e))?;

        let found = content.lines().find_map(|line| {
            tsproj_reference().captures(line).map(|caps| {
                debug!("Found tsproj reference on line {}", line.trim());
                caps[1].to_string()
            })
        });

        let Some(reference) = found else {
            return Err(JobError::NotFound(format!(
                "tsproj reference in {}",
                solution.display()
            )));
        };

        let tsproj = resolve_reference(parent_dir(solution), &reference);
        self.sub_projects.insert(key, tsproj.clone());
        Ok(tsproj)
    }

    /// Resolves the `.plcproj` referenced by `tsproj`, following the `.xti`
    /// indirection when the PLC project is stored as a separate file.
    pub fn find_package(&mut self, tsproj: &Path) -> Result<PathBuf> {
        let key = tsproj.to_path_buf();
        if let Some(cached) = self.packages.get(&key) {
            return Ok(cached);
        }

        let content = self
            .fs
            .read_to_string(tsproj)
            .map_err(|e| JobError::io(tsproj, e))?;
        let doc = parse_document(tsproj, &content)?;

        let plc_project = walk(doc.root_element(), &["Project", "Plc", "Project"])
            .ok_or_else(|| {
                JobError::NotFound(format!("Project/Plc/Project node in {}", tsproj.display()))
            })?;

        let base = parent_dir(tsproj);
        let plcproj = if let Some(file) = plc_project.attribute("File") {
            let mut xti = base.to_path_buf();
            xti.extend(XTI_FOLDER);
            let xti = resolve_reference(&xti, file);
            debug!("PLC project stored in {}", xti.display());
            self.package_from_xti(&xti)?
        } else if let Some(path) = plc_project.attribute("PrjFilePath") {
            resolve_reference(base, path)
        } else {
            return Err(JobError::NotFound(format!(
                "File or PrjFilePath attribute on the PLC project in {}",
                tsproj.display()
            )));
        };

        debug!("Found plcproj {}", plcproj.display());
        self.packages.insert(key, plcproj.clone());
        Ok(plcproj)
    }

    /// Solution to `.plcproj` in one call.
    pub fn find_package_for_solution(&mut self, solution: &Path) -> Result<PathBuf> {
        let tsproj = self.find_sub_project(solution)?;
        self.find_package(&tsproj)
    }

    /// The `PrjFilePath` inside an `.xti` is relative to the `.xti` itself.
    fn package_from_xti(&self, xti: &Path) -> Result<PathBuf> {
        if !self.fs.is_file(xti) {
            return Err(JobError::NotFound(format!("xti file {}", xti.display())));
        }

        let content = self
            .fs
            .read_to_string(xti)
            .map_err(|e| JobError::io(xti, e))?;
        let doc = parse_document(xti, &content)?;

        walk(doc.root_element(), &["Project"])
            .and_then(|project| project.attribute("PrjFilePath"))
            .map(|reference| resolve_reference(parent_dir(xti), reference))
            .ok_or_else(|| {
                JobError::NotFound(format!("Project PrjFilePath in {}", xti.display()))
            })
    }
}

fn walk<'a, 'input>(
    root: roxmltree::Node<'a, 'input>,
    path: &[&str],
) -> Option<roxmltree::Node<'a, 'input>> {
    path.iter()
        .try_fold(root, |node, key| child_element(node, key))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Joins a descriptor reference (which uses Windows separators) onto `base`.
pub fn resolve_reference(base: &Path, reference: &str) -> PathBuf {
    let normalized = reference.replace('\\', "/");
    normalize_path(&base.join(normalized))
}

/// Lexically removes `.` and `..` components without touching the disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(result.components().next_back(), Some(Component::Normal(_)))
                    && result.pop();
                if !popped && !result.has_root() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}
