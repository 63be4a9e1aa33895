//! Capability detection: which optional TcBuild steps apply to a project

use super::command::BuildFlags;
use super::error::{JobError, Result};
use super::locator::ProjectLocator;
use super::xml::{child_element, child_text, is_element, parse_document};
use crate::fs::FileSystem;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rule file that enables static analysis when it sits next to the solution.
pub const STATIC_ANALYSIS_RULES: &str = "static-analysis-rules.csa";

/// Library namespace that marks a project as having unit tests.
pub const UNIT_TEST_NAMESPACE: &str = "TcUnit";

const REFERENCE_TAGS: [&str; 2] = ["LibraryReference", "PlaceholderReference"];

/// Answers to the three capability questions for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityAnswers {
    pub has_static_analysis: bool,
    pub has_unit_tests: bool,
    pub builds_library: bool,
}

/// `major.minor.patch` as written in `ProjectVersion`.
///
/// Components are signed so that odd versions such as `-1.0.0` parse and
/// compare below `0.0.0` instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LibraryVersion {
    pub major: i64,
    pub minor: i64,
    pub patch: i64,
}

impl LibraryVersion {
    pub const DEV: LibraryVersion = LibraryVersion {
        major: 0,
        minor: 0,
        patch: 0,
    };

    pub fn parse(text: &str) -> Result<Self> {
        let parts = text
            .trim()
            .split('.')
            .map(|part| part.trim().parse::<i64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| JobError::Config(format!("Invalid version {:?}: {}", text, e)))?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(JobError::Config(format!(
                "Invalid version. Expected 3 numbers, got {:?}",
                text
            ))),
        }
    }

    /// Versions at or below `0.0.0` are development builds.
    pub fn is_release(&self) -> bool {
        *self > Self::DEV
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryIdentity {
    pub title: String,
    pub company: String,
    pub version: LibraryVersion,
    /// `ProjectVersion` exactly as written; TwinCAT names the install folder after it.
    pub version_text: String,
}

impl LibraryIdentity {
    /// `<install_root>/<company>/<title>/<version>`
    pub fn install_path(&self, install_root: &Path) -> PathBuf {
        install_root
            .join(&self.company)
            .join(&self.title)
            .join(&self.version_text)
    }
}

pub struct CapabilityDetector<'fs> {
    fs: &'fs dyn FileSystem,
    install_root: PathBuf,
}

impl<'fs> CapabilityDetector<'fs> {
    pub fn new(fs: &'fs dyn FileSystem, install_root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            install_root: install_root.into(),
        }
    }

    pub fn has_static_analysis(&self, solution: &Path) -> bool {
        let rules = solution
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(STATIC_ANALYSIS_RULES);
        let found = self.fs.exists(&rules);
        debug!("Static analysis rules {}: {}", rules.display(), found);
        found
    }

    /// True if any library or placeholder reference has the TcUnit namespace.
    pub fn has_unit_tests(&self, plcproj: &Path) -> Result<bool> {
        let content = self
            .fs
            .read_to_string(plcproj)
            .map_err(|e| JobError::io(plcproj, e))?;
        let doc = parse_document(plcproj, &content)?;

        let found = doc
            .descendants()
            .filter(|node| REFERENCE_TAGS.iter().any(|tag| is_element(*node, tag)))
            .any(|node| child_text(node, "Namespace") == Some(UNIT_TEST_NAMESPACE));

        if found {
            debug!("Found {} reference in {}", UNIT_TEST_NAMESPACE, plcproj.display());
        } else {
            debug!("Found no references to {} in {}", UNIT_TEST_NAMESPACE, plcproj.display());
        }
        Ok(found)
    }

    /// Reads `Title`, `Company` and `ProjectVersion` from the first top-level
    /// `PropertyGroup` that carries all three.
    pub fn library_identity(&self, plcproj: &Path) -> Result<LibraryIdentity> {
        let content = self
            .fs
            .read_to_string(plcproj)
            .map_err(|e| JobError::io(plcproj, e))?;
        let doc = parse_document(plcproj, &content)?;

        let properties = doc
            .root_element()
            .children()
            .filter(|node| is_element(*node, "PropertyGroup"))
            .find_map(|group| {
                match (
                    child_text(group, "Title"),
                    child_text(group, "Company"),
                    child_text(group, "ProjectVersion"),
                ) {
                    (Some(title), Some(company), Some(version)) => {
                        Some((title.to_string(), company.to_string(), version.to_string()))
                    }
                    _ => None,
                }
            });

        let Some((title, company, version_text)) = properties else {
            return Err(JobError::Config(format!(
                "Did not find Title, Company and ProjectVersion in {}",
                plcproj.display()
            )));
        };

        Ok(LibraryIdentity {
            title,
            company,
            version: LibraryVersion::parse(&version_text)?,
            version_text,
        })
    }

    /// True if the project declares a release version that is not installed yet.
    pub fn should_build_library(&self, plcproj: &Path) -> Result<bool> {
        let identity = self.library_identity(plcproj)?;

        if !identity.version.is_release() {
            debug!("Found dev or invalid version {}", identity.version_text);
            return Ok(false);
        }

        let install_path = identity.install_path(&self.install_root);
        debug!("Checking path {}", install_path.display());
        Ok(!self.fs.is_dir(&install_path))
    }

    /// Evaluates only the questions whose step is enabled, so a skipped step
    /// never reads the descriptors it would need.
    pub fn detect(
        &self,
        locator: &mut ProjectLocator<'_>,
        solution: &Path,
        flags: &BuildFlags,
    ) -> Result<CapabilityAnswers> {
        let mut answers = CapabilityAnswers::default();

        if !flags.skip_static {
            answers.has_static_analysis = self.has_static_analysis(solution);
        }

        if !flags.skip_tests {
            let plcproj = locator.find_package_for_solution(solution)?;
            answers.has_unit_tests = self.has_unit_tests(&plcproj)?;
        }

        if flags.build_library {
            let plcproj = locator.find_package_for_solution(solution)?;
            answers.builds_library = self.should_build_library(&plcproj)?;
        }

        Ok(answers)
    }
}
