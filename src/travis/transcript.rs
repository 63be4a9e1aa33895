//! Renders Travis jobs as commented shell transcripts

use super::model::{Job, Jobs, LifecycleStage};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const SKIPPED_MARKER: &str = "# (Skipped)";
const ENV_DESCRIPTION: &str = "Environment settings:";

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid CI configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parses a Travis configuration and returns its `jobs` section.
///
/// A document without a `jobs` key is not an error: a warning is logged and
/// `None` is returned.
pub fn load(contents: &str) -> Result<Option<Jobs>, TranscribeError> {
    let document: Value = serde_yaml::from_str(contents)?;

    let Some(jobs) = document.get("jobs") else {
        warn!("No jobs section found in CI configuration");
        return Ok(None);
    };
    debug!("jobs section: {:?}", jobs);

    if jobs.is_null() {
        return Ok(Some(Jobs::default()));
    }

    Ok(Some(serde_yaml::from_value(jobs.clone())?))
}

/// One block per included job, separated by a blank line.
pub fn render(jobs: &Jobs) -> String {
    jobs.include
        .iter()
        .map(render_job)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_job(job: &Job) -> String {
    let mut lines = vec![format!("# Job: {} (stage: {})", job.name, job.stage)];

    let exports = job.env.to_exports();
    if !exports.is_empty() {
        push_section(&mut lines, ENV_DESCRIPTION);
        lines.extend(exports);
    }

    for stage in LifecycleStage::ORDER {
        let script = job.lifecycle(stage);
        if script.is_empty() {
            continue;
        }

        push_section(&mut lines, stage.description());
        if script.is_skip() {
            lines.push(SKIPPED_MARKER.to_string());
        } else {
            lines.extend(script.as_str().lines().map(str::to_string));
        }
    }

    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, description: &str) {
    lines.push(String::new());
    lines.push(format!("# {}", description));
}

/// `load` then `render`; empty output when there is no jobs section.
pub fn transcribe(contents: &str) -> Result<String, TranscribeError> {
    Ok(load(contents)?.map(|jobs| render(&jobs)).unwrap_or_default())
}

pub fn transcribe_file(path: &Path) -> Result<String, TranscribeError> {
    let contents = std::fs::read_to_string(path).map_err(|source| TranscribeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    transcribe(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAVIS: &str = r#"
language: python
os: linux
dist: xenial

env:
  global:
    - OFFICIAL_REPO="pcdshub/lcls-twincat-motion"

jobs:
  fast_finish: true
  allow_failures:
    - name: "Pre-commit Checks"
  include:
    - stage: test
      name: "Pre-commit Checks"
      python: 3.9
      env:
        - PRE_COMMIT: 1
      install:
        - pip install pre-commit
      script:
        - pre-commit run --all-files
    - stage: deploy
      name: "Documentation"
      script: skip
      after_failure: echo failed
      before_install: |
        git fetch --unshallow
        git fetch --tags
"#;

    #[test]
    fn test_transcribe_example() {
        let output = transcribe(TRAVIS).unwrap();

        let expected = "\
# Job: Pre-commit Checks (stage: test)

# Environment settings:
export PRE_COMMIT=\"1\"

# Install:
pip install pre-commit

# Script:
pre-commit run --all-files

# Job: Documentation (stage: deploy)

# Before install:
git fetch --unshallow
git fetch --tags

# Script:
# (Skipped)

# After failure:
echo failed";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_script_sequence_renders_lines() {
        let output = transcribe(
            "jobs:\n  include:\n    - name: a\n      script: [\"echo hi\", \"echo bye\"]\n",
        )
        .unwrap();
        assert_eq!(output, "# Job: a (stage: )\n\n# Script:\necho hi\necho bye");
    }

    #[test]
    fn test_deploy_provider_block_is_transcribed() {
        let output = transcribe(
            "jobs:\n  include:\n    - name: docs\n      deploy:\n        provider: pages\n        skip_cleanup: true\n",
        )
        .unwrap();
        assert_eq!(
            output,
            "# Job: docs (stage: )\n\n# Deploy:\nprovider: pages\nskip_cleanup: true"
        );
    }

    #[test]
    fn test_empty_job_renders_header_only() {
        let output =
            transcribe("jobs:\n  include:\n    - name: bare\n      stage: build\n").unwrap();
        assert_eq!(output, "# Job: bare (stage: build)");
    }

    #[test]
    fn test_missing_jobs_is_empty_not_error() {
        assert_eq!(transcribe("language: python\n").unwrap(), "");
        assert!(load("language: python\n").unwrap().is_none());
        assert!(load("- just\n- a list\n").unwrap().is_none());
    }

    #[test]
    fn test_null_jobs_section() {
        assert_eq!(load("jobs:\n").unwrap(), Some(Jobs::default()));
        assert_eq!(transcribe("jobs:\n").unwrap(), "");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = transcribe("jobs: [unterminated\n").unwrap_err();
        assert!(matches!(err, TranscribeError::Yaml(_)));
    }

    #[test]
    fn test_canonical_order_ignores_source_order() {
        let output = transcribe(
            "jobs:\n  include:\n    - name: x\n      after_success: c\n      script: b\n      install: a\n      before_install: z\n",
        )
        .unwrap();
        let sections: Vec<&str> = output.lines().filter(|l| l.starts_with("# ")).collect();
        assert_eq!(
            sections,
            vec![
                "# Job: x (stage: )",
                "# Before install:",
                "# Install:",
                "# Script:",
                "# After success:",
            ]
        );
    }

    #[test]
    fn test_exclude_and_flags_not_rendered() {
        let output = transcribe(
            "jobs:\n  include:\n    - name: kept\n  exclude:\n    - name: dropped\n      script: echo no\n  fast_finish: true\n",
        )
        .unwrap();
        assert_eq!(output, "# Job: kept (stage: )");
    }

    #[test]
    fn test_transcribe_file_missing() {
        let err = transcribe_file(Path::new("/nonexistent/.travis.yml")).unwrap_err();
        assert!(matches!(err, TranscribeError::Read { .. }));
    }
}
