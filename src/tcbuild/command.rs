//! TcBuild command construction
//!
//! `build_plan` is a pure function of its inputs: the capability answers are
//! computed beforehand, so the same inputs always give the same plan.

use super::detector::CapabilityAnswers;
use crate::config::JobConfig;
use std::path::Path;

pub const STEP_STATIC_ANALYSIS: &str = "run static analysis";
pub const STEP_BUILD: &str = "build the project";
pub const STEP_ACTIVATE: &str = "activate config";
pub const STEP_TESTS: &str = "run tests";
pub const STEP_LIBRARY: &str = "build library";
pub const STEP_SHARE: &str = "copy libraries to public folder";

/// Caller-supplied switches from the job definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildFlags {
    pub skip_static: bool,
    pub skip_tests: bool,
    pub build_library: bool,
    pub skip_share: bool,
}

/// The command line to run plus the steps it is expected to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub command: Vec<String>,
    pub steps: Vec<String>,
    pub produces_library: bool,
}

impl BuildPlan {
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    /// Space-joined command for logging; empty arguments show as `""`.
    pub fn command_line(&self) -> String {
        self.command
            .iter()
            .map(|arg| if arg.is_empty() { "\"\"" } else { arg.as_str() })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Steps as a bullet list, one `\n- step` per entry.
    pub fn describe_steps(&self) -> String {
        self.steps.iter().map(|step| format!("\n- {}", step)).collect()
    }
}

pub fn build_plan(
    solution: &Path,
    answers: &CapabilityAnswers,
    flags: &BuildFlags,
    passthrough: &[String],
    config: &JobConfig,
) -> BuildPlan {
    let mut command = vec![
        config.build_tool.clone(),
        "-v".to_string(),
        solution.display().to_string(),
        "-u".to_string(),
        config.timeout_minutes.to_string(),
    ];
    let mut steps = vec![STEP_BUILD.to_string()];
    let mut produces_library = false;

    if !flags.skip_static && answers.has_static_analysis {
        command.push("-s".to_string());
        steps.insert(0, STEP_STATIC_ANALYSIS.to_string());
    }

    if !flags.skip_tests && answers.has_unit_tests {
        // Tests need the configuration activated on a target PLC.
        command.extend([
            "-r".to_string(),
            "-a".to_string(),
            config.target_address.clone(),
            "-l".to_string(),
            config.target_label.clone(),
        ]);
        steps.extend([STEP_ACTIVATE.to_string(), STEP_TESTS.to_string()]);
    }

    if flags.build_library && answers.builds_library {
        command.extend(["-f".to_string(), String::new()]);
        steps.push(STEP_LIBRARY.to_string());
        produces_library = true;
        if !flags.skip_share {
            steps.push(STEP_SHARE.to_string());
        }
    }

    command.extend(passthrough.iter().cloned());

    BuildPlan {
        command,
        steps,
        produces_library,
    }
}

/// Splits the `--passthrough` string on whitespace.
pub fn split_passthrough(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
