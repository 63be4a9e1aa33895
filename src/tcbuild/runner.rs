//! Runs a build plan and the optional library share step

use super::command::BuildPlan;
use super::error::{JobError, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

/// Exit code reported when a child process ends without one (killed by a signal).
pub const SIGNALLED_EXIT_CODE: i32 = 1;

/// Process execution seam so the runner can be tested without spawning.
pub trait CommandExecutor {
    /// Runs `program` with `args`, blocking until it exits. Returns the exit code.
    fn execute(&self, program: &str, args: &[String]) -> Result<i32>;
}

/// Spawns real child processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, program: &str, args: &[String]) -> Result<i32> {
        debug!("Spawning {} {:?}", program, args);
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| JobError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(status.code().unwrap_or_else(|| {
            warn!("{} terminated without an exit code", program);
            SIGNALLED_EXIT_CODE
        }))
    }
}

pub struct Runner<'e> {
    executor: &'e dyn CommandExecutor,
    share_script: PathBuf,
}

impl<'e> Runner<'e> {
    pub fn new(executor: &'e dyn CommandExecutor, share_script: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            share_script: share_script.into(),
        }
    }

    /// Runs the plan and returns the exit code the job should report.
    ///
    /// After a successful library build the share script runs and its exit
    /// code replaces the build's, unless sharing is skipped.
    pub fn run(&self, plan: &BuildPlan, skip_share: bool, dry_run: bool) -> Result<i32> {
        info!("Command to run: {}", plan.command_line());
        info!("Expected steps: {}", plan.describe_steps());

        if dry_run {
            info!("Dry-run: exiting");
            return Ok(0);
        }

        let code = self.executor.execute(plan.program(), plan.args())?;
        info!("{} exited with code {}", plan.program(), code);

        if code == 0 && plan.produces_library && !skip_share {
            let script = self.share_script.display().to_string();
            info!("Sharing libraries with {}", script);
            return self.executor.execute(&script, &[]);
        }

        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records invocations and replays canned exit codes.
    struct RecordingExecutor {
        calls: RefCell<Vec<(String, Vec<String>)>>,
        codes: RefCell<VecDeque<i32>>,
    }

    impl RecordingExecutor {
        fn with_codes(codes: &[i32]) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                codes: RefCell::new(codes.iter().copied().collect()),
            }
        }

        fn programs(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(p, _)| p.clone()).collect()
        }
    }

    impl CommandExecutor for RecordingExecutor {
        fn execute(&self, program: &str, args: &[String]) -> Result<i32> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), args.to_vec()));
            Ok(self.codes.borrow_mut().pop_front().unwrap_or(0))
        }
    }

    fn plan(produces_library: bool) -> BuildPlan {
        BuildPlan {
            command: vec![
                "TcBuild".to_string(),
                "-v".to_string(),
                "Motion.sln".to_string(),
            ],
            steps: vec!["build the project".to_string()],
            produces_library,
        }
    }

    const SHARE: &str = "/opt/tcci/share_twincat_libs.bat";

    #[test]
    fn test_dry_run_executes_nothing() {
        let executor = RecordingExecutor::with_codes(&[3]);
        let runner = Runner::new(&executor, SHARE);

        assert_eq!(runner.run(&plan(true), false, true).unwrap(), 0);
        assert!(executor.programs().is_empty());
    }

    #[test]
    fn test_build_only() {
        let executor = RecordingExecutor::with_codes(&[0]);
        let runner = Runner::new(&executor, SHARE);

        assert_eq!(runner.run(&plan(false), false, false).unwrap(), 0);
        let calls = executor.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "TcBuild");
        assert_eq!(calls[0].1, vec!["-v", "Motion.sln"]);
    }

    #[test]
    fn test_library_build_runs_share_and_returns_its_code() {
        let executor = RecordingExecutor::with_codes(&[0, 4]);
        let runner = Runner::new(&executor, SHARE);

        assert_eq!(runner.run(&plan(true), false, false).unwrap(), 4);
        assert_eq!(executor.programs(), vec!["TcBuild", SHARE]);
    }

    #[test]
    fn test_failed_build_skips_share() {
        let executor = RecordingExecutor::with_codes(&[2]);
        let runner = Runner::new(&executor, SHARE);

        assert_eq!(runner.run(&plan(true), false, false).unwrap(), 2);
        assert_eq!(executor.programs(), vec!["TcBuild"]);
    }

    #[test]
    fn test_skip_share() {
        let executor = RecordingExecutor::with_codes(&[0]);
        let runner = Runner::new(&executor, SHARE);

        assert_eq!(runner.run(&plan(true), true, false).unwrap(), 0);
        assert_eq!(executor.programs(), vec!["TcBuild"]);
    }

    #[test]
    fn test_system_executor_missing_program() {
        let err = SystemExecutor
            .execute("tcci-definitely-not-installed", &[])
            .unwrap_err();
        assert!(matches!(err, JobError::Spawn { .. }));
    }
}
