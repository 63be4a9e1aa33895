//! TcBuild job driver
//!
//! Decides which optional TcBuild steps a TwinCAT repository supports and
//! runs the build tool accordingly:
//!
//! 1. [`locator::ProjectLocator`] finds the `.sln`, `.tsproj` and `.plcproj`
//! 2. [`detector::CapabilityDetector`] answers the capability questions
//! 3. [`command::build_plan`] turns the answers into a command line
//! 4. [`runner::Runner`] executes it and optionally shares the library
//!
//! Every descriptor problem surfaces as a [`JobError`] before anything runs.

pub mod cache;
pub mod command;
pub mod detector;
pub mod error;
pub mod locator;
pub mod runner;
pub mod xml;

pub use command::{build_plan, split_passthrough, BuildFlags, BuildPlan};
pub use detector::{CapabilityAnswers, CapabilityDetector, LibraryIdentity, LibraryVersion};
pub use error::JobError;
pub use locator::ProjectLocator;
pub use runner::{CommandExecutor, Runner, SystemExecutor};

use crate::config::JobConfig;
use crate::fs::FileSystem;
use std::path::PathBuf;
use tracing::debug;

/// Everything a single job invocation needs besides configuration
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub working_dir: PathBuf,
    pub flags: BuildFlags,
    pub passthrough: Vec<String>,
    pub dry_run: bool,
}

/// Resolves descriptors and builds the plan without running anything.
pub fn plan_job(
    options: &JobOptions,
    config: &JobConfig,
    fs: &dyn FileSystem,
) -> error::Result<BuildPlan> {
    let mut locator = ProjectLocator::new(fs, &options.working_dir);
    let solution = locator.find_top_level()?;

    let detector = CapabilityDetector::new(fs, &config.install_root);
    let answers = detector.detect(&mut locator, &solution, &options.flags)?;
    debug!("Capabilities: {:?}", answers);

    Ok(build_plan(
        &solution,
        &answers,
        &options.flags,
        &options.passthrough,
        config,
    ))
}

/// Plans and runs one job, returning the exit code to report.
pub fn run_job(
    options: &JobOptions,
    config: &JobConfig,
    fs: &dyn FileSystem,
    executor: &dyn CommandExecutor,
) -> error::Result<i32> {
    let plan = plan_job(options, config, fs)?;
    Runner::new(executor, &config.share_script).run(
        &plan,
        options.flags.skip_share,
        options.dry_run,
    )
}
