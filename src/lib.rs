//! tcci - CI helpers for TwinCAT repositories
//!
//! Two independent tools share this crate:
//!
//! - [`tcbuild`]: the Jenkins job driver. It inspects the `.sln`, `.tsproj`
//!   and `.plcproj` descriptors of a TwinCAT repository to decide whether to
//!   run static analysis, unit tests and library packaging, then invokes
//!   `TcBuild` with the matching flags (binary: `tcbuild-job`).
//! - [`travis`]: turns the `jobs` section of a legacy `.travis.yml` into a
//!   commented shell transcript (binary: `ci-transcribe`).
//!
//! # Example
//!
//! ```no_run
//! use tcci::fs::RealFileSystem;
//! use tcci::tcbuild::{plan_job, BuildFlags, JobOptions};
//! use tcci::JobConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = JobOptions {
//!     working_dir: std::env::current_dir()?,
//!     flags: BuildFlags { skip_tests: true, ..BuildFlags::default() },
//!     ..JobOptions::default()
//! };
//! let plan = plan_job(&options, &JobConfig::from_env()?, &RealFileSystem::new())?;
//! println!("{}", plan.command_line());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod fs;
pub mod tcbuild;
pub mod travis;
pub mod util;

pub use config::{ConfigError, JobConfig};
pub use tcbuild::{JobError, JobOptions};
pub use travis::TranscribeError;
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_tcci() {
        assert_eq!(NAME, "tcci");
    }
}
