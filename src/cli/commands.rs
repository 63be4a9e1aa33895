use crate::tcbuild::{split_passthrough, BuildFlags, JobOptions};
use clap::Parser;
use std::path::PathBuf;

/// Run TcBuild with the steps a TwinCAT repository is set up for
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tcbuild-job",
    version,
    about = "Run TcBuild with the steps a TwinCAT repository is set up for",
    long_about = "Scans the repository root for a .sln file, follows it to the PLC project \
                  and decides which TcBuild steps apply: static analysis when \
                  static-analysis-rules.csa exists, unit tests when TcUnit is referenced, \
                  and library packaging (opt-in) when the project version is not installed yet.\n\n\
                  Examples:\n  \
                  tcbuild-job --dry-run\n  \
                  tcbuild-job --build-lib --skip-share\n  \
                  tcbuild-job --skip-tests --passthrough \"-c Release\""
)]
pub struct JobArgs {
    #[arg(long, help = "Do not run static analysis even if configured")]
    pub skip_static: bool,

    #[arg(long, help = "Do not activate the config and run unit tests")]
    pub skip_tests: bool,

    #[arg(long, help = "Build and install the library if its version is new")]
    pub build_lib: bool,

    #[arg(long, help = "Do not copy built libraries to the public folder")]
    pub skip_share: bool,

    #[arg(
        long,
        value_name = "ARGS",
        allow_hyphen_values = true,
        help = "Extra TcBuild arguments, split on whitespace"
    )]
    pub passthrough: Option<String>,

    #[arg(long, help = "Log the command and steps without running anything")]
    pub dry_run: bool,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        help = "Repository root to scan (defaults to current directory)"
    )]
    pub directory: Option<PathBuf>,
}

impl JobArgs {
    pub fn flags(&self) -> BuildFlags {
        BuildFlags {
            skip_static: self.skip_static,
            skip_tests: self.skip_tests,
            build_library: self.build_lib,
            skip_share: self.skip_share,
        }
    }

    /// `working_dir` is used when `--directory` is not given, and to anchor
    /// a relative `--directory`.
    pub fn to_options(&self, working_dir: PathBuf) -> JobOptions {
        let working_dir = match &self.directory {
            Some(dir) => working_dir.join(dir),
            None => working_dir,
        };

        JobOptions {
            working_dir,
            flags: self.flags(),
            passthrough: split_passthrough(self.passthrough.as_deref()),
            dry_run: self.dry_run,
        }
    }
}

/// Print the jobs of a Travis CI configuration as a shell transcript
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ci-transcribe",
    version,
    about = "Print the jobs of a Travis CI configuration as a shell transcript"
)]
pub struct TranscribeArgs {
    #[arg(value_name = "PATH", help = "Path to the .travis.yml file")]
    pub path: PathBuf,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,
}
