use tcci::cli::JobArgs;
use tcci::fs::RealFileSystem;
use tcci::tcbuild::{run_job, SystemExecutor};
use tcci::{init_logging, JobConfig, LoggingConfig, VERSION};

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::process;
use tracing::{debug, error};

fn main() {
    let args = JobArgs::parse();
    init_logging(LoggingConfig::from_args(args.log_level.as_deref(), args.debug));

    debug!("tcbuild-job v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn run(args: &JobArgs) -> Result<i32> {
    let config = JobConfig::from_env().context("Invalid tcci environment configuration")?;
    debug!("{}", config);

    let cwd = env::current_dir().context("Failed to determine the current directory")?;
    let options = args.to_options(cwd);

    let code = run_job(&options, &config, &RealFileSystem::new(), &SystemExecutor)
        .with_context(|| format!("TcBuild job in {} failed", options.working_dir.display()))?;
    Ok(code)
}
