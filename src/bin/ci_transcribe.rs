use tcci::cli::TranscribeArgs;
use tcci::travis::transcribe_file;
use tcci::{init_logging, LoggingConfig, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, error};

fn main() {
    let args = TranscribeArgs::parse();
    init_logging(LoggingConfig::from_args(args.log_level.as_deref(), false));

    debug!("ci-transcribe v{} starting", VERSION);

    match transcribe_file(&args.path) {
        Ok(transcript) => {
            if !transcript.is_empty() {
                println!("{}", transcript);
            }
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
