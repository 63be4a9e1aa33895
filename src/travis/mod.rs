//! Travis CI configuration transcriber
//!
//! Reads the `jobs` section of a legacy `.travis.yml` and prints each
//! included job's lifecycle scripts as a readable shell transcript, which is
//! the first step when porting a job to another CI system.

pub mod model;
pub mod transcript;

pub use model::{EnvSpec, Job, Jobs, LifecycleStage, Script};
pub use transcript::{load, render, transcribe, transcribe_file, TranscribeError};
