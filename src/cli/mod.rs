pub mod commands;

pub use commands::{JobArgs, TranscribeArgs};
