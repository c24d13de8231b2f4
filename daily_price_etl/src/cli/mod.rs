pub mod commands;
pub mod logging;

pub use commands::{Cli, LogFormat};
