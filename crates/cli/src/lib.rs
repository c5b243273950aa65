//! tripstack - synthesize and inspect the trips service infrastructure.

pub mod assets;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod prelude;

pub use config::Config;
pub use error::{CliError, Result};
