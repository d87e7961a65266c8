//! Command-line interface components.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ppp_processor")]
#[command(about = "Batch-run a PPP solver over daily GNSS archives into an ENU time series")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to the YAML run configuration
    #[arg(value_name = "CONFIG", default_value = "config.yml")]
    pub config: PathBuf,

    /// Re-run the solver even when a day's output file already exists
    #[arg(long)]
    pub update: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
