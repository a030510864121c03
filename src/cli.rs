use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "observer", about = "Watch your screen and keep a labeled activity history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Observe the focused window on a fixed cadence
    Run {
        /// Capture interval in seconds
        #[arg(long, default_value = "1")]
        interval: u64,
        /// Data directory path
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
    /// Show recent activity history
    History {
        /// Minutes of history to show
        #[arg(long, default_value = "60")]
        minutes: i64,
        /// Data directory path
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}
