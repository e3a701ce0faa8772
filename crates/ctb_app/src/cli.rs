use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ctb_logging::LogDestination;

use crate::config::CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(name = "ctb_app")]
#[command(about = "Upload a CTB Excel file to the supply chain agent and show its report")]
#[command(version)]
pub struct Cli {
    /// Workbook to upload once; starts the interactive prompt when omitted
    pub file: Option<PathBuf>,
    /// Override the backend endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Overall request timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Settings file (RON)
    #[arg(long, default_value = CONFIG_FILENAME)]
    pub config: PathBuf,
    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,
    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
