// src/cli.rs

use std::path::PathBuf;

use clap::Parser;

use crate::core::config::{DEFAULT_MAX_RECORDS, DEFAULT_TIMEOUT};
use crate::core::signature_cache::DEFAULT_SIGNATURES_PATH;
use crate::logging::Verbosity;

#[derive(Parser, Debug)]
#[command(name = "dns-radar")]
#[command(version, about = "Recognition and DNS analysis for resource detection.")]
pub struct CommandLine {
    /// Domain name to analyze
    #[arg(long)]
    pub domain: Option<String>,

    /// File containing domains to analyze, one per line
    #[arg(short = 'l', value_name = "FILE")]
    pub target_list: Option<PathBuf>,

    /// Path to the signatures file
    #[arg(long, default_value = DEFAULT_SIGNATURES_PATH)]
    pub signatures: PathBuf,

    /// Include every collected record in the JSON output
    #[arg(long)]
    pub all_records: bool,

    /// Overall timeout per domain, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Maximum number of records to collect per domain
    #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
    pub max_records: usize,

    /// Download the latest signatures before running
    #[arg(long)]
    pub update_signatures: bool,

    /// Suppress all non-error output
    #[arg(long)]
    pub silent: bool,

    /// Output file (.json) or directory for results
    #[arg(short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Show progress when processing multiple domains
    #[arg(long)]
    pub verbose: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Silent overrides everything else; debug overrides verbose.
    pub fn verbosity(&self) -> Verbosity {
        if self.silent {
            Verbosity::Silent
        } else if self.debug {
            Verbosity::Debug
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}
