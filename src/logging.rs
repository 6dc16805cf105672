// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{self, EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "dns-radar", env!("CARGO_PKG_NAME"))
}

/// Application data directory; the signature cache lives here.
pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    fn default_directive(self) -> String {
        let level = match self {
            Verbosity::Silent => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        };
        format!("{}={level}", env!("CARGO_CRATE_NAME"))
    }
}

/// Initializes stderr logging using the tracing subscriber.
///
/// `RUST_LOG` wins over `DNS_RADAR_LOGLEVEL`, which wins over the level
/// implied by `verbosity`. Stdout stays reserved for JSON results.
pub fn initialize_logging(verbosity: Verbosity) -> Result<()> {
    let log_level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.clone()))
        .unwrap_or_else(|_| verbosity.default_directive());

    let stderr_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::new(format_description!("[hour]:[minute]:[second]")))
        .with_target(false)
        .with_filter(EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(stderr_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
