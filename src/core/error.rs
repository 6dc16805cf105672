// src/core/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors surfaced by [`analyze_domain`](crate::core::scanner::analyze_domain).
///
/// Everything else (query failures, timeouts, budget exhaustion, bad patterns)
/// degrades to a partial result instead of an error.
#[derive(Debug, Error)]
pub enum RadarError {
    #[error("invalid domain name: {0:?}")]
    InvalidDomain(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to set up resolver: {0}")]
    ResolverSetup(String),
}

/// Errors raised while loading a signature catalog.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signatures file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("permission denied when reading signatures file: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("failed to read signatures file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse signatures: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no valid signatures found")]
    Empty,
}

/// A single DNS exchange failed. Always non-fatal for the session.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("query timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("resolver error: {0}")]
    Resolve(String),
}

/// Errors from the signature download cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("error downloading signatures: {0}")]
    Http(#[from] reqwest::Error),
    #[error("error downloading signatures: HTTP {0}")]
    Status(u16),
    #[error("error writing signatures file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
