// src/core/signature_cache.rs

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::core::error::CacheError;
use crate::logging::get_data_dir;

/// Where the published catalog is fetched from.
pub const DEFAULT_SIGNATURES_URL: &str =
    "https://raw.githubusercontent.com/Elite-Security-Systems/radar/refs/heads/main/data/signatures.json";

/// Path the CLI treats as "use the cached catalog".
pub const DEFAULT_SIGNATURES_PATH: &str = "data/signatures.json";

/// A cached catalog older than this is downloaded again.
pub const MAX_CACHE_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Location of the cached catalog inside the application data directory.
pub fn default_cache_path() -> PathBuf {
    get_data_dir().join("signatures.json")
}

/// True when `path` is missing or was last written more than `max_age` ago.
pub fn is_stale(path: &Path, max_age: Duration) -> bool {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return true,
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|age| age > max_age)
        .unwrap_or(false)
}

/// Downloads the catalog at `url` into `path`, creating parent directories.
pub async fn download_signatures(url: &str, path: &Path) -> Result<(), CacheError> {
    info!(url, "Downloading signatures.");
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CacheError::Status(status.as_u16()));
    }
    let body = response.bytes().await?;

    let write_err = |source| CacheError::Write { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, &body).await.map_err(write_err)?;

    debug!(path = %path.display(), bytes = body.len(), "Signatures saved.");
    Ok(())
}

/// Returns `path`, refreshing it from `url` first if it is stale.
pub async fn get_or_download(url: &str, path: &Path, max_age: Duration) -> Result<PathBuf, CacheError> {
    if is_stale(path, max_age) {
        download_signatures(url, path).await?;
    } else {
        debug!(path = %path.display(), "Using cached signatures.");
    }
    Ok(path.to_path_buf())
}
