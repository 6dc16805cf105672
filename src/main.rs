// src/main.rs

use color_eyre::eyre::{Result, WrapErr, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod app;
mod cli;
mod core;
mod logging;
mod output;

use app::{App, read_target_list};
use cli::CommandLine;
use crate::core::knowledge_base::SignatureCatalog;
use crate::core::signature_cache::{
    DEFAULT_SIGNATURES_PATH, DEFAULT_SIGNATURES_URL, MAX_CACHE_AGE, default_cache_path, download_signatures,
    get_or_download,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = CommandLine::parse_args();
    logging::initialize_logging(cli.verbosity())?;

    if cli.update_signatures {
        let cache = default_cache_path();
        info!(path = %cache.display(), "Updating signatures.");
        download_signatures(DEFAULT_SIGNATURES_URL, &cache)
            .await
            .wrap_err("error updating signatures")?;
        info!(path = %cache.display(), "Signatures updated.");

        if cli.domain.is_none() && cli.target_list.is_none() {
            return Ok(());
        }
    }

    if cli.domain.is_none() && cli.target_list.is_none() {
        bail!("please provide a domain name with --domain or a target list with -l");
    }
    if cli.domain.is_some() && cli.target_list.is_some() {
        warn!("Both domain and target list provided. Using target list and ignoring single domain.");
    }

    let catalog = load_signatures(&cli.signatures).await?;
    debug!(signatures = catalog.len(), path = %cli.signatures.display(), "Loaded signatures.");

    let app = App::new(&cli, catalog.compile());
    app.prepare_output()?;

    match (&cli.target_list, &cli.domain) {
        (Some(list), _) => {
            let domains = read_target_list(list)?;
            app.run_list(&domains).await
        }
        (None, Some(domain)) => app.run_single(domain).await,
        (None, None) => Ok(()),
    }
}

/// Loads the catalog. The default path prefers the downloaded cache and
/// falls back to the local file when the download fails.
async fn load_signatures(path: &Path) -> Result<SignatureCatalog> {
    let mut resolved = PathBuf::from(path);
    if path == Path::new(DEFAULT_SIGNATURES_PATH) {
        match get_or_download(DEFAULT_SIGNATURES_URL, &default_cache_path(), MAX_CACHE_AGE).await {
            Ok(cached) => resolved = cached,
            Err(e) => warn!(error = %e, "Could not refresh signatures, using local file."),
        }
    }
    SignatureCatalog::load(&resolved)
        .wrap_err_with(|| format!("error loading signatures from {}", resolved.display()))
}
