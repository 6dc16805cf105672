// src/app.rs

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{Local, Utc};
use color_eyre::eyre::{Result, WrapErr};
use tracing::{error, info, warn};
use url::Url;

use crate::cli::CommandLine;
use crate::core::config::AnalyzerConfig;
use crate::core::knowledge_base::CompiledCatalog;
use crate::core::models::AnalysisResult;
use crate::core::scanner::analyze_domain_default;
use crate::output::{CombinedResults, OutputTarget, format_json, result_file_path, save_to_file};

/// Reads domains from a list file: one per line, blank lines and `#` comments skipped.
pub fn read_target_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("error opening target list file {}", path.display()))?;
    Ok(parse_target_list(&content))
}

pub fn parse_target_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Accepts bare domains as well as URLs and returns the host part.
pub fn normalize_target(raw: &str) -> String {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(String::from))
        .unwrap_or_else(|| raw.to_string())
}

/// Runs analyses for one or more domains and routes the JSON output.
pub struct App {
    catalog: CompiledCatalog,
    output: OutputTarget,
    timeout: Duration,
    max_records: usize,
    include_records: bool,
    debug: bool,
    silent: bool,
    verbose: bool,
}

impl App {
    pub fn new(cli: &CommandLine, catalog: CompiledCatalog) -> Self {
        Self {
            catalog,
            output: OutputTarget::from_arg(cli.output.as_deref()),
            timeout: Duration::from_secs(cli.timeout),
            max_records: cli.max_records,
            include_records: cli.all_records,
            debug: cli.debug && !cli.silent,
            silent: cli.silent,
            verbose: cli.verbose && !cli.silent,
        }
    }

    pub fn prepare_output(&self) -> Result<()> {
        self.output.prepare()
    }

    fn config_for(&self, domain: &str) -> AnalyzerConfig {
        AnalyzerConfig {
            timeout: self.timeout,
            max_records: self.max_records,
            debug: self.debug,
            include_records: self.include_records,
            ..AnalyzerConfig::new(&normalize_target(domain))
        }
    }

    async fn analyze(&self, domain: &str) -> Option<AnalysisResult> {
        match analyze_domain_default(&self.config_for(domain), &self.catalog).await {
            Ok(result) => Some(result),
            Err(e) => {
                error!(domain, error = %e, "Error analyzing domain.");
                None
            }
        }
    }

    /// Analyzes one domain. Analysis failures are reported, not returned.
    pub async fn run_single(&self, domain: &str) -> Result<()> {
        if let Some(result) = self.analyze(domain).await {
            self.emit(&result)?;
        }
        Ok(())
    }

    /// Analyzes every domain in `domains`, continuing past per-domain failures.
    pub async fn run_list(&self, domains: &[String]) -> Result<()> {
        let total = domains.len();
        let mut combined = Vec::new();

        for (index, domain) in domains.iter().enumerate() {
            if self.verbose {
                info!(domain = %domain, "Processing domain {}/{}.", index + 1, total);
            }
            let Some(result) = self.analyze(domain).await else {
                continue;
            };
            if matches!(self.output, OutputTarget::File(_)) {
                combined.push(result);
            } else if let Err(e) = self.emit(&result) {
                error!(domain = %domain, error = %e, "Error writing result.");
            }
        }

        if let OutputTarget::File(path) = &self.output {
            if combined.is_empty() {
                warn!("No results to write.");
                return Ok(());
            }
            let json = format_json(&CombinedResults::new(&combined, Utc::now()))?;
            save_to_file(&json, path).wrap_err("error saving combined output")?;
            if self.verbose {
                info!(count = combined.len(), path = %path.display(), "Combined results saved.");
            }
        }
        Ok(())
    }

    fn emit(&self, result: &AnalysisResult) -> Result<()> {
        let json = format_json(result)?;
        let path = match &self.output {
            OutputTarget::Stdout => {
                if !self.silent {
                    println!("{json}");
                }
                return Ok(());
            }
            OutputTarget::File(path) => path.clone(),
            OutputTarget::Directory(dir) => result_file_path(dir, &result.domain, Local::now()),
        };
        save_to_file(&json, &path)?;
        if self.verbose {
            info!(domain = %result.domain, path = %path.display(), "Results saved.");
        }
        Ok(())
    }
}
