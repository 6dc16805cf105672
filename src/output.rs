// src/output.rs

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;

use crate::core::models::AnalysisResult;

/// Where results go, decided once from the `-o` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Print each result to stdout.
    Stdout,
    /// Write everything into one JSON file.
    File(PathBuf),
    /// Write one timestamped JSON file per domain into a directory.
    Directory(PathBuf),
}

impl OutputTarget {
    /// A path ending in `.json` is a file; anything else is a directory.
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            None => OutputTarget::Stdout,
            Some(p) if is_json_file(p) => OutputTarget::File(p.to_path_buf()),
            Some(p) => OutputTarget::Directory(p.to_path_buf()),
        }
    }

    /// Creates the directory (or the file's parent) up front.
    pub fn prepare(&self) -> Result<()> {
        let dir = match self {
            OutputTarget::Stdout => return Ok(()),
            OutputTarget::Directory(dir) => dir.as_path(),
            OutputTarget::File(file) => match file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => return Ok(()),
            },
        };
        fs::create_dir_all(dir).wrap_err_with(|| format!("error creating output directory {}", dir.display()))
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Several domains written to a single `.json` file.
#[derive(Debug, Serialize)]
pub struct CombinedResults<'a> {
    pub timestamp: String,
    pub count: usize,
    pub results: &'a [AnalysisResult],
}

impl<'a> CombinedResults<'a> {
    pub fn new(results: &'a [AnalysisResult], now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339(),
            count: results.len(),
            results,
        }
    }
}

/// Pretty-printed JSON with two-space indentation.
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).wrap_err("error generating JSON output")
}

/// Writes `content` to `path`, creating parent directories as needed.
pub fn save_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).wrap_err_with(|| format!("error creating directory {}", dir.display()))?;
    }
    fs::write(path, content).wrap_err_with(|| format!("error writing to file {}", path.display()))
}

/// `<dir>/<domain>_<YYYYMMDD-HHMMSS>.json`
pub fn result_file_path(dir: &Path, domain: &str, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_{}.json", domain, now.format("%Y%m%d-%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(domain: &str) -> AnalysisResult {
        AnalysisResult {
            domain: domain.to_string(),
            detected_technologies: Vec::new(),
            all_records: None,
        }
    }

    #[test]
    fn classifies_output_argument() {
        assert_eq!(OutputTarget::from_arg(None), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_arg(Some(Path::new("out/Results.JSON"))),
            OutputTarget::File(PathBuf::from("out/Results.JSON"))
        );
        assert_eq!(
            OutputTarget::from_arg(Some(Path::new("out"))),
            OutputTarget::Directory(PathBuf::from("out"))
        );
    }

    #[test]
    fn names_result_files_by_domain_and_time() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let path = result_file_path(Path::new("results"), "example.com", now);
        assert_eq!(path, PathBuf::from("results/example.com_20240309-140507.json"));
    }

    #[test]
    fn combined_results_carry_count_and_timestamp() {
        let results = vec![result("a.com"), result("b.com")];
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let json: serde_json::Value = serde_json::from_str(&format_json(&CombinedResults::new(&results, now)).unwrap()).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["timestamp"], "2024-01-02T03:04:05+00:00");
        assert_eq!(json["results"][1]["domain"], "b.com");
    }

    #[test]
    fn saves_into_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.json");
        save_to_file("{}", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn prepare_creates_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::Directory(dir.path().join("runs"));
        target.prepare().unwrap();
        assert!(dir.path().join("runs").is_dir());
    }
}
