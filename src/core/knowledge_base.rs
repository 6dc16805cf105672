//! The signature catalog: the scanner's knowledge of which DNS evidence
//! points to which technology.
//!
//! Signatures are data, loaded from a JSON file so they can be updated
//! without a rebuild. Patterns are compiled once per load; a pattern that
//! fails to compile is dropped with a warning and the rest of its signature
//! still applies.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::core::error::SignatureError;
use crate::core::models::{Signature, SignatureFile};

/// Record type entry that makes a signature apply to every type.
pub const WILDCARD_TYPE: &str = "*";

/// Shared install locations searched when a relative path is not found.
const INSTALL_DIRS: &[&str] = &["/usr/share/dns-radar", "/usr/local/share/dns-radar", "/opt/dns-radar"];

/// An ordered, validated list of signatures.
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    signatures: Vec<Signature>,
}

impl SignatureCatalog {
    /// Builds a catalog from already-parsed signatures.
    ///
    /// Fails with [`SignatureError::Empty`] when there are none.
    pub fn new(signatures: Vec<Signature>) -> Result<Self, SignatureError> {
        if signatures.is_empty() {
            return Err(SignatureError::Empty);
        }
        Ok(Self { signatures })
    }

    /// Parses a catalog from its JSON form (`{"signatures": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self, SignatureError> {
        let file: SignatureFile = serde_json::from_str(json)?;
        Self::new(file.signatures)
    }

    /// Reads and parses the catalog at `path`.
    ///
    /// Relative paths that do not exist are also looked up next to the
    /// executable and in the usual install directories.
    pub fn load(path: &Path) -> Result<Self, SignatureError> {
        let resolved = find_signatures_file(path);
        let data = fs::read_to_string(&resolved).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SignatureError::NotFound(resolved.clone()),
            ErrorKind::PermissionDenied => SignatureError::PermissionDenied(resolved.clone()),
            _ => SignatureError::Io { path: resolved.clone(), source: e },
        })?;
        let catalog = Self::from_json_str(&data)?;
        debug!(path = %resolved.display(), signatures = catalog.len(), "Loaded signatures.");
        Ok(catalog)
    }

    #[cfg(test)]
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Compiles every pattern, skipping (and reporting) the malformed ones.
    pub fn compile(&self) -> CompiledCatalog {
        let signatures: Vec<_> = self.signatures.iter().map(CompiledSignature::new).collect();
        let patterns: usize = signatures.iter().map(CompiledSignature::pattern_count).sum();
        debug!(signatures = signatures.len(), patterns, "Compiled signature catalog.");
        CompiledCatalog { signatures }
    }
}

/// A signature with its patterns ready to run.
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    pub signature: Signature,
    patterns: Vec<Regex>,
}

impl CompiledSignature {
    fn new(signature: &Signature) -> Self {
        let patterns = signature
            .patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(signature = %signature.name, pattern = %pattern, error = %e, "Invalid regex pattern in signature, skipping.");
                    None
                }
            })
            .collect();
        Self { signature: signature.clone(), patterns }
    }

    /// Whether this signature inspects records of `record_type`.
    pub fn applies_to(&self, record_type: &str) -> bool {
        self.signature
            .record_types
            .iter()
            .any(|t| t == record_type || t == WILDCARD_TYPE)
    }

    /// Tests the patterns in order against `value`.
    ///
    /// Each pattern sees the raw value first and, only if that fails and the
    /// value ends with the root terminator, the value without it.
    pub fn matches(&self, value: &str) -> bool {
        let normalized = value.strip_suffix('.').unwrap_or(value);
        self.patterns
            .iter()
            .any(|re| re.is_match(value) || (normalized != value && re.is_match(normalized)))
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

/// A catalog with compiled patterns, in catalog order.
#[derive(Debug, Clone)]
pub struct CompiledCatalog {
    signatures: Vec<CompiledSignature>,
}

impl CompiledCatalog {
    pub fn signatures(&self) -> &[CompiledSignature] {
        &self.signatures
    }
}

/// Resolves `path` against the working directory, the executable's directory
/// and the install directories, in that order. Falls back to `path` itself so
/// the caller reports the original location.
pub fn find_signatures_file(path: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        return path.to_path_buf();
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let file_name = path.file_name().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf());

    exe_dir
        .map(|dir| dir.join(path))
        .into_iter()
        .chain(INSTALL_DIRS.iter().map(|dir| Path::new(dir).join(&file_name)))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"{
        "signatures": [
            {
                "name": "Linode",
                "category": "Hosting Provider",
                "description": "Linode cloud hosting",
                "website": "https://www.linode.com/",
                "recordTypes": ["NS"],
                "patterns": ["\\.linode\\.com\\."]
            },
            {
                "name": "Anything",
                "category": "Test",
                "description": "",
                "website": "",
                "recordTypes": ["*"],
                "patterns": ["(unclosed", "^ok$"]
            }
        ]
    }"#;

    #[test]
    fn parses_catalog_in_order() {
        let catalog = SignatureCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.signatures()[0].name, "Linode");
        assert_eq!(catalog.signatures()[0].record_types, vec!["NS"]);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = SignatureCatalog::from_json_str(r#"{"signatures": []}"#).unwrap_err();
        assert!(matches!(err, SignatureError::Empty));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SignatureCatalog::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, SignatureError::Parse(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = SignatureCatalog::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SignatureError::NotFound(_)));
    }

    #[test]
    fn loads_catalog_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        let catalog = SignatureCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn malformed_patterns_are_dropped_not_fatal() {
        let compiled = SignatureCatalog::from_json_str(CATALOG).unwrap().compile();
        let anything = &compiled.signatures()[1];
        assert_eq!(anything.pattern_count(), 1);
        assert!(anything.matches("ok"));
    }

    #[test]
    fn wildcard_applies_to_every_type() {
        let compiled = SignatureCatalog::from_json_str(CATALOG).unwrap().compile();
        assert!(compiled.signatures()[1].applies_to("HINFO"));
        assert!(compiled.signatures()[0].applies_to("NS"));
        assert!(!compiled.signatures()[0].applies_to("A"));
    }

    #[test]
    fn stripped_value_is_tried_after_raw_value() {
        let compiled = SignatureCatalog::new(vec![Signature {
            name: "Anchored".into(),
            category: "Test".into(),
            description: String::new(),
            website: String::new(),
            record_types: vec!["CNAME".into()],
            patterns: vec![r"\.example\.net$".into()],
        }])
        .unwrap()
        .compile();
        let signature = &compiled.signatures()[0];
        assert!(signature.matches("edge.example.net."));
        assert!(signature.matches("edge.example.net"));
        assert!(!signature.matches("edge.example.org."));
    }
}
