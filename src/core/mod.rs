// src/core/mod.rs

// The `core` module holds everything that is not command-line plumbing:
// data models, the scanning engine and the signature knowledge base.

/// Data structures shared across the crate, such as `ResolvedRecord`,
/// `Signature` and `AnalysisResult`.
pub mod models;

/// Default timeouts and budgets, and the configuration structs built from them.
pub mod config;

/// Error types for fatal setup failures and non-fatal query failures.
pub mod error;

/// Record collection across resolvers and technology matching.
pub mod scanner;

/// Loading, validating and compiling the signature catalog.
pub mod knowledge_base;

/// Cached download of the signature catalog.
pub mod signature_cache;
