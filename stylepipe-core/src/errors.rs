//! errors.rs - Custom error types for the stylepipe-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use std::path::PathBuf;
use thiserror::Error;

/// This enum represents all possible error types in the `stylepipe-core` library.
///
/// New variants may be added in future versions, so consumers must not match
/// exhaustively.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("Failed to compile cleanup rule '{0}': {1}")]
    RuleCompilationError(String, String),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Invalid glob pattern '{0}': {1}")]
    InvalidGlob(String, glob::PatternError),

    #[error("Unknown build target '{0}'")]
    UnknownTarget(String),

    #[error("Invalid browser query {0:?}: {1}")]
    InvalidBrowsers(Vec<String>, String),

    #[error("Failed to preprocess '{}': {message}", path.display())]
    Preprocess { path: PathBuf, message: String },

    #[error("Failed to process CSS for '{source_id}': {message}")]
    Css { source_id: String, message: String },

    #[error("Failed to write source map for '{source_id}': {message}")]
    SourceMap { source_id: String, message: String },

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
