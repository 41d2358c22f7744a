// stylepipe-core/src/engine.rs
//! Defines the `StylesheetStage` trait and the data passed between stages.
//!
//! A build runs each source file through an ordered list of stages
//! (preprocess, cleanup, prefix). Every stage receives the text produced by
//! the previous one, so stages can be swapped or left out per target.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// What a stage sees of the file being built.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    /// Current stylesheet text.
    pub content: &'a str,
    /// Path of the original source file on disk.
    pub source_path: &'a Path,
    /// Stable identifier used in logs and source maps (project-relative path).
    pub source_id: &'a str,
}

impl<'a> StageInput<'a> {
    pub fn with_content(self, content: &'a str) -> Self {
        Self { content, ..self }
    }
}

/// Result of a single stage.
#[derive(Debug, Default, Clone)]
pub struct StageOutput {
    pub content: String,
    /// Serialized source map, when the stage produced one.
    pub source_map: Option<String>,
    /// Per-rule counts for stages that rewrite text.
    pub summary: Vec<CleanupSummaryItem>,
}

impl StageOutput {
    pub fn text(content: String) -> Self {
        Self { content, ..Self::default() }
    }
}

/// How often a cleanup rule fired on one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupSummaryItem {
    pub rule_name: String,
    pub occurrences: usize,
}

/// A trait that defines one step of the stylesheet pipeline.
///
/// Implementations must be usable from several build targets at once.
pub trait StylesheetStage: Send + Sync {
    /// Short name used in logs, e.g. "preprocess".
    fn name(&self) -> &'static str;

    /// Transforms `input.content`, returning the new text and any side products.
    fn run(&self, input: StageInput<'_>) -> Result<StageOutput>;
}
