// File: stylepipe-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for running stylepipe stages on strings, with no
//! file-system access and no build targets.

use anyhow::Result;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::engine::{StageInput, StylesheetStage};
use crate::engines::cleanup_engine::CleanupEngine;
use crate::engines::prefix_engine::{PrefixOptions, Prefixer};

/// Runs the configured cleanup rules over already-compiled CSS.
///
/// # Arguments
///
/// * `config` - The merged pipeline configuration; only `cleanup_rules` is used.
/// * `css` - Compiled stylesheet text.
/// * `source_id` - A stable identifier for the input, used in logs.
pub fn headless_process_string(config: &PipelineConfig, css: &str, source_id: &str) -> Result<String> {
    let engine = CleanupEngine::new(&config.cleanup_rules)?;
    let (cleaned, _) = engine.apply(css, source_id);
    Ok(cleaned)
}

/// Cleans and prefixes compiled CSS for the configured browsers, without a map.
pub fn headless_finish_string(config: &PipelineConfig, css: &str, source_id: &str) -> Result<String> {
    let cleaned = headless_process_string(config, css, source_id)?;
    let prefixer = Prefixer::new(&config.browsers, PrefixOptions::default())?;
    let output = prefixer.run(StageInput {
        content: &cleaned,
        source_path: Path::new(source_id),
        source_id,
    })?;
    Ok(output.content)
}
