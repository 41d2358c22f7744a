// stylepipe-core/src/pipeline.rs
//! Per-target stage assembly and per-file compilation.
//!
//! A `TargetPipeline` owns the ordered stages for one target. Compiling a file
//! reads it, threads the text through every stage, and writes
//! `<dest>/<stem>.css` plus, when enabled, `<dest>/<stem>.css.map`.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, error, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{PipelineConfig, TargetConfig};
use crate::discovery::{relative_id, TargetPlan};
use crate::engine::{CleanupSummaryItem, StageInput, StylesheetStage};
use crate::engines::cleanup_engine::CleanupEngine;
use crate::engines::prefix_engine::{PrefixOptions, Prefixer};
use crate::engines::preprocess_engine::Preprocessor;

/// What was written for one source file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub css: PathBuf,
    pub source_map: Option<PathBuf>,
    pub bytes_written: usize,
    pub cleanup: Vec<CleanupSummaryItem>,
}

/// A source file that could not be built.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
    pub duration_ms: u128,
}

impl TargetReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub targets: Vec<TargetReport>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.targets.iter().all(TargetReport::is_success)
    }

    pub fn files_built(&self) -> usize {
        self.targets.iter().map(|t| t.outcomes.len()).sum()
    }

    pub fn files_failed(&self) -> usize {
        self.targets.iter().map(|t| t.failures.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize build report")
    }
}

/// The stages of one target, in execution order.
pub struct TargetPipeline {
    target: TargetConfig,
    stages: Vec<Box<dyn StylesheetStage>>,
}

impl std::fmt::Debug for TargetPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetPipeline")
            .field("target", &self.target.name)
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl TargetPipeline {
    /// Builds the stage list for `target`. Include paths are resolved against `root`.
    pub fn new(root: &Path, target: &TargetConfig, config: &PipelineConfig) -> Result<Self> {
        let include_paths = target.include_paths.iter().map(|p| root.join(p)).collect();
        let mut stages: Vec<Box<dyn StylesheetStage>> = vec![Box::new(Preprocessor::new(include_paths))];

        if target.cleanup {
            stages.push(Box::new(CleanupEngine::new(&config.cleanup_rules)?));
        }

        let prefix_options = PrefixOptions {
            minify: target.minify,
            source_maps: target.source_maps,
            include_content: target.include_content,
            preprocessed: true,
        };
        stages.push(Box::new(
            Prefixer::new(&config.browsers, prefix_options)
                .with_context(|| format!("Failed to set up prefixing for target '{}'", target.name))?,
        ));

        Ok(Self {
            target: target.clone(),
            stages,
        })
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Compiles `source` and writes the result into `dest_dir`.
    pub fn compile_file(&self, root: &Path, source: &Path, dest_dir: &Path) -> Result<FileOutcome> {
        let source_id = relative_id(root, source);
        let original = fs::read_to_string(source)
            .with_context(|| format!("Failed to read source file {}", source.display()))?;

        let input = StageInput {
            content: &original,
            source_path: source,
            source_id: &source_id,
        };

        let mut content = original.clone();
        let mut source_map = None;
        let mut cleanup = Vec::new();
        for stage in &self.stages {
            debug!("[{}] running stage '{}' on '{}'.", self.target.name, stage.name(), source_id);
            let output = stage
                .run(input.with_content(&content))
                .with_context(|| format!("Stage '{}' failed for {}", stage.name(), source_id))?;
            content = output.content;
            cleanup.extend(output.summary);
            if output.source_map.is_some() {
                source_map = output.source_map;
            }
        }

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Source file has no usable name: {}", source.display()))?;
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create output directory {}", dest_dir.display()))?;

        let css_path = dest_dir.join(format!("{}.css", stem));
        let map_path = match source_map {
            Some(map) => {
                let map_name = format!("{}.css.map", stem);
                if !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(&format!("/*# sourceMappingURL={} */\n", map_name));
                let map_path = dest_dir.join(map_name);
                fs::write(&map_path, map)
                    .with_context(|| format!("Failed to write source map {}", map_path.display()))?;
                Some(map_path)
            }
            None => None,
        };

        fs::write(&css_path, &content)
            .with_context(|| format!("Failed to write stylesheet {}", css_path.display()))?;
        info!("[{}] {} -> {}", self.target.name, source_id, relative_id(root, &css_path));

        Ok(FileOutcome {
            source: source.to_path_buf(),
            css: css_path,
            source_map: map_path,
            bytes_written: content.len(),
            cleanup,
        })
    }
}

/// Builds every file of a target. A failing file is recorded, not fatal.
pub fn build_target(root: &Path, plan: &TargetPlan, config: &PipelineConfig) -> TargetReport {
    let started = Instant::now();
    let name = plan.target.name.clone();
    info!("Starting target '{}' ({} file(s)).", name, plan.files.len());

    let mut report = TargetReport {
        name: name.clone(),
        outcomes: Vec::new(),
        failures: Vec::new(),
        duration_ms: 0,
    };

    let pipeline = match TargetPipeline::new(root, &plan.target, config) {
        Ok(p) => p,
        Err(e) => {
            error!("Target '{}' could not be set up: {:#}", name, e);
            report.failures = plan
                .files
                .iter()
                .map(|f| FileFailure {
                    source: f.clone(),
                    error: format!("{:#}", e),
                })
                .collect();
            report.duration_ms = started.elapsed().as_millis();
            return report;
        }
    };

    let dest_dir = plan.dest_dir(root);
    for file in &plan.files {
        match pipeline.compile_file(root, file, &dest_dir) {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(e) => {
                error!("[{}] {:#}", name, e);
                report.failures.push(FileFailure {
                    source: file.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    report.duration_ms = started.elapsed().as_millis();
    info!(
        "Finished target '{}': {} built, {} failed in {} ms.",
        name,
        report.outcomes.len(),
        report.failures.len(),
        report.duration_ms
    );
    report
}
