//! Source discovery and target partitioning.
//!
//! Each target names the sources it owns with glob patterns and carves files
//! out of its globs with `exclude`. That is how a slow compilation unit is
//! kept out of the fast target while both live in the same directory.
//! Partials (`_name.scss`) are never compiled on their own.

use glob::{glob, Pattern};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::TargetConfig;
use crate::errors::PipelineError;

/// The files one target will compile.
#[derive(Debug, Clone)]
pub struct TargetPlan {
    pub target: TargetConfig,
    pub files: Vec<PathBuf>,
}

impl TargetPlan {
    /// Output directory for this target.
    pub fn dest_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.target.dest)
    }
}

/// The resolved work for a build.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub root: PathBuf,
    pub targets: Vec<TargetPlan>,
    /// Files claimed by more than one selected target, with the target names.
    pub overlaps: Vec<(PathBuf, Vec<String>)>,
}

impl BuildPlan {
    pub fn file_count(&self) -> usize {
        self.targets.iter().map(|t| t.files.len()).sum()
    }
}

/// Discover files matching a glob pattern resolved against `base_dir`.
///
/// Directories and partials are skipped. The result is sorted.
pub fn discover_files(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let base = Pattern::escape(&base_dir.to_string_lossy());
    let full_pattern = if base.is_empty() {
        pattern.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), pattern)
    };

    let paths = glob(&full_pattern).map_err(|e| PipelineError::InvalidGlob(pattern.to_string(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() && !is_partial(&path) {
                    files.push(path);
                }
            }
            Err(e) => {
                warn!("Error reading path while matching '{}': {}", pattern, e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// A partial is only ever pulled in by `@use` / `@import`.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with('_'))
}

/// Project-relative form of `path`, with `/` separators.
pub fn relative_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolves a single target's globs, applying its excludes.
pub fn resolve_target(root: &Path, target: &TargetConfig) -> Result<TargetPlan, PipelineError> {
    let excludes = target
        .exclude
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| PipelineError::InvalidGlob(p.clone(), e)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut files = BTreeSet::new();
    for pattern in &target.sources {
        for path in discover_files(root, pattern)? {
            let rel = relative_id(root, &path);
            if let Some(ex) = excludes.iter().find(|ex| ex.matches(&rel)) {
                debug!("Target '{}': '{}' excluded by '{}'.", target.name, rel, ex.as_str());
                continue;
            }
            files.insert(path);
        }
    }

    if files.is_empty() {
        warn!("Target '{}' matched no source files.", target.name);
    }

    Ok(TargetPlan {
        target: target.clone(),
        files: files.into_iter().collect(),
    })
}

/// Resolves every selected target and records files claimed more than once.
pub fn create_build_plan(root: &Path, targets: &[TargetConfig]) -> Result<BuildPlan, PipelineError> {
    let mut plans = Vec::with_capacity(targets.len());
    let mut claims: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();

    for target in targets {
        let plan = resolve_target(root, target)?;
        for file in &plan.files {
            claims.entry(file.clone()).or_default().push(target.name.clone());
        }
        debug!("Target '{}' resolved to {} file(s).", target.name, plan.files.len());
        plans.push(plan);
    }

    let overlaps: Vec<(PathBuf, Vec<String>)> = claims.into_iter().filter(|(_, names)| names.len() > 1).collect();
    for (file, names) in &overlaps {
        warn!(
            "'{}' is matched by several targets ({}); it will be compiled more than once.",
            relative_id(root, file),
            names.join(", ")
        );
    }

    Ok(BuildPlan {
        root: root.to_path_buf(),
        targets: plans,
        overlaps,
    })
}
