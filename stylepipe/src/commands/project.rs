// stylepipe/src/commands/project.rs
//! Resolves the project root and the effective pipeline configuration.

use anyhow::{Context, Result};
use log::debug;
use std::env;
use std::path::{Path, PathBuf};
use stylepipe_core::{merge_config, PipelineConfig};

use crate::cli::ProjectArgs;

/// Looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "stylepipe.yaml";

/// A loaded project: where paths are resolved from, and the merged config.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: PipelineConfig,
    /// The user file that was merged over the defaults, if any.
    pub config_path: Option<PathBuf>,
}

/// Loads defaults, merges the user file over them, and validates the result.
///
/// The root is `--root`, else the directory of the config file, else the
/// current directory.
pub fn load_project(args: &ProjectArgs) -> Result<Project> {
    let cwd = env::current_dir().context("Failed to determine the current directory")?;

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let base = args.root.clone().unwrap_or_else(|| cwd.clone());
            let candidate = base.join(DEFAULT_CONFIG_FILE);
            candidate.is_file().then_some(candidate)
        }
    };

    let root = match (&args.root, &config_path) {
        (Some(root), _) => root.clone(),
        (None, Some(path)) => config_dir(path).unwrap_or_else(|| cwd.clone()),
        (None, None) => cwd,
    };
    debug!("Project root resolved to {}", root.display());

    let user_config = config_path
        .as_ref()
        .map(PipelineConfig::load_from_file)
        .transpose()?;
    let config = merge_config(PipelineConfig::load_default()?, user_config);
    config.validate().context("Merged pipeline configuration is invalid")?;

    Ok(Project {
        root,
        config,
        config_path,
    })
}

fn config_dir(path: &Path) -> Option<PathBuf> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn config_directory_becomes_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");
        fs::write(&path, "browsers: [\"chrome 100\"]\n").unwrap();

        let project = load_project(&ProjectArgs {
            config: Some(path.clone()),
            root: None,
        })
        .unwrap();
        assert_eq!(project.root, dir.path());
        assert_eq!(project.config.browsers, vec!["chrome 100".to_string()]);
        assert_eq!(project.config.targets.len(), 2);
        assert_eq!(project.config_path, Some(path));
    }

    #[test]
    fn stylepipe_yaml_in_root_is_picked_up() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "targets:\n  - name: app\n    sources: [\"app/*.scss\"]\n",
        )
        .unwrap();

        let project = load_project(&ProjectArgs {
            config: None,
            root: Some(dir.path().to_path_buf()),
        })
        .unwrap();
        assert_eq!(project.config.targets.len(), 1);
        assert_eq!(project.config.targets[0].name, "app");
    }
}
