//! Configuration management for `stylepipe-core`.
//!
//! This module defines the build targets, the browser queries used for
//! prefixing, and the cleanup rules applied after preprocessing. It handles
//! YAML (de)serialization and provides utilities for loading, merging, and
//! validating these configs.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::dedupe::build_cleanup_regex;
use crate::errors::PipelineError;

/// Maximum allowed length for a cleanup pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// A single text cleanup applied to compiled CSS before prefixing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct CleanupRule {
    /// Unique identifier for the rule (e.g., "duplicate_sibling_selector").
    pub name: String,
    pub description: Option<String>,
    /// Pattern string. Back-references (`\1`) are allowed.
    pub pattern: String,
    /// Replacement with `$n` / `${n}` group expansion.
    pub replace_with: String,
    /// Re-apply the rule until the text stops changing.
    pub until_stable: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
}

impl Default for CleanupRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            pattern: String::new(),
            replace_with: String::new(),
            until_stable: false,
            enabled: None,
        }
    }
}

impl CleanupRule {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// A named build unit: which sources it compiles and how.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    pub name: String,
    pub description: Option<String>,
    /// Glob patterns, relative to the project root.
    pub sources: Vec<String>,
    /// Files matching any of these globs are left to another target.
    pub exclude: Vec<String>,
    /// Output directory, relative to the project root.
    pub dest: PathBuf,
    /// Extra directories searched by `@use` / `@import`.
    pub include_paths: Vec<PathBuf>,
    pub source_maps: bool,
    /// Embed the original source text in the written map.
    pub include_content: bool,
    /// Run the cleanup rules on the preprocessed CSS.
    pub cleanup: bool,
    pub minify: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            sources: Vec::new(),
            exclude: Vec::new(),
            dest: PathBuf::from("."),
            include_paths: Vec::new(),
            source_maps: true,
            include_content: false,
            cleanup: false,
            minify: false,
        }
    }
}

/// Represents the top-level configuration structure for stylepipe.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Browserslist queries driving vendor prefixes.
    pub browsers: Vec<String>,
    pub targets: Vec<TargetConfig>,
    pub cleanup_rules: Vec<CleanupRule>,
}

impl PipelineConfig {
    /// Loads a pipeline configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading pipeline configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PipelineConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        info!(
            "Loaded {} target(s) and {} cleanup rule(s) from file {}.",
            config.targets.len(),
            config.cleanup_rules.len(),
            path.display()
        );

        Ok(config)
    }

    /// Loads the default pipeline from the embedded configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default pipeline from embedded string...");
        let default_yaml = include_str!("../config/default_pipeline.yaml");
        let config: PipelineConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default pipeline")?;

        debug!(
            "Loaded {} default target(s), {} default cleanup rule(s).",
            config.targets.len(),
            config.cleanup_rules.len()
        );
        Ok(config)
    }

    /// Looks up a target by name.
    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Resolves target names to configs. An empty list selects every target.
    pub fn select_targets(&self, names: &[String]) -> Result<Vec<TargetConfig>, PipelineError> {
        if names.is_empty() {
            return Ok(self.targets.clone());
        }
        let mut selected = Vec::with_capacity(names.len());
        let mut seen = HashSet::new();
        for name in names {
            let target = self
                .target(name)
                .ok_or_else(|| PipelineError::UnknownTarget(name.clone()))?;
            if seen.insert(name.as_str()) {
                selected.push(target.clone());
            }
        }
        Ok(selected)
    }

    /// Checks target and rule integrity.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        validate_targets(&self.targets, &mut errors);
        validate_rules(&self.cleanup_rules, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")))
        }
    }
}

/// Merges a user configuration over the defaults.
///
/// Cleanup rules are overridden by name. Targets and browser queries from the
/// user replace the defaults wholesale when present.
pub fn merge_config(default_config: PipelineConfig, user_config: Option<PipelineConfig>) -> PipelineConfig {
    debug!(
        "merge_config called. Default targets: {}, default rules: {}",
        default_config.targets.len(),
        default_config.cleanup_rules.len()
    );

    let Some(user_cfg) = user_config else {
        return default_config;
    };

    let mut order: Vec<String> = Vec::new();
    let mut rules: HashMap<String, CleanupRule> = HashMap::new();
    for rule in default_config.cleanup_rules.into_iter().chain(user_cfg.cleanup_rules) {
        if !rules.contains_key(&rule.name) {
            order.push(rule.name.clone());
        } else {
            debug!("Overriding cleanup rule '{}' with user definition.", rule.name);
        }
        rules.insert(rule.name.clone(), rule);
    }
    let cleanup_rules: Vec<CleanupRule> = order.into_iter().filter_map(|name| rules.remove(&name)).collect();

    let targets = if user_cfg.targets.is_empty() {
        default_config.targets
    } else {
        debug!("User config replaces targets with {} target(s).", user_cfg.targets.len());
        user_cfg.targets
    };

    let browsers = if user_cfg.browsers.is_empty() {
        default_config.browsers
    } else {
        user_cfg.browsers
    };

    debug!("Final pipeline: {} target(s), {} rule(s).", targets.len(), cleanup_rules.len());
    PipelineConfig { browsers, targets, cleanup_rules }
}

fn validate_targets(targets: &[TargetConfig], errors: &mut Vec<String>) {
    let mut names = HashSet::new();
    for target in targets {
        if target.name.trim().is_empty() {
            errors.push("A target has an empty `name` field.".to_string());
        } else if !names.insert(target.name.as_str()) {
            errors.push(format!("Duplicate target name found: '{}'.", target.name));
        }

        if target.sources.is_empty() {
            errors.push(format!("Target '{}' has no `sources` globs.", target.name));
        }

        for pattern in target.sources.iter().chain(&target.exclude) {
            if let Err(e) = glob::Pattern::new(pattern) {
                errors.push(format!("Target '{}' has an invalid glob '{}': {}", target.name, pattern, e));
            }
        }

        if target.include_content && !target.source_maps {
            warn!(
                "Target '{}': 'include_content' has no effect while 'source_maps' is false.",
                target.name
            );
        }
    }
}

fn validate_rules(rules: &[CleanupRule], errors: &mut Vec<String>) {
    let mut rule_names = HashSet::new();
    let group_ref_regex = Regex::new(r"\$\{?(\d+)\}?").expect("group reference pattern is valid");

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A cleanup rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.as_str()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        if rule.pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
            continue;
        }

        if rule.pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(format!(
                "Rule '{}': pattern length ({}) exceeds maximum allowed ({}).",
                rule.name,
                rule.pattern.len(),
                MAX_PATTERN_LENGTH
            ));
            continue;
        }

        let compiled = match build_cleanup_regex(&rule.pattern) {
            Ok(re) => re,
            Err(e) => {
                errors.push(format!("Rule '{}' has an invalid pattern: {}", rule.name, e));
                continue;
            }
        };

        // captures_len counts the implicit whole-match group.
        let group_count = compiled.captures_len().saturating_sub(1);
        for cap in group_ref_regex.captures_iter(&rule.replace_with) {
            if let Some(group_num) = cap.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
                if group_num > group_count {
                    errors.push(format!(
                        "Rule '{}': replacement references non-existent capture group '${}'.",
                        rule.name, group_num
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedupe::{DUPLICATE_SELECTOR_PATTERN, DUPLICATE_SELECTOR_REPLACEMENT};

    fn rule(name: &str, pattern: &str, replace_with: &str) -> CleanupRule {
        CleanupRule {
            name: name.to_string(),
            pattern: pattern.to_string(),
            replace_with: replace_with.to_string(),
            ..CleanupRule::default()
        }
    }

    #[test]
    fn default_pipeline_has_fast_and_slow_targets() {
        let config = PipelineConfig::load_default().unwrap();
        let fast = config.target("fast").unwrap();
        let slow = config.target("slow").unwrap();
        assert!(!fast.cleanup);
        assert!(slow.cleanup);
        assert!(fast.exclude.iter().any(|p| slow.sources.contains(p)));
        for target in [fast, slow] {
            assert_eq!(target.include_paths, vec![PathBuf::from("less/includes")]);
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_rule_matches_builtin_deduplicator() {
        let config = PipelineConfig::load_default().unwrap();
        let rule = &config.cleanup_rules[0];
        assert_eq!(rule.name, "duplicate_sibling_selector");
        assert_eq!(rule.pattern, DUPLICATE_SELECTOR_PATTERN);
        assert_eq!(rule.replace_with, DUPLICATE_SELECTOR_REPLACEMENT);
        assert!(rule.until_stable);
        assert!(rule.is_enabled());
    }

    #[test]
    fn validate_rejects_reference_to_missing_group() {
        let config = PipelineConfig {
            cleanup_rules: vec![rule("bad", "(a)b", "${2}")],
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("non-existent capture group '$2'"), "{}", err);
    }

    #[test]
    fn validate_rejects_duplicate_target_names_and_bad_globs() {
        let target = TargetConfig {
            name: "fast".to_string(),
            sources: vec!["styles/[*.scss".to_string()],
            ..TargetConfig::default()
        };
        let config = PipelineConfig {
            targets: vec![target.clone(), target],
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Duplicate target name found: 'fast'"), "{}", err);
        assert!(err.contains("invalid glob"), "{}", err);
    }

    #[test]
    fn select_targets_reports_unknown_names() {
        let config = PipelineConfig::load_default().unwrap();
        assert_eq!(config.select_targets(&[]).unwrap().len(), 2);
        let picked = config.select_targets(&["slow".to_string(), "slow".to_string()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert!(matches!(
            config.select_targets(&["medium".to_string()]),
            Err(PipelineError::UnknownTarget(name)) if name == "medium"
        ));
    }
}
