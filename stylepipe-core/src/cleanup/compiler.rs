//! compiler.rs - Manages the compilation and caching of cleanup rules.
//!
//! This module provides a thread-safe, cached mechanism to convert a list of
//! `CleanupRule`s into `CompiledRules`. Targets built concurrently share the
//! same compiled set through an `Arc`.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use fancy_regex::Regex;
use lazy_static::lazy_static;
use log::{debug, warn};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::config::{CleanupRule, MAX_PATTERN_LENGTH};
use crate::dedupe::build_cleanup_regex;
use crate::errors::PipelineError;

/// A single compiled cleanup rule.
#[derive(Debug)]
pub struct CompiledRule {
    pub regex: Regex,
    pub replace_with: String,
    pub name: String,
    pub until_stable: bool,
}

/// The ordered set of rules applied to a stylesheet.
#[derive(Debug)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
}

lazy_static! {
    /// Keyed by a hash of the rule list, in order.
    static ref COMPILED_RULES_CACHE: RwLock<HashMap<u64, Arc<CompiledRules>>> = RwLock::new(HashMap::new());
}

/// Order matters for cleanup, so the list is hashed as given.
fn hash_rules(rules: &[CleanupRule]) -> u64 {
    let mut hasher = DefaultHasher::new();
    rules.hash(&mut hasher);
    hasher.finish()
}

/// Compiles enabled rules, skipping disabled ones. All failures are reported together.
pub fn compile_rules(rules_to_compile: &[CleanupRule]) -> Result<CompiledRules, PipelineError> {
    debug!("Starting compilation of {} cleanup rules.", rules_to_compile.len());

    let mut compiled_rules = Vec::new();
    let mut compilation_errors = Vec::new();

    for rule in rules_to_compile {
        if !rule.is_enabled() {
            debug!("Skipping disabled cleanup rule '{}'.", rule.name);
            continue;
        }
        if rule.pattern.is_empty() {
            warn!("Skipping rule '{}' because its pattern is empty.", rule.name);
            continue;
        }
        if rule.pattern.len() > MAX_PATTERN_LENGTH {
            compilation_errors.push(PipelineError::PatternLengthExceeded(
                rule.name.clone(),
                rule.pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
            continue;
        }

        match build_cleanup_regex(&rule.pattern) {
            Ok(regex) => {
                log::debug!(
                    target: "stylepipe_core::cleanup",
                    "Rule '{}' compiled successfully.",
                    rule.name
                );
                compiled_rules.push(CompiledRule {
                    regex,
                    replace_with: rule.replace_with.clone(),
                    name: rule.name.clone(),
                    until_stable: rule.until_stable,
                });
            }
            Err(e) => {
                compilation_errors.push(PipelineError::RuleCompilationError(rule.name.clone(), e.to_string()));
            }
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        Err(PipelineError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )))
    } else {
        debug!("Finished compiling rules. Total compiled: {}.", compiled_rules.len());
        Ok(CompiledRules { rules: compiled_rules })
    }
}

/// Gets a `CompiledRules` instance from the cache or compiles it if not found.
pub fn get_or_compile_rules(rules: &[CleanupRule]) -> Result<Arc<CompiledRules>> {
    let cache_key = hash_rules(rules);

    {
        let cache = COMPILED_RULES_CACHE
            .read()
            .map_err(|_| PipelineError::Fatal("compiled rule cache lock poisoned".to_string()))?;
        if let Some(compiled) = cache.get(&cache_key) {
            debug!("Serving compiled rules from cache for key: {}", cache_key);
            return Ok(Arc::clone(compiled));
        }
    }

    debug!("Compiled rules not found in cache. Compiling now.");
    let compiled = Arc::new(compile_rules(rules)?);

    COMPILED_RULES_CACHE
        .write()
        .map_err(|_| PipelineError::Fatal("compiled rule cache lock poisoned".to_string()))?
        .insert(cache_key, Arc::clone(&compiled));

    debug!("Successfully compiled and cached rules for key: {}", cache_key);
    Ok(compiled)
}
