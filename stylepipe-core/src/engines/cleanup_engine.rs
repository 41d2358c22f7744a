// stylepipe-core/src/engines/cleanup_engine.rs
//! A `StylesheetStage` that applies the configured cleanup rules to compiled
//! CSS, in order, and counts how often each one fired.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, warn};
use std::borrow::Cow;
use std::sync::Arc;

use crate::cleanup::compiler::{get_or_compile_rules, CompiledRule, CompiledRules};
use crate::config::CleanupRule;
use crate::dedupe::{replace_counted, DUPLICATE_SELECTOR_PATTERN, DUPLICATE_SELECTOR_REPLACEMENT};
use crate::engine::{CleanupSummaryItem, StageInput, StageOutput, StylesheetStage};

#[derive(Debug, Clone)]
pub struct CleanupEngine {
    compiled_rules: Arc<CompiledRules>,
}

impl CleanupEngine {
    pub fn new(rules: &[CleanupRule]) -> Result<Self> {
        let compiled_rules =
            get_or_compile_rules(rules).context("Failed to compile cleanup rules for CleanupEngine")?;
        Ok(Self { compiled_rules })
    }

    /// An engine carrying only the duplicate selector rule.
    pub fn selector_deduplicator() -> Result<Self> {
        Self::new(&[builtin_dedupe_rule()])
    }

    pub fn compiled_rules(&self) -> &CompiledRules {
        &self.compiled_rules
    }

    /// Applies every rule in order and returns the rewritten text with counts.
    pub fn apply(&self, content: &str, source_id: &str) -> (String, Vec<CleanupSummaryItem>) {
        let mut current = content.to_string();
        let mut summary = Vec::new();

        for rule in &self.compiled_rules.rules {
            let (next, occurrences) = apply_rule(rule, &current);
            if occurrences > 0 {
                debug!(
                    "Rule '{}' collapsed {} occurrence(s) in '{}'.",
                    rule.name, occurrences, source_id
                );
                summary.push(CleanupSummaryItem {
                    rule_name: rule.name.clone(),
                    occurrences,
                });
            }
            current = next;
        }

        (current, summary)
    }
}

impl StylesheetStage for CleanupEngine {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn run(&self, input: StageInput<'_>) -> Result<StageOutput> {
        let (content, summary) = self.apply(input.content, input.source_id);
        Ok(StageOutput {
            content,
            source_map: None,
            summary,
        })
    }
}

/// The duplicate sibling selector rule as it ships in the default pipeline.
pub fn builtin_dedupe_rule() -> CleanupRule {
    CleanupRule {
        name: "duplicate_sibling_selector".to_string(),
        description: Some("Collapses repeated operands emitted by `~` expansion.".to_string()),
        pattern: DUPLICATE_SELECTOR_PATTERN.to_string(),
        replace_with: DUPLICATE_SELECTOR_REPLACEMENT.to_string(),
        until_stable: true,
        enabled: Some(true),
    }
}

/// One global pass, or passes until stable. Returns the text and the match count.
///
/// An engine error stops the rule and is logged; the text keeps every rewrite
/// made before it.
fn apply_rule(rule: &CompiledRule, text: &str) -> (String, usize) {
    let mut current = text.to_string();
    let mut occurrences = 0usize;

    loop {
        let next = match replace_counted(&rule.regex, &rule.replace_with, &current) {
            Ok((Cow::Borrowed(_), _)) => break,
            Ok((Cow::Owned(next), matches)) => {
                occurrences += matches;
                next
            }
            Err(e) => {
                warn!(
                    "Rule '{}' could not be applied, leaving the remaining text unchanged: {}",
                    rule.name, e
                );
                break;
            }
        };
        let settled = next == current;
        current = next;
        if !rule.until_stable || settled {
            break;
        }
    }

    (current, occurrences)
}
