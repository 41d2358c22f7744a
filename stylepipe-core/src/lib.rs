// stylepipe-core/src/lib.rs
//! # Stylepipe Core Library
//!
//! `stylepipe-core` provides the platform-independent logic for building
//! stylesheets: named build targets partitioned by glob, a stage pipeline
//! (preprocess, cleanup, prefix), and the selector deduplicator that removes
//! duplicated `~` operands left behind by selector algebra.
//!
//! ## Modules
//!
//! * `config`: `PipelineConfig`, `TargetConfig` and `CleanupRule`, loaded from YAML.
//! * `discovery`: Resolves target globs into file lists, skipping partials and excludes.
//! * `dedupe`: The duplicate selector fragment transform.
//! * `cleanup`: Compiles and caches cleanup rules.
//! * `engine`: Defines the `StylesheetStage` trait.
//! * `engines`: Concrete stages (`Preprocessor`, `CleanupEngine`, `Prefixer`).
//! * `pipeline`: Per-target stage assembly, per-file compilation and reports.
//! * `headless`: One-shot helpers that work on strings.
//!
//! ## Usage Example
//!
//! ```rust
//! use stylepipe_core::{deduplicate_selectors, headless_process_string, PipelineConfig};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     assert_eq!(
//!         deduplicate_selectors(".a ~ .b ~ .a { color: red; }"),
//!         ".a ~ .b { color: red; }"
//!     );
//!
//!     let config = PipelineConfig::load_default()?;
//!     let css = headless_process_string(&config, ".x ~ .x {display:none}", "inline.css")?;
//!     assert_eq!(css, ".x {display:none}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return `anyhow::Result`; library-specific failures are
//! `PipelineError` values underneath. The deduplicator itself cannot fail.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod cleanup;
pub mod config;
pub mod dedupe;
pub mod discovery;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod pipeline;

pub use config::{merge_config, CleanupRule, PipelineConfig, TargetConfig, MAX_PATTERN_LENGTH};

pub use errors::PipelineError;

pub use dedupe::{
    build_cleanup_regex, collapse_pass, deduplicate_selectors, CLEANUP_BACKTRACK_LIMIT, DUPLICATE_SELECTOR_PATTERN,
    DUPLICATE_SELECTOR_REPLACEMENT,
};

pub use discovery::{create_build_plan, discover_files, is_partial, relative_id, resolve_target, BuildPlan, TargetPlan};

pub use engine::{CleanupSummaryItem, StageInput, StageOutput, StylesheetStage};
pub use engines::cleanup_engine::{builtin_dedupe_rule, CleanupEngine};
pub use engines::prefix_engine::{resolve_browsers, PrefixOptions, Prefixer};
pub use engines::preprocess_engine::Preprocessor;

pub use pipeline::{build_target, BuildReport, FileFailure, FileOutcome, TargetPipeline, TargetReport};

pub use headless::{headless_finish_string, headless_process_string};

pub use cleanup::compiler::{compile_rules, CompiledRule, CompiledRules};
