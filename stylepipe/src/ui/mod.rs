// stylepipe/src/ui/mod.rs
//! Console presentation: status lines, diffs, and the build summary table.

pub mod build_summary;
pub mod diff_viewer;
pub mod output_format;
