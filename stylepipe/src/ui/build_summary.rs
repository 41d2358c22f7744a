// stylepipe/src/ui/build_summary.rs
//! Table view of a finished build.

use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use std::io::{self, Write};
use std::path::Path;
use stylepipe_core::{relative_id, BuildReport};

/// Renders one row per target plus one row per failed file.
pub fn render_summary(report: &BuildReport, root: &Path, supports_color: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(if supports_color { presets::UTF8_FULL } else { presets::ASCII_FULL })
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Target", "Built", "Failed", "Selectors collapsed", "Time (ms)"]);

    for target in &report.targets {
        let collapsed: usize = target
            .outcomes
            .iter()
            .flat_map(|o| o.cleanup.iter())
            .map(|c| c.occurrences)
            .sum();
        let failed = Cell::new(target.failures.len());
        let failed = if supports_color && !target.failures.is_empty() {
            failed.fg(Color::Red)
        } else {
            failed
        };
        table.add_row(vec![
            Cell::new(&target.name),
            Cell::new(target.outcomes.len()),
            failed,
            Cell::new(collapsed),
            Cell::new(target.duration_ms),
        ]);
    }

    let mut out = table.to_string();
    for target in &report.targets {
        for failure in &target.failures {
            out.push_str(&format!(
                "\n[{}] {}: {}",
                target.name,
                relative_id(root, &failure.source),
                failure.error
            ));
        }
    }
    out
}

pub fn print_summary<W: Write>(report: &BuildReport, root: &Path, writer: &mut W, supports_color: bool) -> io::Result<()> {
    writeln!(writer, "--- Build Summary ---")?;
    writeln!(writer, "{}", render_summary(report, root, supports_color))
}
