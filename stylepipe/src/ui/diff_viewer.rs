// stylepipe/src/ui/diff_viewer.rs
//! Unified diff of a stylesheet before and after selector deduplication.

use diffy::{create_patch, Line as DiffLine};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Writes the changed hunks. Returns `false` when nothing changed.
pub fn print_diff<W: Write>(original: &str, cleaned: &str, writer: &mut W, supports_color: bool) -> io::Result<bool> {
    let patch = create_patch(original, cleaned);
    if patch.hunks().is_empty() {
        writeln!(writer, "No duplicate selector fragments found.")?;
        return Ok(false);
    }

    let header = "--- Selector Deduplication Diff ---";
    if supports_color {
        writeln!(writer, "{}", header.yellow().bold())?;
    } else {
        writeln!(writer, "{}", header)?;
    }

    for hunk in patch.hunks() {
        let range = format!(
            "@@ -{},{} +{},{} @@",
            hunk.old_range().start(),
            hunk.old_range().len(),
            hunk.new_range().start(),
            hunk.new_range().len()
        );
        if supports_color {
            writeln!(writer, "{}", range.cyan())?;
        } else {
            writeln!(writer, "{}", range)?;
        }

        for line_change in hunk.lines() {
            match line_change {
                DiffLine::Delete(s) => {
                    let line = format!("-{}", s.trim_end_matches('\n'));
                    if supports_color {
                        writeln!(writer, "{}", line.red())?;
                    } else {
                        writeln!(writer, "{}", line)?;
                    }
                }
                DiffLine::Insert(s) => {
                    let line = format!("+{}", s.trim_end_matches('\n'));
                    if supports_color {
                        writeln!(writer, "{}", line.green())?;
                    } else {
                        writeln!(writer, "{}", line)?;
                    }
                }
                DiffLine::Context(s) => {
                    writeln!(writer, " {}", s.trim_end_matches('\n'))?;
                }
            }
        }
    }

    Ok(true)
}
