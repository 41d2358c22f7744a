// stylepipe/src/commands/dedupe.rs
//! `stylepipe dedupe`: the selector deduplicator as a text filter.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use stylepipe_core::{CleanupEngine, StageInput, StylesheetStage};

use crate::cli::DedupeCommand;
use crate::commands::info_msg;
use crate::ui::diff_viewer;

pub fn run_dedupe(cmd: DedupeCommand, quiet: bool) -> Result<()> {
    info!("Starting dedupe operation.");

    let (input, source_id) = match &cmd.input_file {
        Some(path) => {
            debug!("Reading input from file: {}", path.display());
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;
            (text, path.display().to_string())
        }
        None => {
            debug!("Reading input from stdin...");
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read from stdin")?;
            (text, "stdin".to_string())
        }
    };

    let engine = CleanupEngine::selector_deduplicator()?;
    let output = engine.run(StageInput {
        content: &input,
        source_path: Path::new(&source_id),
        source_id: &source_id,
    })?;
    let collapsed: usize = output.summary.iter().map(|s| s.occurrences).sum();
    debug!(
        "Deduplicated '{}'. Original length: {}, new length: {}",
        source_id,
        input.len(),
        output.content.len()
    );

    match &cmd.output {
        Some(path) => {
            if !quiet {
                info_msg(format!("Writing deduplicated stylesheet to file: {}", path.display()));
            }
            if cmd.diff {
                let mut file = fs::File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                diff_viewer::print_diff(&input, &output.content, &mut file, false)?;
            } else {
                fs::write(path, &output.content)
                    .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            }
        }
        None => {
            let stdout = io::stdout();
            let supports_color = stdout.is_terminal();
            let mut writer = stdout.lock();
            if cmd.diff {
                diff_viewer::print_diff(&input, &output.content, &mut writer, supports_color)?;
            } else {
                writer.write_all(output.content.as_bytes())?;
            }
            writer.flush()?;
        }
    }

    if !quiet {
        info_msg(format!("Collapsed {} duplicate selector fragment(s).", collapsed));
    }
    info!("Dedupe operation completed.");
    Ok(())
}
