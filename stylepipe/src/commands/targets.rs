// stylepipe/src/commands/targets.rs
//! `stylepipe targets`: shows how sources are partitioned between targets.

use anyhow::Result;
use serde_json::json;
use std::io::{self, Write};
use stylepipe_core::{create_build_plan, relative_id};

use crate::cli::TargetsCommand;
use crate::commands::project::load_project;

pub fn run_targets(cmd: TargetsCommand) -> Result<()> {
    let project = load_project(&cmd.project)?;
    let plan = create_build_plan(&project.root, &project.config.targets)?;

    let stdout = io::stdout();
    let mut writer = stdout.lock();

    if cmd.json {
        let targets: Vec<_> = plan
            .targets
            .iter()
            .map(|t| {
                json!({
                    "name": t.target.name,
                    "description": t.target.description,
                    "dest": relative_id(&plan.root, &t.dest_dir(&plan.root)),
                    "cleanup": t.target.cleanup,
                    "source_maps": t.target.source_maps,
                    "files": t.files.iter().map(|f| relative_id(&plan.root, f)).collect::<Vec<_>>(),
                })
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&json!({ "targets": targets }))?)?;
        return Ok(());
    }

    for t in &plan.targets {
        let mut flags = Vec::new();
        if t.target.cleanup {
            flags.push("cleanup");
        }
        if t.target.source_maps {
            flags.push("source maps");
        }
        if t.target.minify {
            flags.push("minify");
        }
        writeln!(
            writer,
            "{} ({} file(s)){}",
            t.target.name,
            t.files.len(),
            if flags.is_empty() { String::new() } else { format!(" [{}]", flags.join(", ")) }
        )?;
        if let Some(description) = &t.target.description {
            writeln!(writer, "  {}", description)?;
        }
        for file in &t.files {
            writeln!(writer, "  - {}", relative_id(&plan.root, file))?;
        }
    }
    Ok(())
}
