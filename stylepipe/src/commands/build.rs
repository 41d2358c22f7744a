// stylepipe/src/commands/build.rs
//! `stylepipe build`: resolves the selected targets and builds them
//! concurrently, one blocking task per target.

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::io::{self, Write};
use std::sync::Arc;
use stylepipe_core::{build_target, create_build_plan, relative_id, BuildPlan, BuildReport, PipelineConfig, TargetReport};
use tokio::task::JoinSet;

use crate::cli::BuildCommand;
use crate::commands::project::load_project;
use crate::commands::{error_msg, info_msg, success_msg, warn_msg};
use crate::ui::build_summary;

/// Runs the build command. Returns the report; the caller maps failures to an exit code.
pub async fn run_build(cmd: BuildCommand, quiet: bool) -> Result<BuildReport> {
    info!("Starting build operation.");
    let project = load_project(&cmd.project)?;
    let mut config = project.config;

    if !cmd.browsers.is_empty() {
        debug!("Overriding browser queries from the command line: {:?}", cmd.browsers);
        config.browsers = cmd.browsers.clone();
    }
    if cmd.no_source_maps {
        for target in &mut config.targets {
            target.source_maps = false;
        }
    }

    let selected = config.select_targets(&cmd.targets)?;
    if selected.is_empty() {
        bail!("No targets are configured.");
    }

    let plan = create_build_plan(&project.root, &selected).context("Failed to resolve build targets")?;
    if !quiet {
        for (file, names) in &plan.overlaps {
            warn_msg(format!(
                "{} is matched by several targets ({})",
                relative_id(&plan.root, file),
                names.join(", ")
            ));
        }
    }

    if cmd.dry_run {
        print_plan(&plan)?;
        return Ok(BuildReport::default());
    }

    let report = execute_plan(plan.clone(), Arc::new(config)).await?;

    if cmd.json {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        writeln!(writer, "{}", report.to_json()?)?;
    } else if !quiet {
        let stderr_supports_color = io::stderr().is_terminal();
        build_summary::print_summary(&report, &plan.root, &mut io::stderr(), stderr_supports_color)?;
    }

    if !quiet {
        if report.is_success() {
            success_msg(format!("Built {} file(s).", report.files_built()));
        } else {
            error_msg(format!(
                "{} file(s) failed, {} built.",
                report.files_failed(),
                report.files_built()
            ));
        }
    }

    info!("Build operation completed.");
    Ok(report)
}

/// Builds every target of `plan` on the blocking pool and keeps the plan's order.
pub async fn execute_plan(plan: BuildPlan, config: Arc<PipelineConfig>) -> Result<BuildReport> {
    let root = Arc::new(plan.root.clone());
    let mut tasks = JoinSet::new();

    for (index, target_plan) in plan.targets.into_iter().enumerate() {
        let root = Arc::clone(&root);
        let config = Arc::clone(&config);
        tasks.spawn_blocking(move || (index, build_target(&root, &target_plan, &config)));
    }

    let mut finished: Vec<(usize, TargetReport)> = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        finished.push(joined.context("A build task panicked")?);
    }
    finished.sort_by_key(|(index, _)| *index);

    Ok(BuildReport {
        targets: finished.into_iter().map(|(_, report)| report).collect(),
    })
}

fn print_plan(plan: &BuildPlan) -> Result<()> {
    info_msg(format!("Dry run: {} file(s) would be built.", plan.file_count()));
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    for target in &plan.targets {
        let dest = target.dest_dir(&plan.root);
        writeln!(writer, "{}:", target.target.name)?;
        for file in &target.files {
            let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            writeln!(
                writer,
                "  {} -> {}",
                relative_id(&plan.root, file),
                relative_id(&plan.root, &dest.join(format!("{}.css", stem)))
            )?;
        }
    }
    Ok(())
}
