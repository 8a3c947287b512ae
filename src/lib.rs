// src/lib.rs

pub mod cli;
pub mod dag;
pub mod descriptor;
pub mod errors;
pub mod exec;
pub mod execution;
pub mod fs;
pub mod logging;
pub mod plugin;
pub mod plugins;
pub mod project;
pub mod reactor;
pub mod registry;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::reactor::{BuildSummary, Reactor};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the reactor (descriptor, plugins, planning, execution), run on a
///   blocking thread since the engine is synchronous
/// - Ctrl-C handling, which aborts the build before the next task
pub async fn run(args: CliArgs) -> Result<()> {
    let interrupt = Arc::new(AtomicBool::new(false));

    // Ctrl-C → abort before the next task starts.
    {
        let interrupt = Arc::clone(&interrupt);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            warn!("interrupt received; aborting build after the current task");
            interrupt.store(true, Ordering::SeqCst);
        });
    }

    tokio::task::spawn_blocking(move || run_blocking(&args, interrupt))
        .await
        .context("build thread panicked")?
}

fn run_blocking(args: &CliArgs, interrupt: Arc<AtomicBool>) -> Result<()> {
    let mut reactor = Reactor::new();
    reactor.set_interrupt_flag(interrupt);
    reactor.prepare_build(&args.build_options())?;

    if args.list_tasks {
        print_tasks(&reactor);
        return Ok(());
    }
    if args.list_plan_tasks {
        let plan = reactor.plan_tasks(&args.tasks)?;
        println!("{}", plan.names().join(" "));
        return Ok(());
    }

    let summary = reactor.build(&args.tasks, &args.environments)?;
    print_summary(&summary);
    Ok(())
}

fn print_tasks(reactor: &Reactor) {
    let Some(project) = reactor.project() else {
        return;
    };
    println!("Tasks found for project \"{}\":", project.name());
    for task in reactor.tasks() {
        println!("  {}", task.name());
        for line in task.description() {
            println!("      {line}");
        }
        let dependencies = reactor
            .execution_manager()
            .resolved_dependencies(task.name());
        if !dependencies.is_empty() {
            let names: Vec<String> = dependencies
                .iter()
                .map(|d| if d.optional { format!("({})", d.name) } else { d.name.clone() })
                .collect();
            println!("      depends on: {}", names.join(", "));
        }
    }
    debug!("task listing complete (no execution)");
}

fn print_summary(summary: &BuildSummary) {
    println!("BUILD SUCCESSFUL");
    println!(
        "Build summary: project {} version {}",
        summary.project_name, summary.project_version
    );
    for task in &summary.tasks {
        println!(
            "  {:<30} [{} ms] {} action(s)",
            task.task, task.execution_time_millis, task.number_of_actions
        );
    }
    println!("Build finished in {:.3} s", summary.elapsed.as_secs_f64());
}
