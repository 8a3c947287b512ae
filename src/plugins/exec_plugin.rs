// src/plugins/exec_plugin.rs

//! Runs shell commands configured through properties.
//!
//! For each supported phase, a `<phase>_command` property holds the command
//! line run when the task of that name executes. An unset property is a
//! no-op.

use anyhow::Context;

use crate::descriptor::{Item, Module, ModuleBuilder};
use crate::exec::run_shell;
use crate::plugin::PluginDef;
use crate::registry::TaskContext;

pub const PHASES: [&str; 4] = ["run_unit_tests", "run_integration_tests", "package", "publish"];

pub fn module() -> Module {
    let mut builder = ModuleBuilder::new("exec").use_plugin(PluginDef::builtin("core"));
    for phase in PHASES {
        builder = builder.item(
            Item::task(phase, move |ctx: &mut TaskContext<'_>| run_command(ctx, phase))
                .description(format!("Runs the command from the `{phase}_command` property.")),
        );
    }
    builder.build()
}

fn run_command(ctx: &mut TaskContext<'_>, phase: &str) -> anyhow::Result<()> {
    let key = format!("{phase}_command");
    let Some(command) = ctx.project.property_str(&key) else {
        ctx.logger().debug(format!("No {key} set, skipping"));
        return Ok(());
    };
    if command.trim().is_empty() {
        return Ok(());
    }
    let command = ctx.project.expand_literal(&command)?;
    run_shell(ctx.logger().name(), &command)
        .with_context(|| format!("exec plugin command for {phase}"))
}
