// src/plugins/core_plugin.rs

//! The lifecycle every project shares.
//!
//! `clean`, `prepare`, `compile_sources`, `run_unit_tests`, `package`,
//! `run_integration_tests`, `verify`, `publish` and `install`. Apart from
//! the directory handling in `clean` and `prepare` the tasks are empty;
//! other plugins and the descriptor extend them.

use anyhow::Context;

use crate::descriptor::{Item, Module, ModuleBuilder};
use crate::registry::TaskContext;

pub const DIR_TARGET: &str = "dir_target";
pub const DIR_REPORTS: &str = "dir_reports";

pub fn module() -> Module {
    ModuleBuilder::new("core")
        .property(DIR_TARGET, "target")
        .property(DIR_REPORTS, "$dir_target/reports")
        .item(Item::task("clean", clean).description("Cleans the generated output."))
        .item(Item::task("prepare", prepare).description("Prepares the project for building."))
        .item(
            Item::task("compile_sources", noop)
                .description("Compiles source files that need compilation.")
                .depends_on("prepare"),
        )
        .item(
            Item::task("run_unit_tests", noop)
                .description("Runs all unit tests.")
                .depends_on("compile_sources"),
        )
        .item(
            Item::task("package", noop)
                .description("Packages the application.")
                .depends_on("compile_sources")
                .depends_on_optional("run_unit_tests"),
        )
        .item(
            Item::task("run_integration_tests", noop)
                .description("Runs integration tests on the packaged application.")
                .depends_on("package"),
        )
        .item(
            Item::task("verify", noop)
                .description("Verifies the project and possibly integration tests.")
                .depends_on("package")
                .depends_on_optional("run_integration_tests"),
        )
        .item(
            Item::task("publish", noop)
                .description("Publishes the project.")
                .depends_on("verify"),
        )
        .item(
            Item::task("install", noop)
                .description("Installs the published project.")
                .depends_on("package")
                .depends_on_optional("publish"),
        )
        .build()
}

fn noop(_: &mut TaskContext<'_>) -> anyhow::Result<()> {
    Ok(())
}

fn clean(ctx: &mut TaskContext<'_>) -> anyhow::Result<()> {
    let target = ctx.project.expand_path(&format!("${DIR_TARGET}"), &[])?;
    if ctx.project.fs().is_dir(&target) {
        ctx.logger().info(format!("Removing target directory {}", target.display()));
        ctx.project
            .fs()
            .remove_dir_all(&target)
            .with_context(|| format!("removing {}", target.display()))?;
    }
    Ok(())
}

fn prepare(ctx: &mut TaskContext<'_>) -> anyhow::Result<()> {
    for property in [DIR_TARGET, DIR_REPORTS] {
        let dir = ctx.project.expand_path(&format!("${property}"), &[])?;
        ctx.logger().debug(format!("Creating {}", dir.display()));
        ctx.project
            .fs()
            .create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}
