// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::reactor::BuildOptions;

/// Command-line arguments for `pyb`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pyb",
    version,
    about = "Dependency-driven, plugin-based build automation.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to run.
    ///
    /// Bare names replace the project's default tasks, `+name` appends a
    /// task and `^name` removes one.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Project directory containing `build.toml`.
    #[arg(short = 'D', long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Set a project property, overriding the descriptor.
    #[arg(short = 'P', value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Activate an environment (repeatable).
    #[arg(short = 'E', long = "environment", value_name = "ENV")]
    pub environments: Vec<String>,

    /// Exclude a task from the plan.
    #[arg(short = 'x', long = "exclude", value_name = "TASK")]
    pub exclude: Vec<String>,

    /// Exclude a task when it is only an optional dependency.
    #[arg(short = 'o', long = "exclude-optional", value_name = "TASK")]
    pub exclude_optional: Vec<String>,

    /// Exclude every optional dependency.
    #[arg(long)]
    pub exclude_all_optional: bool,

    /// Never install missing plugins.
    #[arg(long)]
    pub offline: bool,

    /// Do not create the plugin environment.
    #[arg(long)]
    pub no_venvs: bool,

    /// Delete installed plugins before the build.
    #[arg(long)]
    pub reset_plugins: bool,

    /// List registered tasks and exit.
    #[arg(short = 't', long)]
    pub list_tasks: bool,

    /// Print the execution plan and exit.
    #[arg(short = 'T', long)]
    pub list_plan_tasks: bool,

    /// Shorthand for `--log-level debug`.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PYB_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Level requested on the command line, if any.
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        self.log_level
            .or(self.verbose.then_some(LogLevel::Debug))
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            project_dir: self.project_dir.clone(),
            property_overrides: self.properties.clone(),
            exclude_optional_tasks: self.exclude_optional.clone(),
            exclude_tasks: self.exclude.clone(),
            exclude_all_optional: self.exclude_all_optional,
            offline: self.offline,
            no_venvs: self.no_venvs,
            reset_plugins: self.reset_plugins,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty property name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
