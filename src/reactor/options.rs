// src/reactor/options.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::execution::{Exclusions, TaskExecutionSummary};

/// Everything `prepare_build` needs to know.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub project_dir: PathBuf,
    /// `key=value` overrides applied after the descriptor, in order.
    pub property_overrides: Vec<(String, String)>,
    pub exclude_optional_tasks: Vec<String>,
    pub exclude_tasks: Vec<String>,
    pub exclude_all_optional: bool,
    /// Never install plugins.
    pub offline: bool,
    /// Do not create the plugin environment.
    pub no_venvs: bool,
    /// Delete the plugin environment before loading plugins.
    pub reset_plugins: bool,
}

impl BuildOptions {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    pub fn exclusions(&self) -> Exclusions {
        Exclusions {
            exclude_optional_tasks: self.exclude_optional_tasks.clone(),
            exclude_tasks: self.exclude_tasks.clone(),
            exclude_all_optional: self.exclude_all_optional,
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub project_name: String,
    pub project_version: String,
    pub tasks: Vec<TaskExecutionSummary>,
    pub elapsed: Duration,
}

impl BuildSummary {
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.task.as_str()).collect()
    }
}
