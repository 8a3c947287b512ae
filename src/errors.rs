// src/errors.rs

//! Crate-wide error type.
//!
//! Every failure the engine can report has its own variant so callers (and
//! tests) can match on the kind instead of parsing messages. Errors raised
//! inside task bodies travel as `anyhow::Error` through [`BuildError::Task`]
//! so their original chain survives teardown handling untouched.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("'{0}' is not a valid name: must match [A-Za-z_][A-Za-z0-9_]+")]
    InvalidName(String),

    #[error("executable '{executable}' declares parameter '{parameter}' which is not available")]
    InvalidParameter {
        executable: String,
        parameter: String,
    },

    #[error("'{0}' must be either a release version or a version specifier set")]
    InvalidVersion(String),

    #[error("Plugin not found: {0}")]
    MissingPlugin(String),

    #[error("Plugin name not specified for '{0}'")]
    UnspecifiedPluginName(String),

    #[error("Plugin '{plugin}' requires core version {required} but this is {actual}")]
    IncompatiblePlugin {
        plugin: String,
        required: String,
        actual: String,
    },

    #[error("Task '{task}' depends on '{dependency}' which does not exist")]
    MissingTaskDependency { task: String, dependency: String },

    #[error("Action '{action}' depends on task '{task}' which does not exist")]
    MissingActionDependency { action: String, task: String },

    #[error("Task '{dependency}' is required by '{task}' and cannot be excluded")]
    RequiredTaskExclusion { task: String, dependency: String },

    #[error("No such task: {0}")]
    NoSuchTask(String),

    #[error("Circular task dependency: {message}")]
    CircularTaskDependency {
        message: String,
        cycles: Vec<Vec<String>>,
    },

    #[error("Task dependencies have not been resolved")]
    DependenciesNotResolved,

    #[error("No such property: {0}")]
    MissingProperty(String),

    #[error("Project validation failed: {}", .0.join("; "))]
    ProjectValidationFailed(Vec<String>),

    #[error("No default task given")]
    NoDefaultTask,

    #[error("Cannot find {0}")]
    CannotFind(PathBuf),

    #[error("Cannot load build descriptor {path}: {reason}")]
    CannotLoadDescriptor { path: PathBuf, reason: String },

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Task(#[from] anyhow::Error),
}

impl BuildError {
    /// Circular dependency error carrying the detected cycles.
    pub fn circular(cycles: Vec<Vec<String>>) -> Self {
        let message = cycles
            .iter()
            .map(|cycle| format!("[{}]", cycle.join(", ")))
            .collect::<Vec<_>>()
            .join(", ");
        BuildError::CircularTaskDependency { message, cycles }
    }

    /// The "build aborted" failure used when the user interrupts a build.
    pub fn aborted() -> Self {
        BuildError::BuildFailed("build aborted".to_string())
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
