// src/registry/context.rs

//! Invocation context handed to every task, action and hook body.
//!
//! The context replaces parameter-name injection: a body always receives
//! the project, a logger and (when run by the execution manager) a handle on
//! the running build. Executables may still declare which of these they
//! need; [`TaskContext::binds`] answers whether a declared name is available.

use std::fmt::Display;

use tracing::{debug, error, info, warn};

use crate::errors::{BuildError, Result};
use crate::execution::{ReactorHandle, TaskExecutionSummary};
use crate::project::Project;
use crate::registry::task::TaskDependency;

pub const PROJECT: &str = "project";
pub const LOGGER: &str = "logger";
pub const REACTOR: &str = "reactor";

/// `tracing` facade that tags every message with the running item.
#[derive(Debug, Clone)]
pub struct TaskLogger {
    name: String,
}

impl TaskLogger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: impl Display) {
        debug!(task = %self.name, "{message}");
    }

    pub fn info(&self, message: impl Display) {
        info!(task = %self.name, "{message}");
    }

    pub fn warn(&self, message: impl Display) {
        warn!(task = %self.name, "{message}");
    }

    pub fn error(&self, message: impl Display) {
        error!(task = %self.name, "{message}");
    }
}

pub struct TaskContext<'a> {
    pub project: &'a mut Project,
    logger: TaskLogger,
    reactor: Option<ReactorHandle<'a>>,
}

impl<'a> TaskContext<'a> {
    pub fn new(
        project: &'a mut Project,
        logger: TaskLogger,
        reactor: Option<ReactorHandle<'a>>,
    ) -> Self {
        Self {
            project,
            logger,
            reactor,
        }
    }

    /// Context without a running build, e.g. for invoking a single
    /// executable directly.
    pub fn detached(project: &'a mut Project, name: impl Into<String>) -> Self {
        Self::new(project, TaskLogger::new(name), None)
    }

    /// Whether a parameter of this name can be bound.
    pub fn binds(&self, parameter: &str) -> bool {
        match parameter {
            PROJECT | LOGGER => true,
            REACTOR => self.reactor.is_some(),
            _ => false,
        }
    }

    pub fn logger(&self) -> &TaskLogger {
        &self.logger
    }

    pub fn reactor(&self) -> Option<&ReactorHandle<'a>> {
        self.reactor.as_ref()
    }

    pub fn reactor_mut(&mut self) -> Option<&mut ReactorHandle<'a>> {
        self.reactor.as_mut()
    }

    /// Whether `task` is part of the plan currently being executed.
    pub fn is_task_in_current_execution_plan(&self, task: &str) -> bool {
        self.reactor
            .as_ref()
            .is_some_and(|r| r.is_task_in_current_execution_plan(task))
    }

    /// Whether `first` precedes `second` in the current plan.
    pub fn is_task_before_in_current_execution_plan(&self, first: &str, second: &str) -> bool {
        self.reactor
            .as_ref()
            .is_some_and(|r| r.is_task_before_in_current_execution_plan(first, second))
    }

    /// Stage dependency edges for tasks that may not be registered yet.
    ///
    /// Valid while a build is running, but the current plan is not rebuilt.
    pub fn register_late_task_dependencies(
        &mut self,
        dependencies: Vec<(String, Vec<TaskDependency>)>,
    ) -> Result<()> {
        let reactor = self.reactor.as_mut().ok_or_else(no_reactor)?;
        reactor.register_late_task_dependencies(dependencies);
        Ok(())
    }

    /// Run `tasks` (and whatever they need that has not run yet) from
    /// inside the current task.
    pub fn execute_tasks(&mut self, tasks: &[&str]) -> Result<Vec<TaskExecutionSummary>> {
        let reactor = self.reactor.as_mut().ok_or_else(no_reactor)?;
        reactor.execute_tasks(&mut *self.project, tasks)
    }
}

fn no_reactor() -> BuildError {
    BuildError::BuildFailed("no build is running in this context".to_string())
}
