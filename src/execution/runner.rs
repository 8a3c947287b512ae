// src/execution/runner.rs

//! Plan execution.
//!
//! Within a task: before-actions in registration order, then the task's
//! executables in accumulation order, then after-actions in registration
//! order. A failing before-action stops the task at once. When any
//! after-action of the task is a teardown, later failures are held back
//! until the teardowns ran. Failures after the first are logged as
//! suppressed and never replace it.

use std::time::Instant;

use tracing::{debug, error, info};

use crate::errors::{BuildError, Result};
use crate::execution::plan::{build_shortest_execution_plan, ExecutionPlan};
use crate::execution::registry::TaskRegistry;
use crate::execution::state::ExecutionState;
use crate::project::Project;
use crate::registry::{Action, Task, TaskContext, TaskDependency, TaskLogger};

/// Outcome of a successfully executed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskExecutionSummary {
    pub task: String,
    pub number_of_actions: usize,
    pub execution_time_millis: u128,
}

/// The `reactor` binding of a [`TaskContext`]: read access to the
/// registry and write access to the running build's state.
pub struct ReactorHandle<'a> {
    registry: &'a TaskRegistry,
    state: &'a mut ExecutionState,
}

impl<'a> ReactorHandle<'a> {
    pub fn new(registry: &'a TaskRegistry, state: &'a mut ExecutionState) -> Self {
        Self { registry, state }
    }

    pub fn registry(&self) -> &TaskRegistry {
        self.registry
    }

    pub fn current_task(&self) -> Option<&str> {
        self.state.current_task()
    }

    pub fn is_task_in_current_execution_plan(&self, task: &str) -> bool {
        self.state.is_task_in_current_execution_plan(task)
    }

    pub fn is_task_before_in_current_execution_plan(&self, first: &str, second: &str) -> bool {
        self.state.is_task_before_in_current_execution_plan(first, second)
    }

    pub fn register_late_task_dependencies(&mut self, dependencies: Vec<(String, Vec<TaskDependency>)>) {
        self.state.stage_dependencies(dependencies);
    }

    /// Execute the shortest plan for `tasks` without replacing the plan
    /// currently being executed.
    pub fn execute_tasks(
        &mut self,
        project: &mut Project,
        tasks: &[&str],
    ) -> Result<Vec<TaskExecutionSummary>> {
        let plan = build_shortest_execution_plan(self.registry, &*self.state, tasks)?;
        info!(requested = ?tasks, plan = ?plan.names(), "executing nested plan");
        execute_tasks(self.registry, &mut *self.state, project, plan.tasks())
    }
}

pub(crate) fn execute_execution_plan(
    registry: &TaskRegistry,
    state: &mut ExecutionState,
    project: &mut Project,
    plan: &ExecutionPlan,
) -> Result<Vec<TaskExecutionSummary>> {
    registry.assert_dependencies_resolved()?;
    state.set_current_plan(plan.names());
    execute_tasks(registry, state, project, plan.tasks())
}

fn execute_tasks(
    registry: &TaskRegistry,
    state: &mut ExecutionState,
    project: &mut Project,
    tasks: &[Task],
) -> Result<Vec<TaskExecutionSummary>> {
    let mut summaries = Vec::with_capacity(tasks.len());
    for task in tasks {
        if state.is_interrupted() {
            return Err(BuildError::aborted());
        }
        summaries.push(execute_task(registry, state, project, task)?);
    }
    Ok(summaries)
}

pub(crate) fn execute_task(
    registry: &TaskRegistry,
    state: &mut ExecutionState,
    project: &mut Project,
    task: &Task,
) -> Result<TaskExecutionSummary> {
    registry.assert_dependencies_resolved()?;

    info!(task = %task.name(), "executing task");
    let started = Instant::now();
    let previous_task = state.replace_current_task(Some(task.name().to_string()));

    let after_actions = registry.after_actions(task.name());
    let has_teardowns = after_actions.iter().any(|(_, action)| action.teardown);

    let mut number_of_actions = 0;
    let mut task_error: Option<BuildError> = None;
    let mut suppressed: Vec<(&str, BuildError)> = Vec::new();

    for (id, action) in registry.before_actions(task.name()) {
        match execute_action(registry, state, project, id, action) {
            Ok(true) => number_of_actions += 1,
            Ok(false) => {}
            Err(err) => {
                state.replace_current_task(previous_task);
                return Err(err);
            }
        }
    }

    if let Err(err) = run_body(registry, state, project, task) {
        if !has_teardowns {
            state.replace_current_task(previous_task);
            return Err(err);
        }
        task_error = Some(err);
    }

    for (id, action) in after_actions {
        if task_error.is_some() && !action.teardown {
            continue;
        }
        match execute_action(registry, state, project, id, action) {
            Ok(true) => number_of_actions += 1,
            Ok(false) => {}
            Err(err) if !has_teardowns => {
                state.replace_current_task(previous_task);
                return Err(err);
            }
            Err(err) => {
                if task_error.is_some() {
                    suppressed.push((action.name(), err));
                } else {
                    task_error = Some(err);
                }
            }
        }
    }

    for (action, err) in &suppressed {
        error!(
            task = %task.name(),
            action = %action,
            error = %err,
            "executing action resulted in an error that was suppressed"
        );
    }

    state.replace_current_task(previous_task);
    if let Some(err) = task_error {
        return Err(err);
    }

    state.record_task_executed(task.name());
    let execution_time_millis = started.elapsed().as_millis();
    debug!(task = %task.name(), number_of_actions, execution_time_millis, "task finished");

    Ok(TaskExecutionSummary {
        task: task.name().to_string(),
        number_of_actions,
        execution_time_millis,
    })
}

fn run_body(
    registry: &TaskRegistry,
    state: &mut ExecutionState,
    project: &mut Project,
    task: &Task,
) -> Result<()> {
    let mut ctx = TaskContext::new(
        project,
        TaskLogger::new(task.name()),
        Some(ReactorHandle::new(registry, state)),
    );
    task.execute(&mut ctx, None)
}

/// Run `action` unless it is `only_once` and already ran. Returns whether
/// it ran.
fn execute_action(
    registry: &TaskRegistry,
    state: &mut ExecutionState,
    project: &mut Project,
    id: usize,
    action: &Action,
) -> Result<bool> {
    if action.only_once && state.action_executed(id) {
        debug!(
            action = %action.name(),
            "action already executed and marked only_once; skipping"
        );
        return Ok(false);
    }

    debug!(action = %action.name(), "executing action");
    {
        let mut ctx = TaskContext::new(
            project,
            TaskLogger::new(action.name()),
            Some(ReactorHandle::new(registry, state)),
        );
        action.executable.execute(&mut ctx)?;
    }
    state.record_action_executed(id);
    Ok(true)
}

/// Run applicable initializers in registration order.
pub(crate) fn execute_initializers(
    registry: &TaskRegistry,
    state: &mut ExecutionState,
    project: &mut Project,
    environments: &[String],
) -> Result<()> {
    for initializer in registry.initializers() {
        if !initializer.is_applicable(environments) {
            debug!(
                initializer = %initializer.name(),
                environments = ?initializer.environments,
                "initializer not applicable in active environments"
            );
            continue;
        }
        debug!(initializer = %initializer.name(), "executing initializer");
        let mut ctx = TaskContext::new(
            project,
            TaskLogger::new(initializer.name()),
            Some(ReactorHandle::new(registry, state)),
        );
        initializer.executable.execute(&mut ctx)?;
    }
    Ok(())
}

/// Run applicable finalizers in reverse registration order.
///
/// Every applicable finalizer runs; the first failure is returned once all
/// of them had their turn, later ones are logged.
pub(crate) fn execute_finalizers(
    registry: &TaskRegistry,
    state: &mut ExecutionState,
    project: &mut Project,
    environments: &[String],
) -> Result<()> {
    let mut first_error: Option<BuildError> = None;

    for finalizer in registry.finalizers().iter().rev() {
        if !finalizer.is_applicable(environments) {
            continue;
        }
        debug!(finalizer = %finalizer.name(), "executing finalizer");
        let mut ctx = TaskContext::new(
            project,
            TaskLogger::new(finalizer.name()),
            Some(ReactorHandle::new(registry, state)),
        );
        if let Err(err) = finalizer.executable.execute(&mut ctx) {
            if first_error.is_some() {
                error!(finalizer = %finalizer.name(), error = %err, "finalizer failed");
            } else {
                first_error = Some(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
