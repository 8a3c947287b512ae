// src/execution/plan.rs

//! Execution plan construction.
//!
//! A plan is built by a depth-first walk from each requested task, in the
//! order requested, appending a task only after its (non-omitted)
//! dependencies. Cycle detection runs first over every transitively
//! reachable task, including edges the exclusion policy would omit.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::dag::DependencyGraph;
use crate::errors::{BuildError, Result};
use crate::execution::registry::TaskRegistry;
use crate::execution::state::ExecutionState;
use crate::registry::{Task, TaskDependency};

/// User-selected task exclusions applied while planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    /// Tasks to drop when reached through an optional edge; a required
    /// edge to one of these is an error.
    pub exclude_optional_tasks: Vec<String>,
    /// Tasks to drop whatever the edge kind.
    pub exclude_tasks: Vec<String>,
    /// Drop every optional dependency.
    pub exclude_all_optional: bool,
}

/// Ordered, duplicate-free list of tasks to run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    tasks: Vec<Task>,
}

impl ExecutionPlan {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task: &str) -> bool {
        self.position(task).is_some()
    }

    pub fn position(&self, task: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.name() == task)
    }
}

pub fn build_execution_plan<S: AsRef<str>>(
    registry: &TaskRegistry,
    requested: &[S],
) -> Result<ExecutionPlan> {
    registry.assert_dependencies_resolved()?;

    let mut graph = DependencyGraph::new();
    for task in collect_all_transitive_tasks(registry, requested)? {
        let deps: Vec<&str> = registry
            .resolved_dependencies(task.name())
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        graph.add_node(task.name(), deps);
    }
    graph.assert_no_cycles_present()?;

    let mut tasks = Vec::new();
    for name in requested {
        enqueue_task(registry, &mut tasks, name.as_ref())?;
    }
    Ok(ExecutionPlan { tasks })
}

/// Full plan minus the leading tasks that already ran in this build and
/// were not explicitly requested.
pub fn build_shortest_execution_plan<S: AsRef<str>>(
    registry: &TaskRegistry,
    state: &ExecutionState,
    requested: &[S],
) -> Result<ExecutionPlan> {
    let mut plan = build_execution_plan(registry, requested)?;

    let skip = plan
        .tasks
        .iter()
        .take_while(|task| {
            !requested.iter().any(|r| r.as_ref() == task.name())
                && state.has_executed(task.name())
        })
        .count();
    plan.tasks.drain(..skip);

    if let Some(current) = state.current_task() {
        if plan.contains(current) {
            let requested: Vec<String> = requested.iter().map(|r| r.as_ref().to_string()).collect();
            let message = format!(
                "task '{current}' attempted to invoke tasks {requested:?}, resulting in plan {:?}, creating circular dependency",
                plan.names()
            );
            let mut cycle = vec![current.to_string()];
            cycle.extend(requested);
            return Err(BuildError::CircularTaskDependency {
                message,
                cycles: vec![cycle],
            });
        }
    }

    Ok(plan)
}

/// Every task reachable from `requested` through resolved edges.
fn collect_all_transitive_tasks<'a, S: AsRef<str>>(
    registry: &'a TaskRegistry,
    requested: &[S],
) -> Result<Vec<&'a Task>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut collected = Vec::new();
    let mut stack: Vec<&str> = requested.iter().rev().map(|r| r.as_ref()).collect();

    while let Some(name) = stack.pop() {
        let task = registry.get_task(name)?;
        if !seen.insert(task.name()) {
            continue;
        }
        collected.push(task);
        for dependency in registry.resolved_dependencies(task.name()).iter().rev() {
            stack.push(dependency.name.as_str());
        }
    }

    Ok(collected)
}

fn enqueue_task(registry: &TaskRegistry, plan: &mut Vec<Task>, name: &str) -> Result<()> {
    let task = registry.get_task(name)?;
    if plan.iter().any(|t| t.name() == task.name()) {
        return Ok(());
    }

    for dependency in registry.resolved_dependencies(name) {
        if is_omitted(registry, name, dependency)? {
            continue;
        }
        enqueue_task(registry, plan, &dependency.name)?;
    }

    plan.push(task.clone());
    Ok(())
}

fn is_omitted(registry: &TaskRegistry, task: &str, dependency: &TaskDependency) -> Result<bool> {
    let exclusions = registry.exclusions();
    let name = &dependency.name;

    if dependency.optional {
        if exclusions.exclude_all_optional
            || exclusions.exclude_optional_tasks.contains(name)
            || exclusions.exclude_tasks.contains(name)
        {
            info!(task = %task, dependency = %name, "optional task dependency excluded");
            return Ok(true);
        }
        return Ok(false);
    }

    if exclusions.exclude_optional_tasks.contains(name) {
        return Err(BuildError::RequiredTaskExclusion {
            task: task.to_string(),
            dependency: name.clone(),
        });
    }
    if exclusions.exclude_tasks.contains(name) {
        warn!(task = %task, dependency = %name, "required task dependency excluded");
        return Ok(true);
    }
    Ok(false)
}
