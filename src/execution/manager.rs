// src/execution/manager.rs

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::errors::Result;
use crate::execution::plan::{self, ExecutionPlan, Exclusions};
use crate::execution::registry::TaskRegistry;
use crate::execution::runner::{self, TaskExecutionSummary};
use crate::execution::state::ExecutionState;
use crate::project::Project;
use crate::registry::{Action, Finalizer, Initializer, Task, TaskDependency};

/// Holds the registry and drives resolution, planning and execution.
///
/// Registration happens while the descriptor and plugins are collected.
/// [`resolve_dependencies`](Self::resolve_dependencies) then freezes the
/// dependency view; every planning and execution call before that fails
/// with `DependenciesNotResolved`.
#[derive(Debug, Default)]
pub struct ExecutionManager {
    registry: TaskRegistry,
    state: ExecutionState,
}

impl ExecutionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_task(&mut self, task: Task) {
        self.registry.register_task(task);
        self.registry
            .flush_late_dependencies(self.state.pending_dependencies_mut());
    }

    pub fn register_action(&mut self, action: Action) {
        self.registry.register_action(action);
    }

    pub fn register_initializer(&mut self, initializer: Initializer) {
        self.registry.register_initializer(initializer);
    }

    pub fn register_finalizer(&mut self, finalizer: Finalizer) {
        self.registry.register_finalizer(finalizer);
    }

    /// Stage dependency edges keyed by the task that receives them; edges
    /// for tasks that are already registered are injected immediately.
    pub fn register_late_task_dependencies(&mut self, dependencies: Vec<(String, Vec<TaskDependency>)>) {
        self.state.stage_dependencies(dependencies);
        self.registry
            .flush_late_dependencies(self.state.pending_dependencies_mut());
    }

    /// Targets of staged late dependencies that are not registered yet.
    pub fn pending_late_dependencies(&self) -> Vec<&str> {
        self.state
            .pending_dependencies()
            .iter()
            .map(|(target, _)| target.as_str())
            .collect()
    }

    pub fn resolve_dependencies(&mut self, exclusions: Exclusions) -> Result<()> {
        self.registry
            .resolve(exclusions, self.state.pending_dependencies_mut())
    }

    pub fn dependencies_resolved(&self) -> bool {
        self.registry.dependencies_resolved()
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.registry.has_task(name)
    }

    pub fn get_task(&self, name: &str) -> Result<&Task> {
        self.registry.get_task(name)
    }

    pub fn tasks(&self) -> &[Task] {
        self.registry.tasks()
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.registry.tasks().iter().map(Task::name).collect()
    }

    pub fn resolved_dependencies(&self, task: &str) -> &[TaskDependency] {
        self.registry.resolved_dependencies(task)
    }

    pub fn build_execution_plan<S: AsRef<str>>(&self, tasks: &[S]) -> Result<ExecutionPlan> {
        plan::build_execution_plan(&self.registry, tasks)
    }

    pub fn build_shortest_execution_plan<S: AsRef<str>>(&self, tasks: &[S]) -> Result<ExecutionPlan> {
        plan::build_shortest_execution_plan(&self.registry, &self.state, tasks)
    }

    pub fn execute_task(&mut self, project: &mut Project, task: &Task) -> Result<TaskExecutionSummary> {
        runner::execute_task(&self.registry, &mut self.state, project, task)
    }

    pub fn execute_execution_plan(
        &mut self,
        project: &mut Project,
        plan: &ExecutionPlan,
    ) -> Result<Vec<TaskExecutionSummary>> {
        runner::execute_execution_plan(&self.registry, &mut self.state, project, plan)
    }

    pub fn execute_initializers(&mut self, project: &mut Project, environments: &[String]) -> Result<()> {
        runner::execute_initializers(&self.registry, &mut self.state, project, environments)
    }

    pub fn execute_finalizers(&mut self, project: &mut Project, environments: &[String]) -> Result<()> {
        runner::execute_finalizers(&self.registry, &mut self.state, project, environments)
    }

    pub fn is_task_in_current_execution_plan(&self, task: &str) -> bool {
        self.state.is_task_in_current_execution_plan(task)
    }

    pub fn is_task_before_in_current_execution_plan(&self, first: &str, second: &str) -> bool {
        self.state.is_task_before_in_current_execution_plan(first, second)
    }

    pub fn tasks_executed(&self) -> &[String] {
        self.state.tasks_executed()
    }

    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.state.interrupt_flag()
    }

    pub fn set_interrupt_flag(&mut self, flag: Arc<AtomicBool>) {
        self.state.set_interrupt_flag(flag);
    }
}
