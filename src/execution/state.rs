// src/execution/state.rs

//! Mutable per-build bookkeeping.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::registry::TaskDependency;

/// State the runner mutates while a build is in progress.
///
/// Actions are identified by their registration index in the
/// [`TaskRegistry`](crate::execution::TaskRegistry).
#[derive(Debug, Default)]
pub struct ExecutionState {
    actions_executed: HashSet<usize>,
    tasks_executed: Vec<String>,
    current_task: Option<String>,
    current_plan: Vec<String>,
    /// Late dependency edges keyed by the task that receives them.
    pending_dependencies: Vec<(String, Vec<TaskDependency>)>,
    interrupt: Arc<AtomicBool>,
}

impl ExecutionState {
    pub fn tasks_executed(&self) -> &[String] {
        &self.tasks_executed
    }

    pub fn has_executed(&self, task: &str) -> bool {
        self.tasks_executed.iter().any(|t| t == task)
    }

    pub(crate) fn record_task_executed(&mut self, task: &str) {
        if !self.has_executed(task) {
            self.tasks_executed.push(task.to_string());
        }
    }

    pub(crate) fn action_executed(&self, action: usize) -> bool {
        self.actions_executed.contains(&action)
    }

    pub(crate) fn record_action_executed(&mut self, action: usize) {
        self.actions_executed.insert(action);
    }

    pub fn current_task(&self) -> Option<&str> {
        self.current_task.as_deref()
    }

    pub(crate) fn replace_current_task(&mut self, task: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.current_task, task)
    }

    pub fn current_plan(&self) -> &[String] {
        &self.current_plan
    }

    pub fn is_task_in_current_execution_plan(&self, task: &str) -> bool {
        self.current_plan.iter().any(|t| t == task)
    }

    /// Whether both tasks are planned and `first` comes before `second`.
    pub fn is_task_before_in_current_execution_plan(&self, first: &str, second: &str) -> bool {
        let position = |task: &str| self.current_plan.iter().position(|t| t == task);
        match (position(first), position(second)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    pub(crate) fn set_current_plan(&mut self, plan: Vec<String>) {
        self.current_plan = plan;
    }

    /// Merge late dependency edges into the pending buffer.
    pub(crate) fn stage_dependencies(&mut self, dependencies: Vec<(String, Vec<TaskDependency>)>) {
        for (target, deps) in dependencies {
            match self
                .pending_dependencies
                .iter_mut()
                .find(|(name, _)| *name == target)
            {
                Some((_, existing)) => existing.extend(deps),
                None => self.pending_dependencies.push((target, deps)),
            }
        }
    }

    pub fn pending_dependencies(&self) -> &[(String, Vec<TaskDependency>)] {
        &self.pending_dependencies
    }

    pub(crate) fn pending_dependencies_mut(&mut self) -> &mut Vec<(String, Vec<TaskDependency>)> {
        &mut self.pending_dependencies
    }

    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn set_interrupt_flag(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = flag;
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }
}
