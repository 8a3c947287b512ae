// src/execution/registry.rs

use std::collections::HashMap;

use tracing::{debug, info};

use crate::errors::{BuildError, Result};
use crate::execution::plan::Exclusions;
use crate::registry::{Action, Finalizer, Initializer, Task, TaskDependency};

/// Everything registered for a build, plus the resolved dependency view.
///
/// Tasks keep registration order. Before resolution only `tasks`,
/// `actions`, `initializers` and `finalizers` are meaningful; resolution
/// fills the per-task action buckets and dependency lists.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    actions: Vec<Action>,
    before_actions: HashMap<String, Vec<usize>>,
    after_actions: HashMap<String, Vec<usize>>,
    resolved_dependencies: HashMap<String, Vec<TaskDependency>>,
    initializers: Vec<Initializer>,
    finalizers: Vec<Finalizer>,
    exclusions: Exclusions,
    dependencies_resolved: bool,
}

impl TaskRegistry {
    /// Store a new task or extend the one already registered under its name.
    pub fn register_task(&mut self, task: Task) {
        match self.index.get(task.name()) {
            Some(&i) => self.tasks[i].extend(task),
            None => {
                debug!(task = %task.name(), "registering task");
                self.index.insert(task.name().to_string(), self.tasks.len());
                self.tasks.push(task);
            }
        }
    }

    pub fn register_action(&mut self, action: Action) {
        debug!(
            action = %action.name(),
            before = ?action.execute_before,
            after = ?action.execute_after,
            "registering action"
        );
        self.actions.push(action);
    }

    pub fn register_initializer(&mut self, initializer: Initializer) {
        debug!(initializer = %initializer.name(), "registering initializer");
        self.initializers.push(initializer);
    }

    pub fn register_finalizer(&mut self, finalizer: Finalizer) {
        debug!(finalizer = %finalizer.name(), "registering finalizer");
        self.finalizers.push(finalizer);
    }

    /// Move pending edges whose target task is now registered into that
    /// task's dependency list.
    pub(crate) fn flush_late_dependencies(
        &mut self,
        pending: &mut Vec<(String, Vec<TaskDependency>)>,
    ) {
        pending.retain_mut(|(target, deps)| match self.index.get(target.as_str()) {
            Some(&i) => {
                debug!(task = %target, dependencies = ?deps, "injecting late dependencies");
                self.tasks[i].add_dependencies(deps.drain(..));
                false
            }
            None => true,
        });
    }

    /// Resolve every declared dependency and action hook against the
    /// registered tasks.
    pub(crate) fn resolve(
        &mut self,
        exclusions: Exclusions,
        pending: &mut Vec<(String, Vec<TaskDependency>)>,
    ) -> Result<()> {
        self.flush_late_dependencies(pending);
        if let Some((target, _)) = pending.first() {
            return Err(BuildError::NoSuchTask(target.clone()));
        }

        self.before_actions.clear();
        self.after_actions.clear();
        self.resolved_dependencies.clear();
        for task in &self.tasks {
            self.before_actions.insert(task.name().to_string(), Vec::new());
            self.after_actions.insert(task.name().to_string(), Vec::new());
            self.resolved_dependencies
                .insert(task.name().to_string(), Vec::new());
        }

        for task in &self.tasks {
            for dependency in task.dependencies() {
                if !self.index.contains_key(&dependency.name) {
                    return Err(BuildError::MissingTaskDependency {
                        task: task.name().to_string(),
                        dependency: dependency.name.clone(),
                    });
                }

                let resolved = self
                    .resolved_dependencies
                    .entry(task.name().to_string())
                    .or_default();

                match resolved.iter_mut().find(|d| d.name == dependency.name) {
                    Some(existing) if existing.optional != dependency.optional => {
                        if existing.optional {
                            info!(
                                task = %task.name(),
                                dependency = %dependency.name,
                                "dependency declared both optional and required; promoting to required"
                            );
                            existing.optional = false;
                        } else {
                            info!(
                                task = %task.name(),
                                dependency = %dependency.name,
                                "dependency declared both required and optional; keeping required"
                            );
                        }
                    }
                    Some(_) => {}
                    None => resolved.push(dependency.clone()),
                }
            }
        }

        for (id, action) in self.actions.iter().enumerate() {
            for task in &action.execute_before {
                let bucket = self.before_actions.get_mut(task).ok_or_else(|| {
                    BuildError::MissingActionDependency {
                        action: action.name().to_string(),
                        task: task.clone(),
                    }
                })?;
                bucket.push(id);
            }
            for task in &action.execute_after {
                let bucket = self.after_actions.get_mut(task).ok_or_else(|| {
                    BuildError::MissingActionDependency {
                        action: action.name().to_string(),
                        task: task.clone(),
                    }
                })?;
                bucket.push(id);
            }
        }

        self.exclusions = exclusions;
        self.dependencies_resolved = true;
        Ok(())
    }

    pub fn dependencies_resolved(&self) -> bool {
        self.dependencies_resolved
    }

    pub fn assert_dependencies_resolved(&self) -> Result<()> {
        if self.dependencies_resolved {
            Ok(())
        } else {
            Err(BuildError::DependenciesNotResolved)
        }
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    /// Look up a task, failing with [`BuildError::NoSuchTask`].
    pub fn get_task(&self, name: &str) -> Result<&Task> {
        self.task(name)
            .ok_or_else(|| BuildError::NoSuchTask(name.to_string()))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    pub fn finalizers(&self) -> &[Finalizer] {
        &self.finalizers
    }

    /// Resolved dependencies of `task` (empty before resolution).
    pub fn resolved_dependencies(&self, task: &str) -> &[TaskDependency] {
        self.resolved_dependencies
            .get(task)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Before-actions of `task` with their registration index.
    pub fn before_actions(&self, task: &str) -> Vec<(usize, &Action)> {
        self.actions_in(&self.before_actions, task)
    }

    /// After-actions of `task` with their registration index.
    pub fn after_actions(&self, task: &str) -> Vec<(usize, &Action)> {
        self.actions_in(&self.after_actions, task)
    }

    fn actions_in<'a>(
        &'a self,
        buckets: &'a HashMap<String, Vec<usize>>,
        task: &str,
    ) -> Vec<(usize, &'a Action)> {
        buckets
            .get(task)
            .map(|ids| ids.iter().map(|&id| (id, &self.actions[id])).collect())
            .unwrap_or_default()
    }
}
