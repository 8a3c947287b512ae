// src/registry/task.rs

use tracing::debug;

use crate::errors::Result;
use crate::registry::context::TaskContext;
use crate::registry::executable::{Callable, Executable};

/// Edge from a task to another task, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDependency {
    pub name: String,
    pub optional: bool,
}

impl TaskDependency {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }
}

/// A named unit of work.
///
/// A task owns one or more executables. Plugins and the descriptor may each
/// contribute a task under the same name; the execution manager then
/// [`extend`](Task::extend)s the first registration with the later ones so
/// that every contribution runs, in registration order.
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    executables: Vec<Executable>,
    dependencies: Vec<TaskDependency>,
    description: Vec<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, body: Callable) -> Result<Self> {
        Ok(Self::from_executable(Executable::new(name, body)?))
    }

    /// Convenience constructor taking a closure.
    pub fn from_fn<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Ok(Self::from_executable(Executable::from_fn(name, body)?))
    }

    pub fn from_executable(executable: Executable) -> Self {
        let description = if executable.description().is_empty() {
            Vec::new()
        } else {
            vec![executable.description().to_string()]
        };
        Self {
            name: executable.name().to_string(),
            executables: vec![executable],
            dependencies: Vec::new(),
            description,
        }
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(TaskDependency::required(name));
        self
    }

    pub fn depends_on_optional(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(TaskDependency::optional(name));
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<TaskDependency>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description.push(description.into());
        self
    }

    /// Replace the descriptions, one entry per description string.
    pub fn with_descriptions(mut self, descriptions: impl IntoIterator<Item = String>) -> Self {
        self.description = descriptions.into_iter().collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executables(&self) -> &[Executable] {
        &self.executables
    }

    pub fn dependencies(&self) -> &[TaskDependency] {
        &self.dependencies
    }

    pub(crate) fn add_dependencies(&mut self, dependencies: impl IntoIterator<Item = TaskDependency>) {
        self.dependencies.extend(dependencies);
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    /// Append the executables, dependencies and descriptions of `other`.
    pub fn extend(&mut self, other: Task) {
        debug!(
            task = %self.name,
            executables = other.executables.len(),
            "extending task"
        );
        self.executables.extend(other.executables);
        self.dependencies.extend(other.dependencies);
        self.description.extend(other.description);
    }

    /// Run the executables in accumulation order, or only the one at
    /// index `only` when given.
    pub fn execute(&self, ctx: &mut TaskContext<'_>, only: Option<usize>) -> Result<()> {
        for (index, executable) in self.executables.iter().enumerate() {
            if only.is_some_and(|only| only != index) {
                continue;
            }
            ctx.logger().debug(format!("executing '{}'", executable.name()));
            executable.execute(ctx)?;
        }
        Ok(())
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Task {}
