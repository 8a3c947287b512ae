#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use pybuild::execution::{ExecutionManager, Exclusions};
use pybuild::registry::{Action, Executable, Task, TaskDependency};

use crate::recorder::Recorder;

/// Builder for `Task` whose body records its name in a [`Recorder`].
pub struct TaskBuilder {
    name: String,
    dependencies: Vec<TaskDependency>,
    description: Option<String>,
    failure: Option<String>,
}

impl TaskBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dependencies: Vec::new(),
            description: None,
            failure: None,
        }
    }

    pub fn depends_on(mut self, dep: &str) -> Self {
        self.dependencies.push(TaskDependency::required(dep));
        self
    }

    pub fn depends_on_optional(mut self, dep: &str) -> Self {
        self.dependencies.push(TaskDependency::optional(dep));
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Make the body fail with `message` after recording.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn build(self, recorder: &Recorder) -> Task {
        let executable = match &self.failure {
            Some(message) => Executable::from_fn(&self.name, recorder.failing_body(&self.name, message)),
            None => Executable::from_fn(&self.name, recorder.body(&self.name)),
        }
        .expect("valid task name");
        let mut task = Task::from_executable(executable).with_dependencies(self.dependencies);
        if let Some(description) = self.description {
            task = task.with_description(description);
        }
        task
    }
}

/// Builder for `Action` whose body records its name in a [`Recorder`].
pub struct ActionBuilder {
    name: String,
    before: Vec<String>,
    after: Vec<String>,
    only_once: bool,
    teardown: bool,
    failure: Option<String>,
}

impl ActionBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            before: Vec::new(),
            after: Vec::new(),
            only_once: false,
            teardown: false,
            failure: None,
        }
    }

    pub fn before(mut self, task: &str) -> Self {
        self.before.push(task.to_string());
        self
    }

    pub fn after(mut self, task: &str) -> Self {
        self.after.push(task.to_string());
        self
    }

    pub fn only_once(mut self) -> Self {
        self.only_once = true;
        self
    }

    pub fn teardown(mut self) -> Self {
        self.teardown = true;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn build(self, recorder: &Recorder) -> Action {
        let executable = match &self.failure {
            Some(message) => Executable::from_fn(&self.name, recorder.failing_body(&self.name, message)),
            None => Executable::from_fn(&self.name, recorder.body(&self.name)),
        }
        .expect("valid action name");
        Action::new(executable)
            .before(self.before)
            .after(self.after)
            .only_once(self.only_once)
            .teardown(self.teardown)
    }
}

/// Register `tasks` and `actions` and resolve with `exclusions`.
pub fn resolved_manager(tasks: Vec<Task>, actions: Vec<Action>, exclusions: Exclusions) -> ExecutionManager {
    let mut manager = ExecutionManager::new();
    for task in tasks {
        manager.register_task(task);
    }
    for action in actions {
        manager.register_action(action);
    }
    manager
        .resolve_dependencies(exclusions)
        .expect("dependencies resolve");
    manager
}

/// Write `build.toml` with `contents` into `dir` and return `dir`.
pub fn write_descriptor(dir: &Path, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create project dir");
    fs::write(dir.join("build.toml"), contents).expect("write build.toml");
    dir.to_path_buf()
}
