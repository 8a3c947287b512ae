// src/registry/action.rs

use crate::registry::executable::Executable;

/// An executable that runs before and/or after named tasks.
///
/// - `only_once`: run at most once per build, however many tasks list it.
/// - `teardown`: as an after-action, still run when the task failed.
#[derive(Debug, Clone)]
pub struct Action {
    pub executable: Executable,
    pub execute_before: Vec<String>,
    pub execute_after: Vec<String>,
    pub only_once: bool,
    pub teardown: bool,
}

impl Action {
    pub fn new(executable: Executable) -> Self {
        Self {
            executable,
            execute_before: Vec::new(),
            execute_after: Vec::new(),
            only_once: false,
            teardown: false,
        }
    }

    pub fn before<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute_before.extend(tasks.into_iter().map(Into::into));
        self
    }

    pub fn after<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute_after.extend(tasks.into_iter().map(Into::into));
        self
    }

    pub fn only_once(mut self, only_once: bool) -> Self {
        self.only_once = only_once;
        self
    }

    pub fn teardown(mut self, teardown: bool) -> Self {
        self.teardown = teardown;
        self
    }

    pub fn name(&self) -> &str {
        self.executable.name()
    }
}
