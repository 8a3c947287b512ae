// src/registry/hooks.rs

//! Initializers and finalizers.
//!
//! Both run once per build; an empty environment list means "always",
//! otherwise at least one active environment has to match.

use crate::registry::executable::Executable;

fn applies_to(environments: &[String], active: &[String]) -> bool {
    environments.is_empty() || environments.iter().any(|env| active.contains(env))
}

#[derive(Debug, Clone)]
pub struct Initializer {
    pub executable: Executable,
    pub environments: Vec<String>,
}

impl Initializer {
    pub fn new(executable: Executable) -> Self {
        Self {
            executable,
            environments: Vec::new(),
        }
    }

    pub fn environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = environments.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_applicable(&self, active: &[String]) -> bool {
        applies_to(&self.environments, active)
    }

    pub fn name(&self) -> &str {
        self.executable.name()
    }
}

#[derive(Debug, Clone)]
pub struct Finalizer {
    pub executable: Executable,
    pub environments: Vec<String>,
}

impl Finalizer {
    pub fn new(executable: Executable) -> Self {
        Self {
            executable,
            environments: Vec::new(),
        }
    }

    pub fn environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = environments.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_applicable(&self, active: &[String]) -> bool {
        applies_to(&self.environments, active)
    }

    pub fn name(&self) -> &str {
        self.executable.name()
    }
}
