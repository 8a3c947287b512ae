// src/project/validate.rs

use std::collections::HashSet;

use crate::project::model::Project;

impl Project {
    /// Human-readable validation messages; empty means valid.
    ///
    /// Entries are unique by `(name, version, url)`, so the same name with
    /// two different versions counts as defined twice.
    pub fn validate(&self) -> Vec<String> {
        let mut messages = Vec::new();

        let mut build_names = HashSet::new();
        for dependency in &self.build_dependencies {
            if !build_names.insert(dependency.name()) {
                messages.push(format!(
                    "Build dependency '{}' has been defined multiple times.",
                    dependency.name()
                ));
            }
        }

        let mut runtime_names = HashSet::new();
        for dependency in &self.dependencies {
            if !runtime_names.insert(dependency.name()) {
                messages.push(format!(
                    "Runtime dependency '{}' has been defined multiple times.",
                    dependency.name()
                ));
            }
            if build_names.contains(dependency.name()) {
                messages.push(format!(
                    "Runtime dependency '{}' has also been given as build dependency.",
                    dependency.name()
                ));
            }
        }

        messages
    }
}
