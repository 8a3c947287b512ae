// src/reactor/task_list.rs

//! Command-line task specifiers.
//!
//! Bare names replace the default task list, `+name` appends to the
//! effective list and `^name` removes from it (silently when absent).

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSpecifier {
    New(String),
    Append(String),
    Remove(String),
}

impl TaskSpecifier {
    pub fn parse(spec: &str) -> Self {
        if let Some(name) = spec.strip_prefix('+') {
            TaskSpecifier::Append(name.to_string())
        } else if let Some(name) = spec.strip_prefix('^') {
            TaskSpecifier::Remove(name.to_string())
        } else {
            TaskSpecifier::New(spec.to_string())
        }
    }
}

/// Effective task list for `specifiers` given the project's default tasks.
pub fn expand_task_list<S: AsRef<str>>(specifiers: &[S], default_tasks: &[String]) -> Vec<String> {
    let parsed: Vec<TaskSpecifier> = specifiers
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(TaskSpecifier::parse)
        .collect();

    let new_tasks: Vec<String> = parsed
        .iter()
        .filter_map(|s| match s {
            TaskSpecifier::New(name) => Some(name.clone()),
            _ => None,
        })
        .collect();

    let mut tasks = if new_tasks.is_empty() {
        default_tasks.to_vec()
    } else {
        new_tasks
    };

    for spec in &parsed {
        if let TaskSpecifier::Append(name) = spec {
            if !tasks.contains(name) {
                tasks.push(name.clone());
            }
        }
    }
    for spec in &parsed {
        if let TaskSpecifier::Remove(name) = spec {
            tasks.retain(|t| t != name);
        }
    }

    tasks
}
