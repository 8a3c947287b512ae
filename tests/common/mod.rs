#![allow(dead_code)]

use std::path::Path;

use pybuild::project::Project;

pub use pybuild_test_utils::builders::{resolved_manager, write_descriptor, ActionBuilder, TaskBuilder};
pub use pybuild_test_utils::init_tracing;
pub use pybuild_test_utils::recorder::Recorder;

/// Project rooted at a path that is never touched on disk.
pub fn scratch_project() -> Project {
    Project::new(Path::new("/work/demo"))
}

pub fn names(plan: &pybuild::execution::ExecutionPlan) -> Vec<String> {
    plan.names()
}
