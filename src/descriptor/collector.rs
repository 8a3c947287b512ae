// src/descriptor/collector.rs

//! Annotation collector: registers the items of a [`Module`] with the
//! execution manager, switching on each item's kind.

use tracing::debug;

use crate::descriptor::module::{ItemKind, Module};
use crate::errors::Result;
use crate::execution::ExecutionManager;
use crate::registry::{Action, Finalizer, Initializer, Task, TaskDependency};

pub fn collect(module: &Module, manager: &mut ExecutionManager) -> Result<()> {
    debug!(module = %module.name, items = module.items().len(), "collecting module");

    for item in module.items() {
        let executable = item.executable()?;
        match item.kind() {
            ItemKind::Task(markers) => {
                debug!(
                    module = %module.name,
                    task = %item.name(),
                    dependencies = ?markers.depends,
                    "found task"
                );
                if !markers.dependents.is_empty() {
                    let late = markers
                        .dependents
                        .iter()
                        .map(|dependent| {
                            let edge = TaskDependency {
                                name: item.name().to_string(),
                                optional: dependent.optional,
                            };
                            (dependent.name.clone(), vec![edge])
                        })
                        .collect();
                    manager.register_late_task_dependencies(late);
                }
                let task = Task::from_executable(executable)
                    .with_descriptions(item.descriptions().iter().cloned())
                    .with_dependencies(markers.depends.clone());
                manager.register_task(task);
            }
            ItemKind::Action(markers) => {
                debug!(
                    module = %module.name,
                    action = %item.name(),
                    before = ?markers.before,
                    after = ?markers.after,
                    "found action"
                );
                let action = Action::new(executable)
                    .before(markers.before.iter().cloned())
                    .after(markers.after.iter().cloned())
                    .only_once(markers.only_once)
                    .teardown(markers.teardown);
                manager.register_action(action);
            }
            ItemKind::Initializer { environments } => {
                debug!(module = %module.name, initializer = %item.name(), "found initializer");
                manager.register_initializer(
                    Initializer::new(executable).environments(environments.iter().cloned()),
                );
            }
            ItemKind::Finalizer { environments } => {
                debug!(module = %module.name, finalizer = %item.name(), "found finalizer");
                manager.register_finalizer(
                    Finalizer::new(executable).environments(environments.iter().cloned()),
                );
            }
        }
    }

    Ok(())
}
