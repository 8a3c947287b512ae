// src/descriptor/loader.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use toml::Value;
use tracing::debug;

use crate::descriptor::model::{
    DependencyRef, DependencySpec, DescriptorFile, HookEntry, OneOrMany, PluginEntry,
};
use crate::descriptor::module::{
    ActionMarkers, DeclaredDependencies, Item, ItemKind, Module, ModuleAttributes, TaskMarkers,
};
use crate::errors::{BuildError, Result};
use crate::exec::{command_body, noop_body, properties_body};
use crate::fs::FileSystem;
use crate::plugin::PluginDef;
use crate::project::Dependency;
use crate::registry::{Callable, TaskContext, TaskDependency};

/// File name of the build descriptor at the project root.
pub const DESCRIPTOR_FILE: &str = "build.toml";

/// Module name given to the build descriptor.
pub const DESCRIPTOR_MODULE: &str = "build";

pub fn descriptor_path(basedir: &Path) -> PathBuf {
    basedir.join(DESCRIPTOR_FILE)
}

/// Read and parse a descriptor file.
///
/// This only performs TOML deserialization; see [`load_module`] for the
/// conversion into a collectable [`Module`].
pub fn load_from_path(fs: &dyn FileSystem, path: &Path) -> Result<DescriptorFile> {
    let cannot_load = |reason: String| BuildError::CannotLoadDescriptor {
        path: path.to_path_buf(),
        reason,
    };
    let contents = fs.read_to_string(path).map_err(|e| cannot_load(format!("{e:#}")))?;
    toml::from_str(&contents).map_err(|e| cannot_load(e.to_string()))
}

/// Load the descriptor or plugin manifest at `path` as module `name`.
pub fn load_module(fs: &dyn FileSystem, path: &Path, name: &str) -> Result<Module> {
    let file = load_from_path(fs, path)?;
    let module = module_from_file(name, file)?;
    debug!(
        module = %module.name,
        path = %path.display(),
        items = module.items.len(),
        plugins = module.plugins.len(),
        "loaded module"
    );
    Ok(module)
}

/// Convert a parsed descriptor into a [`Module`], keeping item order per
/// section: tasks, actions, initializers, finalizers.
pub fn module_from_file(name: &str, file: DescriptorFile) -> Result<Module> {
    let DescriptorFile {
        plugins,
        requires_core,
        project,
        properties,
        dependencies,
        tasks,
        actions,
        initializers,
        finalizers,
    } = file;

    let mut module = Module::new(name);
    module.properties = properties;
    module.requires_core = requires_core.or(project.requires_core);

    for entry in plugins.into_iter().chain(project.plugins) {
        module.plugins.push(plugin_def(entry)?);
    }

    module.attributes = ModuleAttributes {
        name: project.name,
        version: project.version,
        default_task: project.default_task.map(OneOrMany::into_vec),
        summary: project.summary,
        description: project.description,
        authors: project.authors,
        license: project.license,
        url: project.url,
        urls: project.urls,
        explicit_namespaces: project.explicit_namespaces,
        requires_python: project.requires_python,
        obsoletes: project.obsoletes,
    };

    module.dependencies = DeclaredDependencies {
        runtime: dependency_list(dependencies.runtime)?,
        build: dependency_list(dependencies.build)?,
        plugin: dependency_list(dependencies.plugin)?,
        requirements: dependencies.requirements,
        build_requirements: dependencies.build_requirements,
    };

    for task in tasks {
        let markers = TaskMarkers {
            depends: task_dependencies(task.depends),
            dependents: task_dependencies(task.dependents),
        };
        let body = task.cmd.map(command_body).unwrap_or_else(noop_body);
        module.items.push(finish_item(
            Item::new(task.name, ItemKind::Task(markers), body),
            task.description,
            task.params,
        ));
    }

    for action in actions {
        let markers = ActionMarkers {
            before: action.before.map(OneOrMany::into_vec).unwrap_or_default(),
            after: action.after.map(OneOrMany::into_vec).unwrap_or_default(),
            only_once: action.only_once,
            teardown: action.teardown,
        };
        let body = action.cmd.map(command_body).unwrap_or_else(noop_body);
        module.items.push(finish_item(
            Item::new(action.name, ItemKind::Action(markers), body),
            action.description,
            action.params,
        ));
    }

    for hook in initializers {
        module.items.push(hook_item(hook, |environments| ItemKind::Initializer { environments }));
    }
    for hook in finalizers {
        module.items.push(hook_item(hook, |environments| ItemKind::Finalizer { environments }));
    }

    Ok(module)
}

fn finish_item(mut item: Item, description: Option<OneOrMany>, params: Vec<String>) -> Item {
    for line in description.map(OneOrMany::into_vec).unwrap_or_default() {
        item = item.description(line);
    }
    item.with_parameters(params)
}

fn hook_item(hook: HookEntry, kind: impl FnOnce(Vec<String>) -> ItemKind) -> Item {
    let body = hook_body(hook.properties, hook.cmd);
    finish_item(
        Item::new(hook.name, kind(hook.environments), body),
        hook.description,
        hook.params,
    )
}

/// Properties are applied first, then the command runs.
fn hook_body(properties: BTreeMap<String, Value>, cmd: Option<String>) -> Callable {
    match (properties.is_empty(), cmd) {
        (true, None) => noop_body(),
        (true, Some(cmd)) => command_body(cmd),
        (false, None) => properties_body(properties),
        (false, Some(cmd)) => {
            let apply = properties_body(properties);
            let run = command_body(cmd);
            Arc::new(move |ctx: &mut TaskContext<'_>| {
                apply(ctx)?;
                run(ctx)
            })
        }
    }
}

fn task_dependencies(refs: Vec<DependencyRef>) -> Vec<TaskDependency> {
    refs.into_iter()
        .flat_map(|r| match r {
            DependencyRef::Required(name) => vec![TaskDependency::required(name)],
            DependencyRef::Optional { optional } => optional
                .into_vec()
                .into_iter()
                .map(TaskDependency::optional)
                .collect(),
        })
        .collect()
}

fn dependency_list(specs: Vec<DependencySpec>) -> Result<Vec<Dependency>> {
    specs
        .into_iter()
        .map(|spec| match spec {
            DependencySpec::Name(name) => Dependency::new(name, None),
            DependencySpec::Detailed {
                name,
                version,
                url,
                declaration_only,
            } => {
                let mut dependency = Dependency::new(name, version.as_deref())?.declaration_only(declaration_only);
                if let Some(url) = url {
                    dependency = dependency.with_url(url);
                }
                Ok(dependency)
            }
        })
        .collect()
}

fn plugin_def(entry: PluginEntry) -> Result<PluginDef> {
    match entry {
        PluginEntry::Name(name) => PluginDef::new(name, None, None),
        PluginEntry::Detailed { name, version, module } => {
            PluginDef::new(name, version.as_deref(), module.as_deref())
        }
    }
}
