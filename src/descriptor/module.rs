// src/descriptor/module.rs

//! The collected form of a descriptor or plugin.
//!
//! A [`Module`] is what the annotation collector walks: an ordered list of
//! [`Item`]s, each tagged with an [`ItemKind`] that plays the role of the
//! task / action / init / finalize markers, plus the module's plugin
//! requests and project attributes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use toml::Value;

use crate::errors::Result;
use crate::plugin::PluginDef;
use crate::project::{Author, Dependency, Project};
use crate::registry::{Callable, Executable, TaskContext, TaskDependency};

/// Marker data of a task item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMarkers {
    pub depends: Vec<TaskDependency>,
    /// Reverse edges: each named task depends on this one.
    pub dependents: Vec<TaskDependency>,
}

/// Marker data of an action item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMarkers {
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub only_once: bool,
    pub teardown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Task(TaskMarkers),
    Action(ActionMarkers),
    Initializer { environments: Vec<String> },
    Finalizer { environments: Vec<String> },
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Task(_) => "task",
            ItemKind::Action(_) => "action",
            ItemKind::Initializer { .. } => "initializer",
            ItemKind::Finalizer { .. } => "finalizer",
        }
    }
}

/// A named callable contributed by a module.
///
/// Marker builders that do not apply to the item's kind are ignored, the
/// same way a dependency marker on an action has no effect.
#[derive(Clone)]
pub struct Item {
    name: String,
    kind: ItemKind,
    description: Vec<String>,
    parameters: Vec<String>,
    body: Callable,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind, body: Callable) -> Self {
        Self {
            name: name.into(),
            kind,
            description: Vec::new(),
            parameters: Vec::new(),
            body,
        }
    }

    pub fn task<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(name, ItemKind::Task(TaskMarkers::default()), Arc::new(body))
    }

    pub fn action<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(name, ItemKind::Action(ActionMarkers::default()), Arc::new(body))
    }

    pub fn initializer<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let kind = ItemKind::Initializer {
            environments: Vec::new(),
        };
        Self::new(name, kind, Arc::new(body))
    }

    pub fn finalizer<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let kind = ItemKind::Finalizer {
            environments: Vec::new(),
        };
        Self::new(name, kind, Arc::new(body))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.push(description.into());
        self
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn depends_on(mut self, task: impl Into<String>) -> Self {
        if let ItemKind::Task(markers) = &mut self.kind {
            markers.depends.push(TaskDependency::required(task));
        }
        self
    }

    pub fn depends_on_optional(mut self, task: impl Into<String>) -> Self {
        if let ItemKind::Task(markers) = &mut self.kind {
            markers.depends.push(TaskDependency::optional(task));
        }
        self
    }

    pub fn dependent(mut self, task: impl Into<String>, optional: bool) -> Self {
        if let ItemKind::Task(markers) = &mut self.kind {
            markers.dependents.push(TaskDependency {
                name: task.into(),
                optional,
            });
        }
        self
    }

    pub fn before(mut self, task: impl Into<String>) -> Self {
        if let ItemKind::Action(markers) = &mut self.kind {
            markers.before.push(task.into());
        }
        self
    }

    pub fn after(mut self, task: impl Into<String>) -> Self {
        if let ItemKind::Action(markers) = &mut self.kind {
            markers.after.push(task.into());
        }
        self
    }

    pub fn only_once(mut self, only_once: bool) -> Self {
        if let ItemKind::Action(markers) = &mut self.kind {
            markers.only_once = only_once;
        }
        self
    }

    pub fn teardown(mut self, teardown: bool) -> Self {
        if let ItemKind::Action(markers) = &mut self.kind {
            markers.teardown = teardown;
        }
        self
    }

    pub fn environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let environments: Vec<String> = environments.into_iter().map(Into::into).collect();
        match &mut self.kind {
            ItemKind::Initializer { environments: envs } | ItemKind::Finalizer { environments: envs } => {
                *envs = environments;
            }
            _ => {}
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn descriptions(&self) -> &[String] {
        &self.description
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Wrap the body into a validated [`Executable`].
    pub fn executable(&self) -> Result<Executable> {
        Ok(Executable::new(self.name.clone(), Arc::clone(&self.body))?
            .with_description(self.description.join(" "))
            .with_parameters(self.parameters.iter().cloned()))
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Project attributes a module may set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleAttributes {
    pub name: Option<String>,
    pub version: Option<String>,
    pub default_task: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub authors: Option<Vec<Author>>,
    pub license: Option<String>,
    pub url: Option<String>,
    pub urls: Option<BTreeMap<String, String>>,
    pub explicit_namespaces: Option<Vec<String>>,
    pub requires_python: Option<String>,
    pub obsoletes: Option<Vec<String>>,
}

impl ModuleAttributes {
    /// Copy every attribute that is set onto `project`.
    pub fn apply_to(&self, project: &mut Project) -> Result<()> {
        if let Some(name) = &self.name {
            project.set_name(name.clone())?;
        }
        if let Some(version) = &self.version {
            project.set_version(version.clone());
        }
        if let Some(default_task) = &self.default_task {
            project.default_task = default_task.clone();
        }
        if let Some(summary) = &self.summary {
            project.summary = Some(summary.clone());
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
        if let Some(authors) = &self.authors {
            project.authors = authors.clone();
        }
        if let Some(license) = &self.license {
            project.license = Some(license.clone());
        }
        if let Some(url) = &self.url {
            project.url = Some(url.clone());
        }
        if let Some(urls) = &self.urls {
            project.urls = urls.clone();
        }
        if let Some(namespaces) = &self.explicit_namespaces {
            project.explicit_namespaces = namespaces.clone();
        }
        if let Some(requires_python) = &self.requires_python {
            project.requires_python = Some(requires_python.clone());
        }
        if let Some(obsoletes) = &self.obsoletes {
            project.obsoletes = obsoletes.clone();
        }
        Ok(())
    }
}

/// Dependencies declared by a descriptor.
#[derive(Debug, Clone, Default)]
pub struct DeclaredDependencies {
    pub runtime: Vec<Dependency>,
    pub build: Vec<Dependency>,
    pub plugin: Vec<Dependency>,
    pub requirements: Vec<String>,
    pub build_requirements: Vec<String>,
}

impl DeclaredDependencies {
    pub fn apply_to(&self, project: &mut Project) {
        for dependency in &self.runtime {
            project.add_dependency(dependency.clone());
        }
        for dependency in &self.build {
            project.add_build_dependency(dependency.clone());
        }
        for dependency in &self.plugin {
            project.add_plugin_dependency(dependency.clone());
        }
        for file in &self.requirements {
            project.depends_on_requirements(file.clone());
        }
        for file in &self.build_requirements {
            project.build_depends_on_requirements(file.clone());
        }
    }
}

/// A descriptor or plugin, ready for collection.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    pub attributes: ModuleAttributes,
    pub plugins: Vec<PluginDef>,
    pub properties: BTreeMap<String, Value>,
    pub dependencies: DeclaredDependencies,
    pub requires_core: Option<String>,
    pub items: Vec<Item>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn plugin_requests(&self) -> &[PluginDef] {
        &self.plugins
    }
}

/// Builder used by plugins written in Rust.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            module: Module::new(name),
        }
    }

    /// Request another plugin; it is loaded and collected before this one.
    pub fn use_plugin(mut self, plugin: PluginDef) -> Self {
        self.module.plugins.push(plugin);
        self
    }

    /// Default property value; explicit project settings take precedence.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.module.properties.insert(key.into(), value.into());
        self
    }

    pub fn requires_core(mut self, specifier: impl Into<String>) -> Self {
        self.module.requires_core = Some(specifier.into());
        self
    }

    pub fn item(mut self, item: Item) -> Self {
        self.module.items.push(item);
        self
    }

    pub fn build(self) -> Module {
        self.module
    }
}
