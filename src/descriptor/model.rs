// src/descriptor/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;
use toml::Value;

use crate::project::Author;

/// A build descriptor (`build.toml`) or plugin manifest (`plugin.toml`)
/// as read from disk.
///
/// ```toml
/// plugins = ["core", { name = "pypi:foo", version = ">=1.0" }]
///
/// [project]
/// name = "demo"
/// default_task = "publish"
///
/// [properties]
/// dir_source = "src/main/python"
///
/// [[task]]
/// name = "compile"
/// cmd = "echo compiling $dir_source"
/// depends = ["prepare", { optional = "clean" }]
/// ```
///
/// Every section is optional. TOML puts keys written after a table header
/// into that table, so `plugins` and `requires_core` are also accepted
/// inside `[project]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorFile {
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,

    /// Specifier the running engine version has to satisfy (plugins only).
    #[serde(default)]
    pub requires_core: Option<String>,

    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub properties: BTreeMap<String, Value>,

    #[serde(default)]
    pub dependencies: DependenciesSection,

    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskEntry>,

    #[serde(default, rename = "action")]
    pub actions: Vec<ActionEntry>,

    #[serde(default, rename = "init")]
    pub initializers: Vec<HookEntry>,

    #[serde(default, rename = "finalize")]
    pub finalizers: Vec<HookEntry>,
}

/// `[project]` section: attributes propagated onto the project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    pub version: Option<String>,
    pub default_task: Option<OneOrMany>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub authors: Option<Vec<Author>>,
    pub license: Option<String>,
    pub url: Option<String>,
    pub urls: Option<BTreeMap<String, String>>,
    pub explicit_namespaces: Option<Vec<String>>,
    pub requires_python: Option<String>,
    pub obsoletes: Option<Vec<String>>,

    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    #[serde(default)]
    pub requires_core: Option<String>,
}

/// A string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Entry of the `plugins` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        module: Option<String>,
    },
}

/// Entry of `depends` / `dependents`: a task name, or `{ optional = ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencyRef {
    Required(String),
    Optional { optional: OneOrMany },
}

/// `[dependencies]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependenciesSection {
    #[serde(default)]
    pub runtime: Vec<DependencySpec>,
    #[serde(default)]
    pub build: Vec<DependencySpec>,
    #[serde(default)]
    pub plugin: Vec<DependencySpec>,
    /// Requirements files installed as runtime dependencies.
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub build_requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        declaration_only: bool,
    },
}

/// `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskEntry {
    pub name: String,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    #[serde(default)]
    pub depends: Vec<DependencyRef>,
    #[serde(default)]
    pub dependents: Vec<DependencyRef>,
    #[serde(default)]
    pub params: Vec<String>,
}

/// `[[action]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionEntry {
    pub name: String,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    #[serde(default)]
    pub before: Option<OneOrMany>,
    #[serde(default)]
    pub after: Option<OneOrMany>,
    #[serde(default)]
    pub only_once: bool,
    #[serde(default)]
    pub teardown: bool,
    #[serde(default)]
    pub params: Vec<String>,
}

/// `[[init]]` / `[[finalize]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookEntry {
    pub name: String,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    #[serde(default)]
    pub environments: Vec<String>,
    /// Properties written onto the project when the hook runs.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub params: Vec<String>,
}
