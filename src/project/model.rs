// src/project/model.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use toml::Value;
use tracing::debug;

use crate::errors::{BuildError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::project::dependency::{Dependency, DependencyEntry, RequirementsFile};
use crate::project::properties::{self, normalize_path};

pub const DEFAULT_VERSION: &str = "1.0.dev0";
const BASEDIR: &str = "basedir";

/// A project author as declared in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The project being built.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    version: String,
    dist_version: String,
    basedir: PathBuf,
    properties: BTreeMap<String, Value>,
    fs: Arc<dyn FileSystem>,

    pub(crate) dependencies: BTreeSet<DependencyEntry>,
    pub(crate) build_dependencies: BTreeSet<DependencyEntry>,
    pub(crate) plugin_dependencies: BTreeSet<DependencyEntry>,

    pub default_task: Vec<String>,
    environments: Vec<String>,
    pub offline: bool,
    pub no_venvs: bool,

    pub summary: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<Author>,
    pub license: Option<String>,
    pub url: Option<String>,
    pub urls: BTreeMap<String, String>,
    pub explicit_namespaces: Vec<String>,
    pub requires_python: Option<String>,
    pub obsoletes: Vec<String>,

    pub(crate) manifest_included_files: Vec<String>,
    pub(crate) manifest_included_directories: Vec<(String, Vec<String>)>,
    pub(crate) package_data: BTreeMap<String, Vec<String>>,
}

impl Project {
    /// Create a project rooted at `basedir`, named after its last component.
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        let basedir = basedir.into();
        let name = basedir
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("project")
            .to_string();

        let mut properties = BTreeMap::new();
        properties.insert(
            BASEDIR.to_string(),
            Value::String(basedir.to_string_lossy().into_owned()),
        );

        Self {
            name,
            version: DEFAULT_VERSION.to_string(),
            dist_version: DEFAULT_VERSION.to_string(),
            basedir,
            properties,
            fs: Arc::new(RealFileSystem),
            dependencies: BTreeSet::new(),
            build_dependencies: BTreeSet::new(),
            plugin_dependencies: BTreeSet::new(),
            default_task: Vec::new(),
            environments: Vec::new(),
            offline: false,
            no_venvs: false,
            summary: None,
            description: None,
            authors: Vec::new(),
            license: None,
            url: None,
            urls: BTreeMap::new(),
            explicit_namespaces: Vec::new(),
            requires_python: None,
            obsoletes: Vec::new(),
            manifest_included_files: Vec::new(),
            manifest_included_directories: Vec::new(),
            package_data: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BuildError::BuildFailed("project name must not be empty".into()));
        }
        self.name = name;
        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Version used for distribution artifacts. A version ending in `.dev`
    /// gets a `YYYYMMDDHHMMSS` UTC timestamp appended.
    pub fn dist_version(&self) -> &str {
        &self.dist_version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        let version = version.into();
        self.dist_version = if version.ends_with(".dev") {
            format!("{version}{}", Utc::now().format("%Y%m%d%H%M%S"))
        } else {
            version.clone()
        };
        self.version = version;
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// Filesystem that tasks use for the project's directories.
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    pub fn set_environments(&mut self, environments: Vec<String>) {
        self.environments = environments;
    }

    // ---- properties ----

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn get_property_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.properties
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    pub fn get_mandatory_property(&self, key: &str) -> Result<&Value> {
        self.properties
            .get(key)
            .ok_or_else(|| BuildError::MissingProperty(key.to_string()))
    }

    /// String form of a property, as used in expansion.
    pub fn property_str(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(properties::render_value)
    }

    /// Set a property. Setting `basedir` moves the project's base directory.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if key == BASEDIR {
            self.basedir = PathBuf::from(properties::render_value(&value));
        }
        debug!(property = %key, value = %value, "setting property");
        self.properties.insert(key, value);
    }

    pub fn set_property_if_unset(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if !self.properties.contains_key(&key) {
            self.set_property(key, value);
        }
    }

    /// Expand `$name` / `${name}` references until nothing changes.
    /// `$$` escapes are kept, so the result expands to itself.
    pub fn expand(&self, template: &str) -> Result<String> {
        properties::expand(template, &self.properties)
    }

    /// Expand `template` into final text with `$$` unfolded to `$`.
    pub fn expand_literal(&self, template: &str) -> Result<String> {
        Ok(properties::unescape(&self.expand(template)?))
    }

    /// Expand `template`, resolve it against `basedir` and join the
    /// normalised `extras`.
    pub fn expand_path(&self, template: &str, extras: &[&str]) -> Result<PathBuf> {
        let mut path = self.basedir.join(self.expand_literal(template)?);
        for extra in extras {
            path.push(normalize_path(Path::new(extra)));
        }
        Ok(normalize_path(&path))
    }

    // ---- dependencies ----

    pub fn dependencies(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.dependencies.iter()
    }

    pub fn build_dependencies(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.build_dependencies.iter()
    }

    pub fn plugin_dependencies(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.plugin_dependencies.iter()
    }

    /// Add a runtime dependency; `version` may be a release or a specifier set.
    pub fn depends_on(&mut self, name: &str, version: Option<&str>) -> Result<()> {
        self.add_dependency(Dependency::new(name, version)?);
        Ok(())
    }

    pub fn build_depends_on(&mut self, name: &str, version: Option<&str>) -> Result<()> {
        self.add_build_dependency(Dependency::new(name, version)?);
        Ok(())
    }

    pub fn plugin_depends_on(&mut self, name: &str, version: Option<&str>) -> Result<()> {
        self.add_plugin_dependency(Dependency::new(name, version)?);
        Ok(())
    }

    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.dependencies.insert(dependency.into());
    }

    pub fn add_build_dependency(&mut self, dependency: Dependency) {
        self.build_dependencies.insert(dependency.into());
    }

    pub fn add_plugin_dependency(&mut self, dependency: Dependency) {
        self.plugin_dependencies.insert(dependency.into());
    }

    pub fn depends_on_requirements(&mut self, filename: impl Into<String>) {
        self.dependencies
            .insert(RequirementsFile::new(filename).into());
    }

    pub fn build_depends_on_requirements(&mut self, filename: impl Into<String>) {
        self.build_dependencies
            .insert(RequirementsFile::new(filename).into());
    }

    // ---- manifest ----

    pub fn manifest_included_files(&self) -> &[String] {
        &self.manifest_included_files
    }

    pub fn manifest_included_directories(&self) -> &[(String, Vec<String>)] {
        &self.manifest_included_directories
    }

    pub fn package_data(&self) -> &BTreeMap<String, Vec<String>> {
        &self.package_data
    }
}
