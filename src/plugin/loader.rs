// src/plugin/loader.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::descriptor::{load_module, Module};
use crate::errors::{BuildError, Result};
use crate::plugin::def::PluginDef;
use crate::plugin::environment::PluginEnvironment;
use crate::plugins;
use crate::project::VersionSpec;

/// Version of this engine, checked against `requires_core`.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolves a plugin request into a collectable module.
///
/// Failing with [`BuildError::MissingPlugin`] means "not mine / not
/// available"; any other error aborts loading.
pub trait PluginLoader: Send + Sync + fmt::Debug {
    fn load_plugin(&self, plugin: &PluginDef) -> Result<Module>;
}

type PluginFactory = Arc<dyn Fn() -> Module + Send + Sync>;

/// Plugins compiled into the crate, addressed by plain name.
///
/// Plain name `X` corresponds to the module `pybuild::plugins::X_plugin`.
#[derive(Clone)]
pub struct BuiltinPluginLoader {
    catalog: BTreeMap<String, PluginFactory>,
}

impl BuiltinPluginLoader {
    /// Loader knowing the plugins shipped with the crate.
    pub fn new() -> Self {
        let mut loader = Self::empty();
        for (name, factory) in plugins::catalog() {
            loader.catalog.insert(name.to_string(), Arc::new(factory));
        }
        loader
    }

    pub fn empty() -> Self {
        Self {
            catalog: BTreeMap::new(),
        }
    }

    /// Make an additional plugin available under `name`.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Module + Send + Sync + 'static,
    {
        self.catalog.insert(name.into(), Arc::new(factory));
        self
    }
}

impl Default for BuiltinPluginLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BuiltinPluginLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinPluginLoader")
            .field("plugins", &self.catalog.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginLoader for BuiltinPluginLoader {
    fn load_plugin(&self, plugin: &PluginDef) -> Result<Module> {
        if plugin.is_downloadable() {
            return Err(BuildError::MissingPlugin(plugin.to_string()));
        }
        let factory = self
            .catalog
            .get(plugin.name())
            .ok_or_else(|| BuildError::MissingPlugin(plugin.to_string()))?;

        debug!(
            plugin = %plugin.name(),
            module = %format!("pybuild::plugins::{}_plugin", plugin.name()),
            "loading builtin plugin"
        );
        let mut module = factory();
        module.name = plugin.name().to_string();
        Ok(module)
    }
}

/// Plugins fetched by the installer into the plugin environment.
///
/// An installed plugin provides `<env>/<module>/plugin.toml`, written in the
/// descriptor format.
#[derive(Debug, Clone)]
pub struct DownloadingPluginLoader {
    environment: PluginEnvironment,
    core_version: String,
}

impl DownloadingPluginLoader {
    pub fn new(environment: PluginEnvironment) -> Self {
        Self {
            environment,
            core_version: CORE_VERSION.to_string(),
        }
    }

    /// Check `requires_core` against another engine version.
    pub fn with_core_version(mut self, version: impl Into<String>) -> Self {
        self.core_version = version.into();
        self
    }

    fn check_compatibility(&self, plugin: &PluginDef, module: &Module) -> Result<()> {
        let Some(required) = &module.requires_core else {
            return Ok(());
        };
        if VersionSpec::parse(required)?.matches(&self.core_version) {
            return Ok(());
        }
        Err(BuildError::IncompatiblePlugin {
            plugin: plugin.name().to_string(),
            required: required.clone(),
            actual: self.core_version.clone(),
        })
    }
}

impl PluginLoader for DownloadingPluginLoader {
    fn load_plugin(&self, plugin: &PluginDef) -> Result<Module> {
        if !plugin.is_downloadable() {
            return Err(BuildError::MissingPlugin(plugin.to_string()));
        }
        let module_name = plugin.module_name();
        let manifest = self.environment.manifest_path(module_name);
        if !self.environment.fs().is_file(&manifest) {
            debug!(plugin = %plugin.name(), manifest = %manifest.display(), "plugin not installed");
            return Err(BuildError::MissingPlugin(plugin.to_string()));
        }

        info!(plugin = %plugin.name(), module = %module_name, "loading downloaded plugin");
        let module = load_module(self.environment.fs(), &manifest, module_name)?;
        self.check_compatibility(plugin, &module)?;
        Ok(module)
    }
}

/// Tries each loader in order; the last *missing plugin* error wins when
/// none of them can provide the plugin.
#[derive(Debug)]
pub struct DispatchingPluginLoader {
    loaders: Vec<Box<dyn PluginLoader>>,
}

impl DispatchingPluginLoader {
    pub fn new(loaders: Vec<Box<dyn PluginLoader>>) -> Self {
        Self { loaders }
    }
}

impl PluginLoader for DispatchingPluginLoader {
    fn load_plugin(&self, plugin: &PluginDef) -> Result<Module> {
        let mut last_problem = BuildError::MissingPlugin(plugin.to_string());
        for loader in &self.loaders {
            match loader.load_plugin(plugin) {
                Ok(module) => return Ok(module),
                Err(err @ BuildError::MissingPlugin(_)) => last_problem = err,
                Err(err) => return Err(err),
            }
        }
        Err(last_problem)
    }
}
