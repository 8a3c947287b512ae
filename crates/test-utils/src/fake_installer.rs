use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pybuild::errors::Result;
use pybuild::fs::mock::MockFileSystem;
use pybuild::plugin::environment::PLUGIN_MANIFEST;
use pybuild::plugin::{PluginDef, PluginInstaller};

/// A fake installer that:
/// - records every `install_packages` call (plugin names per call)
/// - "installs" a plugin by writing its manifest into a [`MockFileSystem`],
///   for the module names it was given manifests for.
#[derive(Debug, Clone)]
pub struct FakeInstaller {
    fs: MockFileSystem,
    env_dir: PathBuf,
    manifests: BTreeMap<String, String>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeInstaller {
    pub fn new(fs: MockFileSystem, env_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            env_dir: env_dir.into(),
            manifests: BTreeMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Manifest written when the plugin with `module` is installed.
    pub fn with_plugin(mut self, module: &str, manifest: &str) -> Self {
        self.manifests.insert(module.to_string(), manifest.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl PluginInstaller for FakeInstaller {
    fn install_packages(&self, plugins: &[PluginDef]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(plugins.iter().map(|p| p.name().to_string()).collect());

        for plugin in plugins {
            if let Some(manifest) = self.manifests.get(plugin.module_name()) {
                let path = self.env_dir.join(plugin.module_name()).join(PLUGIN_MANIFEST);
                self.fs.add_file(path, manifest.as_str());
            }
        }
        Ok(())
    }

    fn properties(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("plugin_env".to_string(), self.env_dir.display().to_string())])
    }
}
