// src/plugin/environment.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Directory holding downloaded plugins, relative to the project base.
pub const PLUGIN_DIR: &str = ".pybuild/plugins";

/// Manifest file a downloaded plugin provides inside its module directory.
pub const PLUGIN_MANIFEST: &str = "plugin.toml";

/// The isolated directory downloaded plugins are installed into.
#[derive(Debug, Clone)]
pub struct PluginEnvironment {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl PluginEnvironment {
    pub fn new(basedir: &Path, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: basedir.join(PLUGIN_DIR),
            fs,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.fs.is_dir(&self.dir)
    }

    pub fn create(&self) -> Result<()> {
        self.fs.create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Delete every installed plugin.
    pub fn reset(&self) -> Result<()> {
        info!(dir = %self.dir.display(), "resetting plugin environment");
        self.fs.remove_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn manifest_path(&self, module_name: &str) -> PathBuf {
        self.dir.join(module_name).join(PLUGIN_MANIFEST)
    }

    pub fn is_installed(&self, module_name: &str) -> bool {
        self.fs.is_file(&self.manifest_path(module_name))
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}
