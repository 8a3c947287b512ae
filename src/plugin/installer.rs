// src/plugin/installer.rs

use std::collections::BTreeMap;
use std::env;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::{BuildError, Result};
use crate::plugin::def::PluginDef;

/// Environment variable naming the interpreter used to run pip.
pub const PYTHON_ENV: &str = "PYB_PYTHON";
const DEFAULT_PYTHON: &str = "python3";

/// Makes downloadable plugins available in the plugin environment.
pub trait PluginInstaller: Send + Sync + Debug {
    /// Install every plugin in one go. Plugins without an install spec
    /// (builtins) are ignored.
    fn install_packages(&self, plugins: &[PluginDef]) -> Result<()>;

    /// Opaque settings of the installation target.
    fn properties(&self) -> BTreeMap<String, String>;
}

/// Installs plugins with `<python> -m pip install --target <dir>`.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    python: String,
    target: PathBuf,
}

impl PipInstaller {
    /// Installer targeting `target`, using `$PYB_PYTHON` or `python3`.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        let python = env::var(PYTHON_ENV).unwrap_or_else(|_| DEFAULT_PYTHON.to_string());
        Self::with_python(python, target)
    }

    pub fn with_python(python: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    fn command(&self, specs: &[String]) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-m", "pip", "install", "--upgrade", "--target"])
            .arg(&self.target)
            .args(specs);
        cmd
    }
}

impl PluginInstaller for PipInstaller {
    fn install_packages(&self, plugins: &[PluginDef]) -> Result<()> {
        let mut specs: Vec<String> = plugins.iter().filter_map(PluginDef::install_spec).collect();
        specs.dedup();
        if specs.is_empty() {
            return Ok(());
        }

        info!(packages = ?specs, target = %self.target.display(), "installing plugins");
        let output = self
            .command(&specs)
            .output()
            .with_context(|| format!("running {} -m pip", self.python))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("pip: {}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("pip stderr: {}", line);
        }

        if !output.status.success() {
            return Err(BuildError::BuildFailed(format!(
                "installing plugins {} failed with status {}",
                specs.join(", "),
                output.status.code().unwrap_or(-1)
            )));
        }
        Ok(())
    }

    fn properties(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("plugin_env".to_string(), self.target.display().to_string()),
            ("python".to_string(), self.python.clone()),
        ])
    }
}
