// src/plugin/def.rs

use std::fmt;

use crate::errors::{BuildError, Result};
use crate::project::Dependency;

pub const PYPI_PLUGIN_PROTOCOL: &str = "pypi:";
pub const VCS_PLUGIN_PROTOCOL: &str = "vcs:";

/// A plugin request: `(name, version?, module_name?)`.
///
/// Plain names are builtin plugins. `pypi:<package>` is fetched from the
/// package index and imported under the package name unless a module name
/// is given; `vcs:<url>` always needs an explicit module name.
#[derive(Debug, Clone)]
pub struct PluginDef {
    name: String,
    version: Option<String>,
    module_name: Option<String>,
    dependency: Option<Dependency>,
}

impl PluginDef {
    pub fn new(name: impl Into<String>, version: Option<&str>, module_name: Option<&str>) -> Result<Self> {
        let name = name.into();
        let version = version.map(str::to_string);
        let mut module_name = module_name.map(str::to_string);

        let dependency = if let Some(package) = name.strip_prefix(PYPI_PLUGIN_PROTOCOL) {
            module_name.get_or_insert_with(|| package.to_string());
            Some(Dependency::new(package, version.as_deref())?)
        } else if let Some(url) = name.strip_prefix(VCS_PLUGIN_PROTOCOL) {
            let Some(module) = module_name.clone() else {
                return Err(BuildError::UnspecifiedPluginName(name));
            };
            Some(Dependency::new(module, version.as_deref())?.with_url(url))
        } else {
            None
        };

        Ok(Self {
            name,
            version,
            module_name,
            dependency,
        })
    }

    /// A builtin plugin request.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            module_name: None,
            dependency: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Module name of a downloadable plugin, or the plain name otherwise.
    pub fn module_name(&self) -> &str {
        self.module_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether the plugin has to be fetched by the installer.
    pub fn is_downloadable(&self) -> bool {
        self.dependency.is_some()
    }

    /// Package the installer has to fetch for this plugin.
    pub fn dependency(&self) -> Option<&Dependency> {
        self.dependency.as_ref()
    }

    /// Installer argument: the URL for VCS plugins, else `<name><specifier>`.
    pub fn install_spec(&self) -> Option<String> {
        self.dependency.as_ref().map(|dep| match &dep.url {
            Some(url) => url.clone(),
            None => format!("{}{}", dep.name, dep.version.as_deref().unwrap_or("")),
        })
    }
}

impl PartialEq for PluginDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.module_name == other.module_name
    }
}

impl Eq for PluginDef {}

impl fmt::Display for PluginDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, " ({version})")?;
        }
        Ok(())
    }
}
