// src/plugin/deferred.rs

//! Fixed-point plugin resolution.
//!
//! Plugin requests are drained from a queue. A plugin that cannot be found
//! but can be downloaded is set aside; once the queue is empty every plugin
//! set aside is installed in a single installer call and requested again.
//! A plugin that is still missing after its install fails with the error of
//! its first attempt. Resolution ends when a pass loads nothing new.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::descriptor::Module;
use crate::errors::{BuildError, Result};
use crate::plugin::def::PluginDef;
use crate::plugin::installer::PluginInstaller;
use crate::plugin::loader::PluginLoader;
use crate::plugin::tree::ModuleTraversalTree;

struct Request {
    parent: usize,
    plugin: PluginDef,
    /// Error of the attempt before installation, once installed.
    first_failure: Option<BuildError>,
}

#[derive(Debug)]
pub struct DeferredPluginResolver<'a> {
    loader: &'a dyn PluginLoader,
    installer: Option<&'a dyn PluginInstaller>,
}

impl<'a> DeferredPluginResolver<'a> {
    /// Without an installer, downloadable plugins resolve only when they
    /// are installed already.
    pub fn new(loader: &'a dyn PluginLoader, installer: Option<&'a dyn PluginInstaller>) -> Self {
        Self { loader, installer }
    }

    /// Load every plugin reachable from `descriptor`.
    pub fn resolve(&self, descriptor: Module) -> Result<ModuleTraversalTree> {
        let mut queue: VecDeque<Request> = descriptor
            .plugin_requests()
            .iter()
            .map(|plugin| Request {
                parent: ModuleTraversalTree::ROOT,
                plugin: plugin.clone(),
                first_failure: None,
            })
            .collect();
        let mut tree = ModuleTraversalTree::new(descriptor);
        let mut pass = 0;

        loop {
            pass += 1;
            let mut deferred: Vec<Request> = Vec::new();
            let mut loaded = 0;

            while let Some(request) = queue.pop_front() {
                if let Some(existing) = tree.find(request.plugin.name()) {
                    tree.add_edge(request.parent, existing);
                    continue;
                }

                match self.loader.load_plugin(&request.plugin) {
                    Ok(module) => {
                        debug!(plugin = %request.plugin.name(), pass, "plugin loaded");
                        let requests = module.plugin_requests().to_vec();
                        let index = tree.add_child(request.parent, request.plugin.name(), module);
                        queue.extend(requests.into_iter().map(|plugin| Request {
                            parent: index,
                            plugin,
                            first_failure: None,
                        }));
                        loaded += 1;
                    }
                    Err(err @ BuildError::MissingPlugin(_)) => match request.first_failure {
                        Some(first) => return Err(first),
                        None if request.plugin.is_downloadable() => deferred.push(Request {
                            first_failure: Some(err),
                            ..request
                        }),
                        None => return Err(err),
                    },
                    Err(err) => return Err(err),
                }
            }

            if deferred.is_empty() {
                debug!(pass, loaded, plugins = tree.plugin_count(), "plugin resolution reached fixed point");
                return Ok(tree);
            }

            self.install(&deferred)?;
            queue.extend(deferred);
        }
    }

    fn install(&self, requests: &[Request]) -> Result<()> {
        let mut plugins: Vec<PluginDef> = Vec::new();
        for request in requests {
            if !plugins.contains(&request.plugin) {
                plugins.push(request.plugin.clone());
            }
        }

        match self.installer {
            Some(installer) => {
                info!(
                    plugins = ?plugins.iter().map(PluginDef::name).collect::<Vec<_>>(),
                    "installing missing plugins"
                );
                installer.install_packages(&plugins)
            }
            None => {
                warn!(
                    plugins = ?plugins.iter().map(PluginDef::name).collect::<Vec<_>>(),
                    "plugins are missing and cannot be installed"
                );
                Ok(())
            }
        }
    }
}
