// src/plugin/mod.rs

//! Plugin loading.
//!
//! - [`def`] describes a plugin request (`core`, `pypi:foo`, `vcs:<url>`).
//! - [`loader`] resolves a request into a [`Module`](crate::descriptor::Module):
//!   builtin plugins compiled into the crate, downloaded plugins read from
//!   the plugin environment, and a dispatcher trying both.
//! - [`installer`] fetches downloadable plugins into the environment.
//! - [`environment`] owns the per-project plugin directory.
//! - [`tree`] records which module requested which plugin.
//! - [`deferred`] runs the load / install / retry fixed point.

pub mod def;
pub mod deferred;
pub mod environment;
pub mod installer;
pub mod loader;
pub mod tree;

pub use def::PluginDef;
pub use deferred::DeferredPluginResolver;
pub use environment::PluginEnvironment;
pub use installer::{PipInstaller, PluginInstaller};
pub use loader::{BuiltinPluginLoader, DispatchingPluginLoader, DownloadingPluginLoader, PluginLoader};
pub use tree::ModuleTraversalTree;
