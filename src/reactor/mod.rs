// src/reactor/mod.rs

//! Top-level orchestration.
//!
//! [`Reactor::prepare_build`] loads the descriptor, resolves and collects
//! plugins, configures the project and resolves task dependencies.
//! [`Reactor::build`] then runs initializers, plans and executes the
//! requested tasks and runs finalizers.

pub mod options;
pub mod task_list;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use toml::Value;
use tracing::{debug, info, warn};

use crate::descriptor::{self, collect, load_module, DESCRIPTOR_MODULE};
use crate::errors::{BuildError, Result};
use crate::execution::{ExecutionManager, ExecutionPlan, TaskExecutionSummary};
use crate::fs::{FileSystem, RealFileSystem};
use crate::plugin::{
    BuiltinPluginLoader, DeferredPluginResolver, DispatchingPluginLoader, DownloadingPluginLoader,
    PipInstaller, PluginEnvironment, PluginInstaller,
};
use crate::project::Project;
use crate::registry::Task;

pub use options::{BuildOptions, BuildSummary};
pub use task_list::{expand_task_list, TaskSpecifier};

#[derive(Debug)]
pub struct Reactor {
    fs: Arc<dyn FileSystem>,
    builtin: BuiltinPluginLoader,
    installer: Option<Box<dyn PluginInstaller>>,
    manager: ExecutionManager,
    project: Option<Project>,
    plugins: Vec<String>,
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor {
    pub fn new() -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            builtin: BuiltinPluginLoader::new(),
            installer: None,
            manager: ExecutionManager::new(),
            project: None,
            plugins: Vec::new(),
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_builtin_plugins(mut self, builtin: BuiltinPluginLoader) -> Self {
        self.builtin = builtin;
        self
    }

    /// Installer used for downloadable plugins; defaults to [`PipInstaller`]
    /// targeting the plugin environment.
    pub fn with_installer(mut self, installer: Box<dyn PluginInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn project_mut(&mut self) -> Option<&mut Project> {
        self.project.as_mut()
    }

    pub fn execution_manager(&self) -> &ExecutionManager {
        &self.manager
    }

    /// Names of the plugins loaded by `prepare_build`, in load order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Registered tasks, in registration order.
    pub fn tasks(&self) -> &[Task] {
        self.manager.tasks()
    }

    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.manager.interrupt_flag()
    }

    pub fn set_interrupt_flag(&mut self, flag: Arc<AtomicBool>) {
        self.manager.set_interrupt_flag(flag);
    }

    pub fn prepare_build(&mut self, options: &BuildOptions) -> Result<()> {
        let basedir = self
            .fs
            .canonicalize(&options.project_dir)
            .ok()
            .filter(|dir| self.fs.is_dir(dir))
            .ok_or_else(|| BuildError::CannotFind(options.project_dir.clone()))?;
        let descriptor_path = descriptor::descriptor_path(&basedir);
        if !self.fs.is_file(&descriptor_path) {
            return Err(BuildError::CannotFind(descriptor_path));
        }

        info!(basedir = %basedir.display(), "preparing build");
        let mut project = Project::new(basedir.clone()).with_fs(Arc::clone(&self.fs));
        project.offline = options.offline;
        project.no_venvs = options.no_venvs;

        let environment = PluginEnvironment::new(&basedir, Arc::clone(&self.fs));
        if options.reset_plugins {
            environment.reset()?;
        }
        if !options.no_venvs {
            environment.create()?;
        }

        let loader = DispatchingPluginLoader::new(vec![
            Box::new(self.builtin.clone()),
            Box::new(DownloadingPluginLoader::new(environment.clone())),
        ]);
        let default_installer;
        let installer: Option<&dyn PluginInstaller> = if options.offline || options.no_venvs {
            None
        } else if let Some(installer) = self.installer.as_deref() {
            Some(installer)
        } else {
            default_installer = PipInstaller::new(environment.dir());
            Some(&default_installer)
        };
        if let Some(installer) = installer {
            debug!(settings = ?installer.properties(), "plugin installer");
        }

        let descriptor = load_module(self.fs.as_ref(), &descriptor_path, DESCRIPTOR_MODULE)?;
        let tree = DeferredPluginResolver::new(&loader, installer).resolve(descriptor)?;
        self.plugins = tree.plugin_names().into_iter().map(str::to_string).collect();
        debug!(plugins = ?self.plugins, "plugins resolved");

        let modules = tree.post_order();
        let Some((descriptor, plugins)) = modules.split_last() else {
            return Err(BuildError::BuildFailed("descriptor module missing".into()));
        };

        for plugin in plugins {
            collect(plugin, &mut self.manager)?;
            for (key, value) in &plugin.properties {
                project.set_property_if_unset(key.clone(), value.clone());
            }
        }
        collect(descriptor, &mut self.manager)?;

        descriptor.attributes.apply_to(&mut project)?;
        for (key, value) in &descriptor.properties {
            project.set_property(key.clone(), value.clone());
        }
        descriptor.dependencies.apply_to(&mut project);

        for (key, value) in &options.property_overrides {
            project.set_property(key.clone(), Value::String(value.clone()));
        }

        let pending = self.manager.pending_late_dependencies();
        if !pending.is_empty() {
            debug!(targets = ?pending, "late dependencies waiting for resolution");
        }
        self.manager.resolve_dependencies(options.exclusions())?;
        self.project = Some(project);
        Ok(())
    }

    /// Plan for `specifiers` without executing anything.
    pub fn plan_tasks<S: AsRef<str>>(&self, specifiers: &[S]) -> Result<ExecutionPlan> {
        let project = self.prepared_project()?;
        let tasks = expand_task_list(specifiers, &project.default_task);
        if tasks.is_empty() {
            return Err(BuildError::NoDefaultTask);
        }
        self.manager.build_execution_plan(&tasks)
    }

    pub fn build<S: AsRef<str>>(&mut self, specifiers: &[S], environments: &[String]) -> Result<BuildSummary> {
        let started = Instant::now();
        let Self { manager, project, .. } = self;
        let project = project.as_mut().ok_or_else(not_prepared)?;

        if !environments.is_empty() {
            info!(environments = %environments.join(", "), "activated environments");
        }
        project.set_environments(environments.to_vec());
        manager.execute_initializers(project, environments)?;

        let outcome = run_plan(manager, project, specifiers);
        let finalized = manager.execute_finalizers(project, environments);

        let tasks = match (outcome, finalized) {
            (Ok(tasks), Ok(())) => tasks,
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(finalizer_err)) => {
                warn!(error = %finalizer_err, "finalizer failed after build failure");
                return Err(err);
            }
            (Ok(_), Err(finalizer_err)) => return Err(finalizer_err),
        };

        let summary = BuildSummary {
            project_name: project.name().to_string(),
            project_version: project.version().to_string(),
            tasks,
            elapsed: started.elapsed(),
        };
        info!(
            project = %summary.project_name,
            tasks = summary.tasks.len(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "build successful"
        );
        Ok(summary)
    }

    fn prepared_project(&self) -> Result<&Project> {
        self.project.as_ref().ok_or_else(not_prepared)
    }
}

fn not_prepared() -> BuildError {
    BuildError::BuildFailed("build has not been prepared".into())
}

fn run_plan<S: AsRef<str>>(
    manager: &mut ExecutionManager,
    project: &mut Project,
    specifiers: &[S],
) -> Result<Vec<TaskExecutionSummary>> {
    for (key, value) in project.properties() {
        debug!(property = %key, value = %value, "project property");
    }

    let messages = project.validate();
    if !messages.is_empty() {
        return Err(BuildError::ProjectValidationFailed(messages));
    }

    let tasks = expand_task_list(specifiers, &project.default_task);
    if tasks.is_empty() {
        return Err(BuildError::NoDefaultTask);
    }

    let plan = manager.build_execution_plan(&tasks)?;
    debug!(plan = ?plan.names(), "execution plan");
    info!(
        project = %project.name(),
        version = %project.version(),
        dist_version = %project.dist_version(),
        "building"
    );
    info!(basedir = %project.basedir().display(), tasks = ?tasks, "executing build");

    manager.execute_execution_plan(project, &plan)
}
