mod common;

use std::path::Path;
use std::sync::Arc;

use common::*;
use pybuild::descriptor::{Item, Module, ModuleBuilder};
use pybuild::errors::BuildError;
use pybuild::fs::mock::MockFileSystem;
use pybuild::plugin::{
    BuiltinPluginLoader, DeferredPluginResolver, DispatchingPluginLoader, DownloadingPluginLoader,
    PluginDef, PluginEnvironment, PluginLoader,
};
use pybuild_test_utils::fake_installer::FakeInstaller;

const ENV_DIR: &str = "/work/demo/.pybuild/plugins";

fn environment(fs: &MockFileSystem) -> PluginEnvironment {
    PluginEnvironment::new(Path::new("/work/demo"), Arc::new(fs.clone()))
}

fn dispatcher(fs: &MockFileSystem) -> DispatchingPluginLoader {
    DispatchingPluginLoader::new(vec![
        Box::new(BuiltinPluginLoader::new()),
        Box::new(DownloadingPluginLoader::new(environment(fs))),
    ])
}

fn descriptor_requesting(plugins: &[&str]) -> Module {
    let mut builder = ModuleBuilder::new("build");
    for plugin in plugins {
        builder = builder.use_plugin(PluginDef::new(*plugin, None, None).unwrap());
    }
    builder.build()
}

#[test]
fn downloadable_plugin_is_installed_then_loaded() {
    init_tracing();
    let fs = MockFileSystem::new();
    let installer = FakeInstaller::new(fs.clone(), ENV_DIR).with_plugin(
        "foo",
        "[[task]]\nname = \"foo_task\"\n",
    );
    let loader = dispatcher(&fs);

    let tree = DeferredPluginResolver::new(&loader, Some(&installer))
        .resolve(descriptor_requesting(&["pypi:foo"]))
        .unwrap();

    assert_eq!(installer.calls(), vec![vec!["pypi:foo".to_string()]]);
    assert_eq!(tree.plugin_names(), vec!["pypi:foo"]);
    let order: Vec<&str> = tree.post_order().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(order, vec!["foo", "build"]);
}

#[test]
fn plugins_requested_by_installed_plugins_are_discovered() {
    let fs = MockFileSystem::new();
    let installer = FakeInstaller::new(fs.clone(), ENV_DIR)
        .with_plugin("foo", "plugins = [\"pypi:bar\"]\n\n[[task]]\nname = \"foo_task\"\n")
        .with_plugin("bar", "[[task]]\nname = \"bar_task\"\n");
    let loader = dispatcher(&fs);

    let tree = DeferredPluginResolver::new(&loader, Some(&installer))
        .resolve(descriptor_requesting(&["pypi:foo"]))
        .unwrap();

    assert_eq!(
        installer.calls(),
        vec![vec!["pypi:foo".to_string()], vec!["pypi:bar".to_string()]]
    );
    let order: Vec<&str> = tree.post_order().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(order, vec!["bar", "foo", "build"]);
}

#[test]
fn missing_plugins_of_one_pass_are_installed_together() {
    let fs = MockFileSystem::new();
    let installer = FakeInstaller::new(fs.clone(), ENV_DIR)
        .with_plugin("foo", "")
        .with_plugin("bar", "");
    let loader = dispatcher(&fs);

    let tree = DeferredPluginResolver::new(&loader, Some(&installer))
        .resolve(descriptor_requesting(&["pypi:foo", "pypi:bar"]))
        .unwrap();

    assert_eq!(
        installer.calls(),
        vec![vec!["pypi:foo".to_string(), "pypi:bar".to_string()]]
    );
    assert_eq!(tree.plugin_count(), 2);
}

#[test]
fn plugin_still_missing_after_install_reports_first_failure() {
    let fs = MockFileSystem::new();
    let installer = FakeInstaller::new(fs.clone(), ENV_DIR);
    let loader = dispatcher(&fs);

    let err = DeferredPluginResolver::new(&loader, Some(&installer))
        .resolve(descriptor_requesting(&["pypi:ghost"]))
        .unwrap_err();

    assert!(matches!(err, BuildError::MissingPlugin(ref name) if name.contains("pypi:ghost")));
    assert_eq!(installer.calls().len(), 1);
}

#[test]
fn without_installer_missing_plugin_fails() {
    let fs = MockFileSystem::new();
    let loader = dispatcher(&fs);

    let err = DeferredPluginResolver::new(&loader, None)
        .resolve(descriptor_requesting(&["pypi:ghost"]))
        .unwrap_err();
    assert!(matches!(err, BuildError::MissingPlugin(_)));
}

#[test]
fn already_installed_plugin_needs_no_installer() {
    let fs = MockFileSystem::new();
    fs.add_file(format!("{ENV_DIR}/foo/plugin.toml"), "[[task]]\nname = \"foo_task\"\n");
    let loader = dispatcher(&fs);

    let tree = DeferredPluginResolver::new(&loader, None)
        .resolve(descriptor_requesting(&["pypi:foo"]))
        .unwrap();
    assert_eq!(tree.plugin_names(), vec!["pypi:foo"]);
}

#[test]
fn unknown_builtin_plugin_fails_immediately() {
    let fs = MockFileSystem::new();
    let installer = FakeInstaller::new(fs.clone(), ENV_DIR);
    let loader = dispatcher(&fs);

    let err = DeferredPluginResolver::new(&loader, Some(&installer))
        .resolve(descriptor_requesting(&["no_such_plugin"]))
        .unwrap_err();

    assert!(matches!(err, BuildError::MissingPlugin(_)));
    assert!(installer.calls().is_empty());
}

#[test]
fn shared_plugin_is_loaded_once_and_collected_first() {
    let fs = MockFileSystem::new();
    let loader = dispatcher(&fs);

    let tree = DeferredPluginResolver::new(&loader, None)
        .resolve(descriptor_requesting(&["exec", "core"]))
        .unwrap();

    assert_eq!(tree.plugin_names(), vec!["exec", "core"]);
    let order: Vec<&str> = tree.post_order().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(order, vec!["core", "exec", "build"]);
}

#[test]
fn incompatible_core_version_is_rejected() {
    let fs = MockFileSystem::new();
    fs.add_file(format!("{ENV_DIR}/foo/plugin.toml"), "requires_core = \">=99\"\n");
    let loader = DownloadingPluginLoader::new(environment(&fs)).with_core_version("1.0");

    let plugin = PluginDef::new("pypi:foo", None, None).unwrap();
    let err = loader.load_plugin(&plugin).unwrap_err();
    assert!(matches!(
        err,
        BuildError::IncompatiblePlugin { ref required, ref actual, .. } if required == ">=99" && actual == "1.0"
    ));

    let compatible = DownloadingPluginLoader::new(environment(&fs)).with_core_version("99.1");
    assert!(compatible.load_plugin(&plugin).is_ok());
}

#[test]
fn dispatcher_propagates_non_missing_errors() {
    let fs = MockFileSystem::new();
    fs.add_file(format!("{ENV_DIR}/foo/plugin.toml"), "this is = not toml [");
    let loader = dispatcher(&fs);

    let plugin = PluginDef::new("pypi:foo", None, None).unwrap();
    let err = loader.load_plugin(&plugin).unwrap_err();
    assert!(matches!(err, BuildError::CannotLoadDescriptor { .. }));
}

#[test]
fn registered_builtin_plugin_is_available() {
    let loader = BuiltinPluginLoader::empty().register("extra", || {
        ModuleBuilder::new("ignored")
            .item(Item::task("extra_task", |_ctx| Ok(())))
            .build()
    });

    let module = loader.load_plugin(&PluginDef::builtin("extra")).unwrap();
    assert_eq!(module.name, "extra");
    assert_eq!(module.items().len(), 1);
    assert!(matches!(
        loader.load_plugin(&PluginDef::builtin("core")),
        Err(BuildError::MissingPlugin(_))
    ));
}

#[test]
fn plugin_definitions() {
    let pypi = PluginDef::new("pypi:foo", Some("1.2"), None).unwrap();
    assert_eq!(pypi.module_name(), "foo");
    assert_eq!(pypi.install_spec().as_deref(), Some("foo>=1.2"));
    assert_eq!(pypi.to_string(), "pypi:foo (1.2)");

    let renamed = PluginDef::new("pypi:pyyaml", Some("6.0"), Some("yaml")).unwrap();
    assert_eq!(renamed.module_name(), "yaml");
    assert_eq!(renamed.install_spec().as_deref(), Some("pyyaml>=6.0"));
    assert_eq!(renamed.dependency().map(|dep| dep.name.as_str()), Some("pyyaml"));

    let vcs = PluginDef::new("vcs:https://example.org/x.git", None, Some("xmod")).unwrap();
    assert_eq!(vcs.module_name(), "xmod");
    assert_eq!(vcs.install_spec().as_deref(), Some("https://example.org/x.git"));

    let builtin = PluginDef::new("core", None, None).unwrap();
    assert!(!builtin.is_downloadable());
    assert_eq!(builtin.install_spec(), None);
}
