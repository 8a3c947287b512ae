mod common;

use std::path::PathBuf;

use common::*;
use pybuild::errors::BuildError;
use pybuild::fs::mock::MockFileSystem;
use pybuild::project::version::canonicalize_version;
use proptest::prelude::*;
use pybuild::project::{Project, VersionSpec};
use regex::Regex;
use toml::Value;

#[test]
fn new_project_defaults() {
    let project = scratch_project();
    assert_eq!(project.name(), "demo");
    assert_eq!(project.version(), "1.0.dev0");
    assert_eq!(project.basedir(), PathBuf::from("/work/demo"));
    assert_eq!(project.property_str("basedir").as_deref(), Some("/work/demo"));
    assert!(project.default_task.is_empty());
}

#[test]
fn empty_name_is_rejected() {
    let mut project = scratch_project();
    assert!(project.set_name("  ").is_err());
    project.set_name("renamed").unwrap();
    assert_eq!(project.name(), "renamed");
}

#[test]
fn dev_version_gets_timestamped_dist_version() {
    let mut project = scratch_project();
    project.set_version("1.2.dev");

    assert_eq!(project.version(), "1.2.dev");
    let pattern = Regex::new(r"^1\.2\.dev[0-9]{14}$").unwrap();
    assert!(pattern.is_match(project.dist_version()), "got {}", project.dist_version());

    project.set_version("1.2");
    assert_eq!(project.dist_version(), "1.2");
}

#[test]
fn expansion_reaches_fixed_point() {
    let mut project = scratch_project();
    project.set_property("dir_target", "target");
    project.set_property("dir_reports", "$dir_target/reports");
    project.set_property("count", 3);

    assert_eq!(project.expand("${dir_reports}/out").unwrap(), "target/reports/out");
    assert_eq!(project.expand("n=$count").unwrap(), "n=3");
    assert_eq!(project.expand("plain text").unwrap(), "plain text");
}

#[test]
fn escaped_dollar_survives_repeated_expansion() {
    let mut project = scratch_project();
    project.set_property("x", "1");

    let once = project.expand("cost $$x").unwrap();
    assert_eq!(once, "cost $$x");
    assert_eq!(project.expand(&once).unwrap(), once);

    assert_eq!(project.expand_literal("cost $$x").unwrap(), "cost $x");
    assert_eq!(project.expand_literal("echo $$HOME/$x").unwrap(), "echo $HOME/1");
}

fn template_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ /.-][a-z]{0,4}",
        Just("$$".to_string()),
        Just("$alpha".to_string()),
        Just("${beta}".to_string()),
        Just("$gamma".to_string()),
    ]
}

proptest! {
    #[test]
    fn expansion_is_idempotent(pieces in proptest::collection::vec(template_piece(), 0..8)) {
        let mut project = scratch_project();
        project.set_property("alpha", "a");
        project.set_property("beta", "$alpha/b");
        project.set_property("gamma", "$$alpha");

        let template = pieces.concat();
        let once = project.expand(&template).unwrap();
        prop_assert_eq!(project.expand(&once).unwrap(), once);
    }
}

#[test]
fn expansion_of_missing_property_fails() {
    let project = scratch_project();
    let err = project.expand("$nowhere").unwrap_err();
    assert!(matches!(err, BuildError::MissingProperty(ref key) if key == "nowhere"));
}

#[test]
fn self_growing_expansion_is_rejected() {
    let mut project = scratch_project();
    project.set_property("grow", "x$grow");
    let err = project.expand("$grow").unwrap_err();
    assert!(matches!(err, BuildError::BuildFailed(_)));
}

#[test]
fn expand_path_is_normalised_under_basedir() {
    let mut project = scratch_project();
    project.set_property("dir_source", "src/./main/../python");
    let path = project.expand_path("$dir_source", &["pkg/../mod"]).unwrap();
    assert_eq!(path, PathBuf::from("/work/demo/src/python/mod"));
}

#[test]
fn setting_basedir_property_moves_basedir() {
    let mut project = scratch_project();
    project.set_property("basedir", "/elsewhere");
    assert_eq!(project.basedir(), PathBuf::from("/elsewhere"));
}

#[test]
fn property_accessors() {
    let mut project = scratch_project();
    project.set_property_if_unset("flag", true);
    project.set_property_if_unset("flag", false);

    assert_eq!(project.get_property("flag"), Some(&Value::Boolean(true)));
    assert_eq!(project.get_property_or("absent", "fallback"), Value::String("fallback".into()));
    assert!(project.has_property("flag"));
    assert!(matches!(
        project.get_mandatory_property("absent"),
        Err(BuildError::MissingProperty(_))
    ));
}

#[test]
fn version_canonicalisation() {
    assert_eq!(canonicalize_version("1.0").unwrap(), ">=1.0");
    assert_eq!(canonicalize_version("<2, >=1.0").unwrap(), "<2,>=1.0");
    assert_eq!(canonicalize_version("==1.4.*").unwrap(), "==1.4.*");
    assert!(matches!(
        canonicalize_version("not a version"),
        Err(BuildError::InvalidVersion(_))
    ));
    assert!(canonicalize_version(">=1.*").is_err());
}

#[test]
fn version_spec_matching() {
    let spec = VersionSpec::parse(">=1.0,<2").unwrap();
    assert!(spec.matches("1.0"));
    assert!(spec.matches("1.9.3"));
    assert!(!spec.matches("2.0"));
    assert!(!spec.matches("0.9"));

    let compatible = VersionSpec::parse("~=1.4.2").unwrap();
    assert!(compatible.matches("1.4.5"));
    assert!(!compatible.matches("1.5.0"));

    let wildcard = VersionSpec::parse("!=1.3.*").unwrap();
    assert!(wildcard.matches("1.4"));
    assert!(!wildcard.matches("1.3.7"));
}

#[test]
fn dependencies_are_deduplicated_by_name_version_url() {
    let mut project = scratch_project();
    project.depends_on("requests", Some("2.0")).unwrap();
    project.depends_on("requests", Some("2.0")).unwrap();
    project.build_depends_on("pytest", None).unwrap();
    project.depends_on_requirements("requirements.txt");

    let runtime: Vec<(&str, Option<&str>)> = project
        .dependencies()
        .map(|d| (d.name(), d.version()))
        .collect();
    assert_eq!(
        runtime,
        vec![("requests", Some(">=2.0")), ("requirements.txt", None)]
    );
    assert_eq!(project.build_dependencies().count(), 1);
    assert!(project.validate().is_empty());
}

#[test]
fn validation_messages() {
    let mut project = scratch_project();
    project.depends_on("requests", Some("1.0")).unwrap();
    project.depends_on("requests", Some("2.0")).unwrap();
    project.build_depends_on("pytest", Some("6.0")).unwrap();
    project.build_depends_on("pytest", Some("7.0")).unwrap();
    project.depends_on("pytest", None).unwrap();

    let messages = project.validate();
    assert!(messages.contains(&"Build dependency 'pytest' has been defined multiple times.".to_string()));
    assert!(messages.contains(&"Runtime dependency 'requests' has been defined multiple times.".to_string()));
    assert!(messages.contains(&"Runtime dependency 'pytest' has also been given as build dependency.".to_string()));
    assert_eq!(messages.len(), 3);
}

#[test]
fn include_file_records_manifest_and_package_data() {
    let mut project = scratch_project();
    project.include_file("spam.eggs", "data.json").unwrap();

    assert_eq!(project.manifest_included_files(), &["spam/eggs/data.json".to_string()]);
    assert_eq!(
        project.package_data().get("spam.eggs"),
        Some(&vec!["data.json".to_string()])
    );
    assert!(matches!(
        project.include_file("spam", " "),
        Err(BuildError::BuildFailed(ref msg)) if msg.contains("filename")
    ));
}

#[test]
fn include_directory_matches_file_names_recursively() {
    let fs = MockFileSystem::new();
    fs.add_file("/work/demo/src/spam/templates/a.html", "");
    fs.add_file("/work/demo/src/spam/templates/nested/b.html", "");
    fs.add_file("/work/demo/src/spam/templates/c.txt", "");
    fs.add_file("/work/demo/src/spam/templates/d.css", "");

    let mut project = scratch_project();
    project
        .include_directory("spam/templates", &["*.html", "*.css"], "src", &fs)
        .unwrap();

    let mut files = project.package_data().get("spam.templates").cloned().unwrap();
    files.sort();
    assert_eq!(files, vec!["a.html", "d.css", "nested/b.html"]);
    assert_eq!(project.manifest_included_directories().len(), 1);
}

#[test]
fn include_directory_requires_patterns() {
    let fs = MockFileSystem::new();
    let mut project = scratch_project();
    assert!(project.include_directory("spam", &[], "src", &fs).is_err());
    assert!(project.include_directory("", &["*"], "src", &fs).is_err());
}
