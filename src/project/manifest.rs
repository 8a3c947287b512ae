// src/project/manifest.rs

//! Manifest and package-data bookkeeping.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::project::model::Project;

fn invalid_argument(name: &str) -> BuildError {
    BuildError::BuildFailed(format!("missing argument {name}"))
}

fn package_path(package: &str) -> String {
    package.replace('.', "/")
}

impl Project {
    /// Include `filename` of `package` in the manifest and the package data.
    pub fn include_file(&mut self, package: &str, filename: &str) -> Result<()> {
        if filename.trim().is_empty() {
            return Err(invalid_argument("filename"));
        }
        let full = if package.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", package_path(package), filename)
        };
        self.manifest_included_files.push(full);
        self.add_package_data(package, filename);
        Ok(())
    }

    /// Include every file below `package_path` whose name matches one of
    /// `patterns`. The directory is resolved against `package_root`, which
    /// is itself expanded relative to the base directory.
    pub fn include_directory(
        &mut self,
        package_path: &str,
        patterns: &[&str],
        package_root: &str,
        fs: &dyn FileSystem,
    ) -> Result<()> {
        if package_path.trim().is_empty() {
            return Err(invalid_argument("package_path"));
        }
        if patterns.is_empty() {
            return Err(invalid_argument("patterns_list"));
        }

        let matcher = build_matcher(patterns)?;
        let package_name = package_path.replace(['/', '\\'], ".");
        self.manifest_included_directories.push((
            package_path.to_string(),
            patterns.iter().map(|p| p.to_string()).collect(),
        ));

        let root = self.expand_path(package_root, &[package_path])?;
        let mut found = Vec::new();
        collect_matching(fs, &root, &root, &matcher, &mut found)?;
        debug!(package = %package_name, files = found.len(), "included directory");

        for relative in found {
            self.add_package_data(&package_name, &relative);
        }
        Ok(())
    }

    fn add_package_data(&mut self, package: &str, filename: &str) {
        self.package_data
            .entry(package.to_string())
            .or_default()
            .push(filename.replace('\\', "/"));
    }
}

fn build_matcher(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| BuildError::BuildFailed(format!("invalid pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| BuildError::BuildFailed(format!("invalid patterns: {e}")))
}

fn collect_matching(
    fs: &dyn FileSystem,
    root: &Path,
    dir: &Path,
    matcher: &GlobSet,
    found: &mut Vec<String>,
) -> Result<()> {
    if !fs.is_dir(dir) {
        return Ok(());
    }
    for entry in fs.read_dir(dir)? {
        if fs.is_dir(&entry) {
            collect_matching(fs, root, &entry, matcher, found)?;
            continue;
        }
        let Some(name) = entry.file_name() else { continue };
        if matcher.is_match(name) {
            if let Ok(relative) = entry.strip_prefix(root) {
                found.push(relative.to_string_lossy().into_owned());
            }
        }
    }
    Ok(())
}
