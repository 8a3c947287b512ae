// src/project/dependency.rs

//! Dependency entries.
//!
//! Entries live in ordered sets; ordering and equality use
//! `(name, version, url)` so re-declaring the same dependency is a no-op.
//! Requirement files are entries whose name is the file name.

use std::cmp::Ordering;

use crate::errors::Result;
use crate::project::version::canonicalize_version;

/// A named dependency with an optional canonical version and URL.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
    pub url: Option<String>,
    /// Declared for metadata only, never installed.
    pub declaration_only: bool,
}

impl Dependency {
    /// Create a dependency. `version` is canonicalised: a plain release
    /// becomes `>=<version>`, a specifier set is normalised.
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Result<Self> {
        let version = match version {
            Some(v) if !v.trim().is_empty() => Some(canonicalize_version(v)?),
            _ => None,
        };
        Ok(Self {
            name: name.into(),
            version,
            url: None,
            declaration_only: false,
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn declaration_only(mut self, declaration_only: bool) -> Self {
        self.declaration_only = declaration_only;
        self
    }
}

/// A requirements file whose contents are installed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequirementsFile {
    pub filename: String,
}

impl RequirementsFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DependencyEntry {
    Dependency(Dependency),
    RequirementsFile(RequirementsFile),
}

impl DependencyEntry {
    pub fn name(&self) -> &str {
        match self {
            DependencyEntry::Dependency(dep) => &dep.name,
            DependencyEntry::RequirementsFile(file) => &file.filename,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            DependencyEntry::Dependency(dep) => dep.version.as_deref(),
            DependencyEntry::RequirementsFile(_) => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            DependencyEntry::Dependency(dep) => dep.url.as_deref(),
            DependencyEntry::RequirementsFile(_) => None,
        }
    }

    pub fn is_requirements_file(&self) -> bool {
        matches!(self, DependencyEntry::RequirementsFile(_))
    }

    fn key(&self) -> (&str, Option<&str>, Option<&str>) {
        (self.name(), self.version(), self.url())
    }
}

impl PartialEq for DependencyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DependencyEntry {}

impl PartialOrd for DependencyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencyEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl From<Dependency> for DependencyEntry {
    fn from(dep: Dependency) -> Self {
        DependencyEntry::Dependency(dep)
    }
}

impl From<RequirementsFile> for DependencyEntry {
    fn from(file: RequirementsFile) -> Self {
        DependencyEntry::RequirementsFile(file)
    }
}
