// src/project/mod.rs

//! Project model.
//!
//! A [`Project`] is created once per build by the reactor, populated from
//! the descriptor, then read and mutated by initializers and tasks.
//!
//! - [`model`] holds the project itself (attributes, version handling,
//!   dependency helpers).
//! - [`properties`] implements `$name` / `${name}` expansion.
//! - [`dependency`] defines dependency entries and their ordering.
//! - [`version`] parses release versions and specifier sets.
//! - [`manifest`] keeps manifest / package-data bookkeeping.
//! - [`validate`] produces human-readable validation messages.

pub mod dependency;
pub mod manifest;
pub mod model;
pub mod properties;
pub mod validate;
pub mod version;

pub use dependency::{Dependency, DependencyEntry, RequirementsFile};
pub use model::{Author, Project};
pub use version::VersionSpec;
