// src/descriptor/mod.rs

//! Build descriptor handling.
//!
//! - [`model`] is the serde model of `build.toml` / `plugin.toml`.
//! - [`loader`] reads a file and converts it into a [`Module`].
//! - [`module`] is the collectable form shared with Rust plugins.
//! - [`collector`] registers a module's items with the execution manager.

pub mod collector;
pub mod loader;
pub mod model;
pub mod module;

pub use collector::collect;
pub use loader::{descriptor_path, load_module, DESCRIPTOR_FILE, DESCRIPTOR_MODULE};
pub use model::DescriptorFile;
pub use module::{
    ActionMarkers, DeclaredDependencies, Item, ItemKind, Module, ModuleAttributes, ModuleBuilder,
    TaskMarkers,
};
