// src/plugins/mod.rs

//! Plugins compiled into the crate.
//!
//! A plugin named `X` lives in the module `X_plugin` and exposes a
//! `module()` function returning its collectable [`Module`].

pub mod core_plugin;
pub mod exec_plugin;

use crate::descriptor::Module;

/// Every builtin plugin by plain name.
pub fn catalog() -> Vec<(&'static str, fn() -> Module)> {
    vec![
        ("core", core_plugin::module as fn() -> Module),
        ("exec", exec_plugin::module),
    ]
}
