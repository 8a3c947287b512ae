// src/exec/mod.rs

//! Executable bodies built from descriptor entries.
//!
//! - [`shell`] runs property-expanded shell commands and streams their
//!   output into `tracing`.
//! - [`command_body`] / [`properties_body`] turn descriptor data into
//!   [`Callable`](crate::registry::Callable)s.

pub mod shell;

use std::collections::BTreeMap;
use std::sync::Arc;

use toml::Value;

use crate::registry::{Callable, TaskContext};

pub use shell::{run_shell, shell_command};

/// Body that expands `template` against the project properties at
/// invocation time and runs it through the platform shell.
pub fn command_body(template: impl Into<String>) -> Callable {
    let template = template.into();
    Arc::new(move |ctx: &mut TaskContext<'_>| {
        let command = ctx.project.expand_literal(&template)?;
        run_shell(ctx.logger().name(), &command)
    })
}

/// Body that writes `properties` onto the project.
pub fn properties_body(properties: BTreeMap<String, Value>) -> Callable {
    Arc::new(move |ctx: &mut TaskContext<'_>| {
        for (key, value) in &properties {
            ctx.project.set_property(key.clone(), value.clone());
        }
        Ok(())
    })
}

/// Body for entries that only carry metadata.
pub fn noop_body() -> Callable {
    Arc::new(|_: &mut TaskContext<'_>| Ok(()))
}
