// src/registry/mod.rs

//! Registry primitives: the values the execution manager stores.
//!
//! - [`executable`] wraps a callable body with a validated name, a
//!   description and its declared parameters.
//! - [`task`] groups executables sharing a name plus their dependencies.
//! - [`action`] is an executable hooked before/after named tasks.
//! - [`hooks`] holds initializers and finalizers gated by environments.
//! - [`context`] is what every body receives when it runs.

pub mod action;
pub mod context;
pub mod executable;
pub mod hooks;
pub mod task;

pub use action::Action;
pub use context::{TaskContext, TaskLogger};
pub use executable::{validate_name, Callable, Executable};
pub use hooks::{Finalizer, Initializer};
pub use task::{Task, TaskDependency};
