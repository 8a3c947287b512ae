// src/execution/mod.rs

//! Execution manager: registry, dependency resolution, planning and running.
//!
//! The split mirrors the lifecycle of a build:
//! - [`registry`] accumulates tasks, actions and hooks while the descriptor
//!   and plugins are collected, then resolves dependencies once.
//! - [`plan`] turns requested task names into an ordered, duplicate-free
//!   [`ExecutionPlan`].
//! - [`runner`] executes plans, honouring before/after actions,
//!   `only_once` and teardown semantics.
//! - [`state`] is the mutable per-build bookkeeping the runner updates.
//! - [`manager`] is the public façade the reactor talks to.

pub mod manager;
pub mod plan;
pub mod registry;
pub mod runner;
pub mod state;

pub use manager::ExecutionManager;
pub use plan::{ExecutionPlan, Exclusions};
pub use registry::TaskRegistry;
pub use runner::{ReactorHandle, TaskExecutionSummary};
pub use state::ExecutionState;
