// src/dag/mod.rs

//! Directed-graph utilities for task dependencies.
//!
//! - [`graph`] holds an ordered name → out-neighbours mapping and reports
//!   every cycle in it (non-trivial strongly connected components plus
//!   self-loops).

pub mod graph;

pub use graph::{Cycle, DependencyGraph};
