// src/plugin/tree.rs

use std::collections::HashSet;

use crate::descriptor::Module;

#[derive(Debug)]
struct Node {
    key: String,
    module: Module,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Which module requested which plugin.
///
/// The root is the build descriptor. Every loaded plugin hangs below the
/// module whose request loaded it first; later requests for the same plugin
/// only add an edge. [`post_order`](Self::post_order) yields children before
/// their parents, the root last.
#[derive(Debug)]
pub struct ModuleTraversalTree {
    nodes: Vec<Node>,
}

impl ModuleTraversalTree {
    pub const ROOT: usize = 0;

    pub fn new(root: Module) -> Self {
        Self {
            nodes: vec![Node {
                key: root.name.clone(),
                module: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Attach `module` under `parent`, keyed by the request name `key`.
    pub fn add_child(&mut self, parent: usize, key: impl Into<String>, module: Module) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            key: key.into(),
            module,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        index
    }

    /// Record that `parent` also requested the already loaded `child`.
    pub fn add_edge(&mut self, parent: usize, child: usize) {
        if parent != child && !self.nodes[parent].children.contains(&child) {
            self.nodes[parent].children.push(child);
        }
    }

    /// Node of a loaded plugin by request name. The root is not a plugin.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.nodes
            .iter()
            .skip(1)
            .position(|node| node.key == key)
            .map(|pos| pos + 1)
    }

    pub fn module(&self, index: usize) -> &Module {
        &self.nodes[index].module
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes[index].parent
    }

    pub fn children(&self, index: usize) -> &[usize] {
        &self.nodes[index].children
    }

    /// Number of loaded plugins.
    pub fn plugin_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Request names of the loaded plugins, in load order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.nodes.iter().skip(1).map(|n| n.key.as_str()).collect()
    }

    /// Modules in post-order: every module after all modules it requested.
    pub fn post_order(&self) -> Vec<&Module> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = HashSet::new();
        self.visit(Self::ROOT, &mut visited, &mut order);
        order.into_iter().map(|i| &self.nodes[i].module).collect()
    }

    fn visit(&self, index: usize, visited: &mut HashSet<usize>, order: &mut Vec<usize>) {
        if !visited.insert(index) {
            return;
        }
        for &child in &self.nodes[index].children {
            self.visit(child, visited, order);
        }
        order.push(index);
    }
}
