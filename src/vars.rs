//! Layered variable scopes.
//!
//! Variables live in a chain of immutable layers: each layer owns its own
//! map and a reference to its parent. Lookup walks from the top layer toward
//! the base, so the most recently pushed layer wins. Pushing a child returns
//! a new stack and leaves the original untouched; a child discarded at the
//! end of a call can never leak values into a sibling scope or the base.
//!
//! ```text
//! base (session vars)
//!   └── play layer (play vars)
//!         └── run layer (caller-supplied task vars)
//!               └── task layer (task vars, one per task execution)
//! ```
//!
//! There is no deletion: variables are only ever shadowed. A stack is owned
//! by a single session and never shared for concurrent mutation.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// One immutable layer in the chain.
#[derive(Debug)]
struct Layer {
    vars: IndexMap<String, Value>,
    parent: Option<Arc<Layer>>,
}

/// A chained stack of variable layers.
///
/// Cloning is cheap: stacks share their layers, and no layer is mutated
/// once a child references it.
#[derive(Debug, Clone)]
pub struct VarStack {
    top: Arc<Layer>,
}

impl VarStack {
    /// Creates a stack with a single empty base layer.
    pub fn new() -> Self {
        Self::from_map(IndexMap::new())
    }

    /// Creates a stack whose base layer is seeded from `vars`.
    pub fn from_map(vars: IndexMap<String, Value>) -> Self {
        Self {
            top: Arc::new(Layer { vars, parent: None }),
        }
    }

    /// Resolves a key, walking from the top layer toward the base.
    pub fn resolve(&self, key: &str) -> Option<&Value> {
        let mut layer = &self.top;
        loop {
            if let Some(value) = layer.vars.get(key) {
                return Some(value);
            }
            match &layer.parent {
                Some(parent) => layer = parent,
                None => return None,
            }
        }
    }

    /// Returns true if the key resolves in any layer.
    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// Returns a new stack with `overrides` pushed as the top layer.
    ///
    /// An empty overrides map still creates a distinct layer; the new stack
    /// behaves as a pass-through view of its parent.
    pub fn push_child(&self, overrides: IndexMap<String, Value>) -> VarStack {
        VarStack {
            top: Arc::new(Layer {
                vars: overrides,
                parent: Some(Arc::clone(&self.top)),
            }),
        }
    }

    /// Extends this stack with `vars` at load time.
    ///
    /// A fresh stack (single empty base layer) is reseeded in place;
    /// otherwise `vars` become a new child layer. In both cases every
    /// previously visible key stays resolvable and `vars` override.
    pub fn extend(&mut self, vars: IndexMap<String, Value>) {
        if self.top.parent.is_none() && self.top.vars.is_empty() {
            self.top = Arc::new(Layer { vars, parent: None });
        } else {
            *self = self.push_child(vars);
        }
    }

    /// Flattens the chain into one map, base first so upper layers win.
    pub fn flatten(&self) -> IndexMap<String, Value> {
        let mut layers = Vec::new();
        let mut layer = Some(&self.top);
        while let Some(l) = layer {
            layers.push(l);
            layer = l.parent.as_ref();
        }

        let mut merged = IndexMap::new();
        for l in layers.into_iter().rev() {
            for (key, value) in &l.vars {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Returns the number of layers in the chain.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut layer = &self.top;
        while let Some(parent) = &layer.parent {
            depth += 1;
            layer = parent;
        }
        depth
    }

    /// Returns true if no layer defines any variable.
    pub fn is_empty(&self) -> bool {
        let mut layer = &self.top;
        loop {
            if !layer.vars.is_empty() {
                return false;
            }
            match &layer.parent {
                Some(parent) => layer = parent,
                None => return true,
            }
        }
    }
}

impl Default for VarStack {
    fn default() -> Self {
        Self::new()
    }
}
