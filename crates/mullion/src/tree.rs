//! The component arena and its collaborators.
//!
//! Every component lives in one [`Tree`], keyed by a generational
//! [`ComponentId`]. The tree also owns the document surface, the
//! animation engine, the mask factory and the type registry — the
//! collaborators are injected here once instead of living in global
//! singletons. Parent links and child sequences are ids, so the mutual
//! Component/Container reference is a lookup, not an ownership cycle, and
//! destruction is plain arena removal.

use std::collections::HashSet;

use mdom::{Document, ElementId};
use slotmap::{SlotMap, new_key_type};

use crate::animate::{AnimationEngine, InstantEngine};
use crate::component::ComponentNode;
use crate::error::Result;
use crate::events::Event;
use crate::mask::{BasicMask, MaskSurface};
use crate::registry::{ComponentRegistry, TypeEntry};

new_key_type! {
    /// Handle to a component. Generational: ids of destroyed components
    /// are detected as stale instead of aliasing newer components.
    pub struct ComponentId;
}

/// The component arena plus the collaborators every operation needs.
pub struct Tree {
    pub(crate) components: SlotMap<ComponentId, ComponentNode>,
    pub(crate) dom: Document,
    pub(crate) registry: ComponentRegistry,
    pub(crate) engine: Box<dyn AnimationEngine>,
    pub(crate) mask_factory: Box<dyn Fn() -> Box<dyn MaskSurface>>,
    pub(crate) relay: Option<Box<dyn FnMut(&Event)>>,
    /// Open layout-pass completion frames (innermost last).
    pub(crate) layout_watch: Vec<HashSet<ComponentId>>,
    /// Containers currently mid-pass; re-entrant passes are absorbed.
    pub(crate) active_passes: HashSet<ComponentId>,
    pub(crate) next_seq: u64,
    pub(crate) next_handler: u64,
}

impl Tree {
    /// A tree with the default collaborators: instant animations and the
    /// basic mask visual.
    pub fn new() -> Self {
        Self::with_engine(Box::new(InstantEngine::new()))
    }

    /// A tree driving visibility transitions through the given engine.
    pub fn with_engine(engine: Box<dyn AnimationEngine>) -> Self {
        Self {
            components: SlotMap::with_key(),
            dom: Document::new(),
            registry: ComponentRegistry::with_builtins(),
            engine,
            mask_factory: Box::new(|| Box::new(BasicMask::new())),
            relay: None,
            layout_watch: Vec::new(),
            active_passes: HashSet::new(),
            next_seq: 0,
            next_handler: 0,
        }
    }

    /// Replace the mask visual used for every subsequent mask request.
    pub fn set_mask_factory<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn MaskSurface> + 'static,
    {
        self.mask_factory = Box::new(factory);
    }

    pub fn dom(&self) -> &Document {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Document {
        &mut self.dom
    }

    /// The document body — the usual top-level render target.
    pub fn body(&self) -> ElementId {
        self.dom.body()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register an application component type.
    pub fn register_ctype(&mut self, name: &str, entry: TypeEntry) -> Result<()> {
        self.registry.register(name, entry)
    }

    /// Number of live components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentConfig;

    #[test]
    fn ids_are_generational() {
        let mut tree = Tree::new();
        let a = tree.component(ComponentConfig::new());
        tree.destroy(a);
        let b = tree.component(ComponentConfig::new());
        assert_ne!(a, b);
        assert!(tree.is_destroyed(a));
        assert!(!tree.is_destroyed(b));
    }

    #[test]
    fn item_ids_are_process_unique() {
        let mut tree = Tree::new();
        let a = tree.component(ComponentConfig::new());
        let b = tree.component(ComponentConfig::new());
        assert_ne!(tree.item_id(a), tree.item_id(b));
    }
}
