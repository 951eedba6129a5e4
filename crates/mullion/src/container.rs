//! Container child collection management.
//!
//! A container is a component that owns an ordered sequence of child
//! components and one layout strategy. Order is significant — it drives
//! render position, flex order and traversal order. The invariants this
//! module maintains:
//!
//! - a component appears in at most one container's sequence at a time;
//! - inserting a child already owned by another container detaches it
//!   from that container first, non-destructively;
//! - inserting a child already present in *this* container is a reorder,
//!   with its own notification, never an add;
//! - a batch of mutations triggers exactly one layout pass.

use crate::component::CompFlags;
use crate::config::{ChildSpec, ComponentConfig};
use crate::error::{Error, Result};
use crate::events::{Control, EventDetail, EventKind};
use crate::layout::{AutoLayout, ContainerLayout};
use crate::tree::{ComponentId, Tree};

/// Container extension state carried by container nodes.
pub(crate) struct ContainerState {
    /// Ordered child sequence.
    pub(crate) items: Vec<ComponentId>,
    /// The bound layout strategy. Created lazily with the stacking default
    /// on the first pass when not configured.
    pub(crate) layout: Option<Box<dyn ContainerLayout>>,
    /// Base type children must satisfy; incompatible children are a fatal
    /// error.
    pub(crate) accepts: Option<String>,
    /// Type applied to descriptor children that carry none.
    pub(crate) default_ctype: Option<String>,
    /// Whether removed children are destroyed by default.
    pub(crate) auto_destroy: bool,
}

impl ContainerState {
    pub(crate) fn from_config(config: &ComponentConfig) -> Self {
        Self {
            items: Vec::new(),
            layout: None,
            accepts: config.accepts.clone(),
            default_ctype: config.default_ctype.clone(),
            auto_destroy: config.auto_destroy,
        }
    }
}

impl Tree {
    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append a child (or descriptor) to the container.
    ///
    /// Returns `Ok(None)` when the add was vetoed or the descriptor could
    /// not be resolved; both are normal outcomes.
    pub fn add(
        &mut self,
        container: ComponentId,
        child: impl Into<ChildSpec>,
    ) -> Result<Option<ComponentId>> {
        self.insert_item(container, usize::MAX, child)
    }

    /// Append several children with a single layout pass at the end.
    pub fn add_all(
        &mut self,
        container: ComponentId,
        children: Vec<ChildSpec>,
    ) -> Result<Vec<ComponentId>> {
        let mut added = Vec::new();
        for spec in children {
            if let Some(id) = self.attach_child(container, usize::MAX, spec)? {
                added.push(id);
            }
        }
        self.layout_after_mutation(container);
        Ok(added)
    }

    /// Insert a child (or descriptor) at `index`, clamped to the sequence.
    ///
    /// A child already in this container is reordered instead; a child
    /// owned by another container is detached from it first.
    pub fn insert_item(
        &mut self,
        container: ComponentId,
        index: usize,
        child: impl Into<ChildSpec>,
    ) -> Result<Option<ComponentId>> {
        let added = self.attach_child(container, index, child.into())?;
        if added.is_some() {
            self.layout_after_mutation(container);
        }
        Ok(added)
    }

    fn attach_child(
        &mut self,
        container: ComponentId,
        index: usize,
        spec: ChildSpec,
    ) -> Result<Option<ComponentId>> {
        let (accepts, default_ctype, len) = {
            let Some(node) = self.components.get(container) else {
                return Err(Error::UnknownComponent);
            };
            let Some(state) = node.container.as_ref() else {
                return Err(Error::NotAContainer);
            };
            (
                state.accepts.clone(),
                state.default_ctype.clone(),
                state.items.len(),
            )
        };

        // Normalize descriptors through the factory.
        let child = match spec {
            ChildSpec::Existing(c) => {
                if !self.components.contains_key(c) {
                    log::warn!("ignoring add of a destroyed component");
                    return Ok(None);
                }
                c
            }
            ChildSpec::Config(mut config) => {
                if config.ctype.is_none() {
                    config.ctype = default_ctype.or_else(|| Some("component".to_string()));
                }
                match self.create(config) {
                    Some(c) => c,
                    None => return Ok(None),
                }
            }
        };

        if child == container {
            log::warn!("a container cannot contain itself");
            return Ok(None);
        }

        // Type acceptance is a hard contract.
        if let Some(accepts) = accepts {
            let child_ctype = self.components[child].ctype.clone();
            if !self.registry.is_type(&child_ctype, &accepts) {
                return Err(Error::IncompatibleChild {
                    child: child_ctype,
                    accepts,
                });
            }
        }

        // Already ours: a reorder, never an add.
        if self.components[child].parent == Some(container) {
            return Ok(self.reorder_child(container, child, index));
        }

        // Owned elsewhere: leave the old container first, non-destructively
        // (the old owner gets its own layout pass for the mutation).
        if let Some(old) = self.components[child].parent {
            if !self.remove(old, child, Some(false))? {
                // The old owner vetoed the removal; the add is abandoned.
                return Ok(None);
            }
        }

        let at = index.min(len);
        if self.fire(
            container,
            EventKind::BeforeAdd,
            EventDetail::Added { child, index: at },
        ) == Control::Veto
        {
            return Ok(None);
        }

        let at = {
            let Some(state) = self
                .components
                .get_mut(container)
                .and_then(|n| n.container.as_mut())
            else {
                return Err(Error::NotAContainer);
            };
            let at = index.min(state.items.len());
            state.items.insert(at, child);
            at
        };
        self.components[child].parent = Some(container);
        self.fire(
            container,
            EventKind::Add,
            EventDetail::Added { child, index: at },
        );
        Ok(Some(child))
    }

    fn reorder_child(
        &mut self,
        container: ComponentId,
        child: ComponentId,
        index: usize,
    ) -> Option<ComponentId> {
        let (from, to) = {
            let state = self.components.get_mut(container)?.container.as_mut()?;
            let from = state.items.iter().position(|c| *c == child)?;
            state.items.remove(from);
            let to = index.min(state.items.len());
            state.items.insert(to, child);
            (from, to)
        };
        if from != to {
            self.fire(
                container,
                EventKind::Reorder,
                EventDetail::Reordered { child, from, to },
            );
        }
        Some(child)
    }

    /// Remove a child from the container.
    ///
    /// `destroy` overrides the container's default policy. The child's
    /// surface always leaves the document tree, destroyed or not, so DOM
    /// state stays consistent with ownership.
    pub fn remove(
        &mut self,
        container: ComponentId,
        child: ComponentId,
        destroy: Option<bool>,
    ) -> Result<bool> {
        let removed = self.remove_from(container, child, destroy)?;
        if removed {
            self.layout_after_mutation(container);
        }
        Ok(removed)
    }

    /// Remove every child with a single layout pass at the end.
    pub fn remove_all(
        &mut self,
        container: ComponentId,
        destroy: Option<bool>,
    ) -> Result<Vec<ComponentId>> {
        let items = self.items(container).to_vec();
        let mut removed = Vec::new();
        for child in items {
            if self.remove_from(container, child, destroy)? {
                removed.push(child);
            }
        }
        self.layout_after_mutation(container);
        Ok(removed)
    }

    fn remove_from(
        &mut self,
        container: ComponentId,
        child: ComponentId,
        destroy: Option<bool>,
    ) -> Result<bool> {
        let auto_destroy = {
            let Some(node) = self.components.get(container) else {
                return Err(Error::UnknownComponent);
            };
            let Some(state) = node.container.as_ref() else {
                return Err(Error::NotAContainer);
            };
            if !state.items.contains(&child) {
                return Ok(false);
            }
            state.auto_destroy
        };
        let do_destroy = destroy.unwrap_or(auto_destroy);
        if self.fire(
            container,
            EventKind::BeforeRemove,
            EventDetail::Removed {
                child,
                destroyed: do_destroy,
            },
        ) == Control::Veto
        {
            return Ok(false);
        }
        if let Some(state) = self
            .components
            .get_mut(container)
            .and_then(|n| n.container.as_mut())
        {
            state.items.retain(|c| *c != child);
        }
        if let Some(c) = self.components.get_mut(child) {
            c.parent = None;
        }
        // The surface always leaves the container, destroyed or not.
        if let Some(el) = self.element(child) {
            self.dom.detach(el);
        }
        if do_destroy {
            self.destroy(child);
        }
        self.fire(
            container,
            EventKind::Remove,
            EventDetail::Removed {
                child,
                destroyed: do_destroy,
            },
        );
        Ok(true)
    }

    fn layout_after_mutation(&mut self, container: ComponentId) {
        // perform_layout defers internally when the container cannot lay
        // out yet.
        let _ = self.perform_layout(container);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The ordered child sequence. Empty for non-containers.
    pub fn items(&self, container: ComponentId) -> &[ComponentId] {
        self.components
            .get(container)
            .and_then(|n| n.container.as_ref())
            .map(|s| s.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn item_at(&self, container: ComponentId, index: usize) -> Option<ComponentId> {
        self.items(container).get(index).copied()
    }

    /// Index of a direct child. Linear scan; sequences are small.
    pub fn index_of(&self, container: ComponentId, child: ComponentId) -> Option<usize> {
        self.items(container).iter().position(|c| *c == child)
    }

    pub fn has_item(&self, container: ComponentId, child: ComponentId) -> bool {
        self.index_of(container, child).is_some()
    }

    pub fn item_count(&self, container: ComponentId) -> usize {
        self.items(container).len()
    }

    // =========================================================================
    // Layout entry points
    // =========================================================================

    /// Run the component's layout pass.
    ///
    /// Containers delegate to their bound layout (created lazily with the
    /// stacking default); leaves just announce completion. A component
    /// that is unrendered or hidden defers the pass until it can run.
    pub fn perform_layout(&mut self, id: ComponentId) -> Result<()> {
        let Some(node) = self.components.get(id) else {
            return Ok(());
        };
        if !node.flags.contains(CompFlags::RENDERED) || node.flags.contains(CompFlags::HIDDEN) {
            if let Some(n) = self.components.get_mut(id) {
                n.layout_pending = true;
            }
            return Ok(());
        }
        if node.container.is_some() {
            // Re-entrant passes on the same container are absorbed; this
            // also keeps the lazy default out while a strategy is
            // temporarily removed from its slot.
            if self.active_passes.contains(&id) {
                return Ok(());
            }
            self.active_passes.insert(id);
            // Lazy default: an unconfigured container stacks.
            {
                let state = self
                    .components
                    .get_mut(id)
                    .and_then(|n| n.container.as_mut())
                    .expect("checked above");
                if state.layout.is_none() {
                    let mut auto: Box<dyn ContainerLayout> = Box::new(AutoLayout::new());
                    auto.bind(id);
                    state.layout = Some(auto);
                }
            }
            let layout = self
                .components
                .get_mut(id)
                .and_then(|n| n.container.as_mut())
                .and_then(|s| s.layout.take());
            if let Some(mut layout) = layout {
                if let Some(target) = self.element(id) {
                    self.run_layout_pass(id, layout.as_mut(), target);
                }
                // Put the strategy back unless the pass replaced it.
                if let Some(state) = self
                    .components
                    .get_mut(id)
                    .and_then(|n| n.container.as_mut())
                {
                    if state.layout.is_none() {
                        state.layout = Some(layout);
                    }
                }
            }
            self.active_passes.remove(&id);
        }
        if let Some(n) = self.components.get_mut(id) {
            n.layout_pending = false;
        }
        self.note_layout_done(id);
        self.fire(id, EventKind::AfterLayout, EventDetail::None);
        Ok(())
    }

    /// External viewport entry point: apply the new size and re-enter the
    /// layout machinery at the top.
    pub fn handle_viewport_resize(&mut self, id: ComponentId, width: i32, height: i32) {
        log::debug!("viewport resize {:?} to {}x{}", id, width, height);
        self.set_size(id, Some(width.into()), Some(height.into()));
        let _ = self.perform_layout(id);
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Depth-first pre-order walk. `f` returning `false` prunes that
    /// branch; sibling branches still run.
    pub fn cascade<F>(&self, root: ComponentId, mut f: F)
    where
        F: FnMut(ComponentId) -> bool,
    {
        self.cascade_inner(root, &mut f);
    }

    fn cascade_inner(&self, id: ComponentId, f: &mut dyn FnMut(ComponentId) -> bool) {
        if !self.components.contains_key(id) {
            return;
        }
        if !f(id) {
            return;
        }
        for child in self.items(id).to_vec() {
            self.cascade_inner(child, f);
        }
    }

    /// Find the first component in the subtree with the given item id.
    pub fn find_by_item_id(&self, root: ComponentId, item_id: &str) -> Option<ComponentId> {
        let mut found = None;
        self.cascade(root, |id| {
            if found.is_some() {
                return false;
            }
            if self.item_id(id) == Some(item_id) {
                found = Some(id);
                return false;
            }
            true
        });
        found
    }

    /// Collect every component in the subtree whose type extends `ctype`.
    pub fn find_by_ctype(&self, root: ComponentId, ctype: &str) -> Vec<ComponentId> {
        let mut out = Vec::new();
        self.cascade(root, |id| {
            if let Some(ct) = self.ctype(id) {
                if self.registry.is_type(ct, ctype) {
                    out.push(id);
                }
            }
            true
        });
        out
    }
}
