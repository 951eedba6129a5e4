//! Single-active-card layout and its transition strategy.

use std::collections::HashMap;

use mdom::{ElementId, InsertPos};

use super::ContainerLayout;
use crate::component::TransitionOptions;
use crate::config::SizeValue;
use crate::events::{EventDetail, EventKind};
use crate::tree::{ComponentId, Tree};

/// How a card is named when activating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRef {
    /// Position in the container's child sequence.
    Index(usize),
    /// A child reference; rejected if not actually in the container.
    Item(ComponentId),
}

impl From<usize> for CardRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<ComponentId> for CardRef {
    fn from(id: ComponentId) -> Self {
        Self::Item(id)
    }
}

/// Pluggable policy for how the visible card swaps.
///
/// Decouples *which* child becomes active from *how* the visual change
/// happens. `current` and `next` arrive resolved and (for `next`)
/// rendered and sized.
pub trait CardTransition {
    fn activate(
        &mut self,
        tree: &mut Tree,
        container: ComponentId,
        current: Option<ComponentId>,
        next: Option<ComponentId>,
        opts: &TransitionOptions,
    );
}

/// Default transition: immediate hide of the outgoing card, then show.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTransition;

impl CardTransition for InstantTransition {
    fn activate(
        &mut self,
        tree: &mut Tree,
        _container: ComponentId,
        current: Option<ComponentId>,
        next: Option<ComponentId>,
        _opts: &TransitionOptions,
    ) {
        if let Some(current) = current {
            tree.hide(current, TransitionOptions::default());
        }
        if let Some(next) = next {
            tree.show(next, TransitionOptions::default());
        }
    }
}

/// Keeps exactly zero or one child visually active at a time.
///
/// With `deferred_render` (the default) only the active child is ever
/// rendered during a layout pass; the others render lazily the first time
/// they become active. A per-child cache of the last assigned size avoids
/// redundant resizes when a card is re-activated at the same size.
pub struct CardLayout {
    container: Option<ComponentId>,
    /// Activation recorded before the container rendered; resolved on the
    /// next layout pass.
    requested: Option<CardRef>,
    active: Option<ComponentId>,
    deferred_render: bool,
    last_sizes: HashMap<ComponentId, (i32, i32)>,
    transition: Box<dyn CardTransition>,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            container: None,
            requested: None,
            active: None,
            deferred_render: true,
            last_sizes: HashMap::new(),
            transition: Box::new(InstantTransition),
        }
    }
}

impl CardLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// The card active from the first layout pass.
    pub fn with_active(mut self, item: impl Into<CardRef>) -> Self {
        self.requested = Some(item.into());
        self
    }

    /// Render every child up front, hiding the inactive ones, instead of
    /// rendering lazily on first activation.
    pub fn render_all(mut self) -> Self {
        self.deferred_render = false;
        self
    }

    pub fn with_transition(mut self, transition: Box<dyn CardTransition>) -> Self {
        self.transition = transition;
        self
    }

    /// The currently active child, if any.
    pub fn active_item(&self) -> Option<ComponentId> {
        self.active
    }

    fn resolve(tree: &Tree, container: ComponentId, r: CardRef) -> Option<ComponentId> {
        match r {
            CardRef::Index(i) => tree.item_at(container, i),
            CardRef::Item(c) => tree.has_item(container, c).then_some(c),
        }
    }

    fn size_card(&mut self, tree: &mut Tree, target: ElementId, card: ComponentId) {
        let width = tree.dom().content_width(target);
        let height = tree.dom().content_height(target);
        if self.last_sizes.get(&card) == Some(&(width, height)) {
            return;
        }
        tree.size_child(card, Some(SizeValue::Px(width)), Some(SizeValue::Px(height)));
        self.last_sizes.insert(card, (width, height));
    }

    pub(crate) fn set_active(
        &mut self,
        tree: &mut Tree,
        container: ComponentId,
        item: Option<CardRef>,
        opts: &TransitionOptions,
    ) {
        let resolved = item.and_then(|r| Self::resolve(tree, container, r));
        let previous = self.active;
        if !tree.is_rendered(container) {
            // Record only; the real activation happens on the next layout
            // pass.
            self.requested = resolved.map(CardRef::Item);
            self.active = resolved;
            tree.fire(
                container,
                EventKind::CardChange,
                EventDetail::CardChanged {
                    new: resolved,
                    previous,
                },
            );
            return;
        }
        // Only a real change does transition work: a new item, a
        // deactivation, or a nominal current card that is not actually
        // rendered and visible.
        let current_unusable = previous.is_some_and(|c| !tree.is_component_visible(c));
        let is_change = match (resolved, previous) {
            (None, Some(_)) => true,
            (Some(n), p) if p != Some(n) => true,
            (Some(_), _) => current_unusable,
            (None, None) => false,
        };
        if !is_change {
            return;
        }
        if let Some(next) = resolved {
            if let Some(target) = tree.element(container) {
                let _ = tree.render_child(next, target, None);
                self.size_card(tree, target, next);
            }
        }
        let outgoing = previous.filter(|p| Some(*p) != resolved);
        self.transition.activate(tree, container, outgoing, resolved, opts);
        self.active = resolved;
        tree.fire(
            container,
            EventKind::CardChange,
            EventDetail::CardChanged {
                new: resolved,
                previous,
            },
        );
    }
}

impl ContainerLayout for CardLayout {
    fn name(&self) -> &'static str {
        "card"
    }

    fn bind(&mut self, container: ComponentId) {
        self.container = Some(container);
    }

    fn container(&self) -> Option<ComponentId> {
        self.container
    }

    fn on_layout(&mut self, tree: &mut Tree, container: ComponentId, target: ElementId) {
        if let Some(req) = self.requested.take() {
            self.active = Self::resolve(tree, container, req);
        }
        if self.deferred_render {
            // Only the active card ever renders; the others wait for
            // their first activation.
            if let Some(active) = self.active {
                let _ = tree.render_child(active, target, None);
                self.size_card(tree, target, active);
                if tree.is_hidden(active) {
                    tree.show(active, TransitionOptions::default());
                }
            }
        } else {
            let children = tree.items(container).to_vec();
            for (i, &child) in children.iter().enumerate() {
                if Some(child) != self.active && !tree.is_hidden(child) {
                    tree.hide(child, TransitionOptions::default());
                }
                let _ = tree.render_child(child, target, Some(InsertPos::At(i)));
            }
            if let Some(active) = self.active {
                self.size_card(tree, target, active);
                if tree.is_hidden(active) {
                    tree.show(active, TransitionOptions::default());
                }
            }
        }
    }

    fn cleanup(&mut self, _tree: &mut Tree) {
        self.last_sizes.clear();
        self.requested = None;
    }

    fn as_card(&self) -> Option<&CardLayout> {
        Some(self)
    }

    fn as_card_mut(&mut self) -> Option<&mut CardLayout> {
        Some(self)
    }
}

impl Tree {
    /// Activate a card by index or reference.
    ///
    /// No-op (with a warning) when the container's layout is not a card
    /// layout. An index out of range or a reference not in the container
    /// resolves to no card, deactivating the current one.
    pub fn set_active_item(
        &mut self,
        container: ComponentId,
        item: impl Into<CardRef>,
        opts: TransitionOptions,
    ) {
        self.card_set_active(container, Some(item.into()), opts);
    }

    /// Deactivate the current card, leaving none active.
    pub fn clear_active_item(&mut self, container: ComponentId, opts: TransitionOptions) {
        self.card_set_active(container, None, opts);
    }

    fn card_set_active(
        &mut self,
        container: ComponentId,
        item: Option<CardRef>,
        opts: TransitionOptions,
    ) {
        let Some(mut layout) = self
            .components
            .get_mut(container)
            .and_then(|n| n.container.as_mut())
            .and_then(|s| s.layout.take())
        else {
            log::warn!("set_active_item on a component without a bound layout");
            return;
        };
        // The pass guard also keeps a lazy default from sneaking in while
        // the layout is out of its slot.
        self.active_passes.insert(container);
        if let Some(card) = layout.as_card_mut() {
            card.set_active(self, container, item, &opts);
        } else {
            log::warn!("set_active_item on a `{}` layout", layout.name());
        }
        self.active_passes.remove(&container);
        if let Some(state) = self
            .components
            .get_mut(container)
            .and_then(|n| n.container.as_mut())
        {
            if state.layout.is_none() {
                state.layout = Some(layout);
            }
        }
    }

    /// The card layout's active child, if the container has a card layout.
    pub fn active_item(&self, container: ComponentId) -> Option<ComponentId> {
        self.components
            .get(container)?
            .container
            .as_ref()?
            .layout
            .as_ref()?
            .as_card()?
            .active_item()
    }
}
