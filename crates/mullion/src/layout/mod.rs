//! Layout strategies for rendering and sizing a container's children.
//!
//! A [`ContainerLayout`] is a stateful strategy bound to exactly one
//! container. The base pass driver guarantees every child is laid out
//! exactly once per pass: children the strategy lays out explicitly are
//! tracked through a per-pass completion frame, and the remainder get a
//! fallback pass afterwards.
//!
//! Shared helpers keep strategies honest about idempotence and the box
//! model: [`Tree::render_child`] only touches the document when a child's
//! placement is not already satisfied, and [`Tree::size_child`] converts
//! an outer target box into the content size actually assigned.

mod auto;
mod card;
mod column;
mod fit;
mod hbox;
mod vbox;

pub use auto::AutoLayout;
pub use card::{CardLayout, CardRef, CardTransition, InstantTransition};
pub use column::ColumnLayout;
pub use fit::FitLayout;
pub use hbox::{Align, HBoxLayout};
pub use vbox::VBoxLayout;

use std::collections::HashSet;

use mdom::{ElementId, InsertPos};

use crate::component::CompFlags;
use crate::config::SizeValue;
use crate::error::{Error, Result};
use crate::events::{EventDetail, EventKind};
use crate::tree::{ComponentId, Tree};

/// A layout strategy bound to one container.
///
/// Layouts are stateful (per-pass caches, card activation state) and are
/// therefore never shared between containers; `Box` ownership enforces
/// the exclusivity.
pub trait ContainerLayout {
    /// Strategy identifier used in logs.
    fn name(&self) -> &'static str;

    /// Bind to the owning container.
    fn bind(&mut self, container: ComponentId);

    fn container(&self) -> Option<ComponentId>;

    /// Render and size the container's children into `target`.
    ///
    /// Children laid out explicitly here are skipped by the fallback pass;
    /// everything else gets its own layout pass afterwards.
    fn on_layout(&mut self, tree: &mut Tree, container: ComponentId, target: ElementId);

    /// Strategy teardown. Idempotent; runs when the layout is replaced or
    /// its container is destroyed.
    fn cleanup(&mut self, _tree: &mut Tree) {}

    /// Downcast for card-specific operations.
    fn as_card(&self) -> Option<&CardLayout> {
        None
    }

    fn as_card_mut(&mut self) -> Option<&mut CardLayout> {
        None
    }
}

impl Tree {
    /// Replace the container's layout strategy.
    ///
    /// Every child's surface is detached so the new strategy starts from a
    /// clean document state, and the old layout is destroyed.
    pub fn set_layout(
        &mut self,
        container: ComponentId,
        mut layout: Box<dyn ContainerLayout>,
    ) -> Result<()> {
        {
            let Some(node) = self.components.get(container) else {
                return Err(Error::UnknownComponent);
            };
            if node.container.is_none() {
                return Err(Error::NotAContainer);
            }
        }
        let items = self.items(container).to_vec();
        for child in items {
            if let Some(el) = self.element(child) {
                self.dom.detach(el);
            }
        }
        let old = self
            .components
            .get_mut(container)
            .and_then(|n| n.container.as_mut())
            .and_then(|s| s.layout.take());
        if let Some(mut old) = old {
            old.cleanup(self);
            self.fire(container, EventKind::LayoutReplaced, EventDetail::None);
        }
        layout.bind(container);
        if let Some(state) = self
            .components
            .get_mut(container)
            .and_then(|n| n.container.as_mut())
        {
            state.layout = Some(layout);
        }
        Ok(())
    }

    /// Drive one layout pass: open a completion frame, run the strategy,
    /// then fallback-layout every child the strategy did not reach.
    pub(crate) fn run_layout_pass(
        &mut self,
        container: ComponentId,
        layout: &mut dyn ContainerLayout,
        target: ElementId,
    ) {
        log::debug!("layout pass `{}` on {:?}", layout.name(), container);
        let children = self.items(container).to_vec();
        // One-shot completion watchers: any child whose own layout pass
        // finishes while this frame is open is marked done, however
        // indirectly it was triggered.
        self.layout_watch.push(HashSet::new());
        layout.on_layout(self, container, target);
        let done = self.layout_watch.pop().unwrap_or_default();
        for child in children {
            if !done.contains(&child) {
                let _ = self.perform_layout(child);
            }
        }
    }

    /// Mark a completed layout in every open pass frame.
    pub(crate) fn note_layout_done(&mut self, id: ComponentId) {
        for frame in &mut self.layout_watch {
            frame.insert(id);
        }
    }

    /// Idempotence guard shared by all strategies.
    ///
    /// The child is (re-)rendered only if it is not yet rendered, or its
    /// surface is not where the request puts it. Otherwise this is a pure
    /// no-op — already-correct children keep their focus and scroll state.
    pub fn render_child(
        &mut self,
        child: ComponentId,
        target: ElementId,
        pos: Option<InsertPos>,
    ) -> Result<()> {
        let Some(node) = self.components.get(child) else {
            return Ok(());
        };
        let needs = if !node.flags.contains(CompFlags::RENDERED) {
            true
        } else if let Some(el) = node.el {
            match pos {
                None => self.dom.parent(el) != Some(target),
                Some(p) => !self.dom.at_position(target, el, p),
            }
        } else {
            true
        };
        if !needs {
            return Ok(());
        }
        self.render(child, target, pos)
    }

    /// Convert an outer target box into the size assigned to the child.
    ///
    /// Pixel targets are reduced by the child's own margin, padding and
    /// border on that axis; string targets pass through unmodified.
    pub fn size_child(
        &mut self,
        child: ComponentId,
        width: Option<SizeValue>,
        height: Option<SizeValue>,
    ) {
        let Some(el) = self.element(child) else {
            return;
        };
        if let Some(w) = width {
            let w = match w {
                SizeValue::Px(n) => {
                    let trim = self.dom.margin(el).horizontal() + self.dom.frame_width(el);
                    SizeValue::Px((n - trim).max(0))
                }
                s => s,
            };
            self.dom.set_style(el, "width", &w.to_css());
        }
        if let Some(h) = height {
            let h = match h {
                SizeValue::Px(n) => {
                    let trim = self.dom.margin(el).vertical() + self.dom.frame_height(el);
                    SizeValue::Px((n - trim).max(0))
                }
                s => s,
            };
            self.dom.set_style(el, "height", &h.to_css());
        }
    }
}

/// Integer flex distribution with exact sum.
///
/// Each weight gets `floor(weight/total * remaining)`; the entire rounding
/// remainder goes to the last entry, so the shares always sum to
/// `remaining` exactly — no drift from repeated rounding.
pub(crate) fn distribute(remaining: i64, weights: &[f64]) -> Vec<i64> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 {
        return vec![0; weights.len()];
    }
    let remaining = remaining.max(0);
    let mut shares = Vec::with_capacity(weights.len());
    let mut assigned = 0i64;
    for (i, weight) in weights.iter().enumerate() {
        let share = if i + 1 == weights.len() {
            remaining - assigned
        } else {
            ((weight / total) * remaining as f64).floor() as i64
        };
        assigned += share;
        shares.push(share);
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribute_carries_remainder_to_last() {
        // 100 over 1:2 → 33.33 floors to 33, the remainder lands on B.
        assert_eq!(distribute(100, &[1.0, 2.0]), vec![33, 67]);
    }

    #[test]
    fn distribute_sums_exactly_for_awkward_ratios() {
        for remaining in [0i64, 1, 7, 99, 100, 101, 997] {
            for weights in [
                vec![1.0, 1.0, 1.0],
                vec![1.0, 2.0, 4.0],
                vec![0.3, 0.3, 0.4],
                vec![5.0],
                vec![1.5, 2.5, 3.5, 4.5],
            ] {
                let shares = distribute(remaining, &weights);
                assert_eq!(
                    shares.iter().sum::<i64>(),
                    remaining.max(0),
                    "weights {weights:?} over {remaining}"
                );
            }
        }
    }

    #[test]
    fn distribute_with_no_weights_is_empty() {
        assert!(distribute(50, &[]).is_empty());
    }

    #[test]
    fn distribute_clamps_negative_remaining() {
        assert_eq!(distribute(-20, &[1.0, 1.0]), vec![0, 0]);
    }
}
