//! Vertical proportional layout.

use mdom::{ElementId, InsertPos};

use super::hbox::Align;
use super::{ContainerLayout, distribute};
use crate::config::SizeValue;
use crate::tree::{ComponentId, Tree};

/// Stacks children top-to-bottom and distributes leftover height among
/// children with a `flex` weight.
///
/// The mirror image of the horizontal box: natural-height children are
/// measured first (outer extent including margins), the rest of the
/// container's content height is split by weight with floor rounding and
/// the remainder carried by the last flexed child. Hidden children are
/// skipped entirely.
#[derive(Debug, Default)]
pub struct VBoxLayout {
    container: Option<ComponentId>,
    align: Align,
}

impl VBoxLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

impl ContainerLayout for VBoxLayout {
    fn name(&self) -> &'static str {
        "vbox"
    }

    fn bind(&mut self, container: ComponentId) {
        self.container = Some(container);
    }

    fn container(&self) -> Option<ComponentId> {
        self.container
    }

    fn on_layout(&mut self, tree: &mut Tree, container: ComponentId, target: ElementId) {
        let children = tree.items(container).to_vec();
        for (i, &child) in children.iter().enumerate() {
            let _ = tree.render_child(child, target, Some(InsertPos::At(i)));
        }

        let visible: Vec<ComponentId> = children
            .iter()
            .copied()
            .filter(|&c| !tree.is_hidden(c))
            .collect();

        let mut unflexed_extent = 0i64;
        let mut flexed: Vec<(ComponentId, f64)> = Vec::new();
        for &child in &visible {
            match tree.flex_of(child).filter(|f| *f > 0.0) {
                Some(flex) => flexed.push((child, flex)),
                None => {
                    let _ = tree.perform_layout(child);
                    if let Some(el) = tree.element(child) {
                        unflexed_extent += tree.dom().extent_height(el) as i64;
                    }
                }
            }
        }

        let cross = match self.align {
            Align::Stretch => Some(SizeValue::Px(tree.dom().content_width(target))),
            Align::Auto => None,
        };

        if !flexed.is_empty() {
            let available = tree.dom().content_height(target) as i64;
            let remaining = available - unflexed_extent;
            let weights: Vec<f64> = flexed.iter().map(|(_, f)| *f).collect();
            let shares = distribute(remaining, &weights);
            for ((child, _), share) in flexed.iter().zip(shares) {
                tree.size_child(*child, cross.clone(), Some(SizeValue::Px(share as i32)));
            }
        }

        if let Some(cross) = cross {
            for &child in &visible {
                if tree.flex_of(child).filter(|f| *f > 0.0).is_none() {
                    tree.size_child(child, Some(cross.clone()), None);
                }
            }
        }
    }
}
