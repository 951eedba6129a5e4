//! Horizontal proportional layout.

use mdom::{ElementId, InsertPos};

use super::{ContainerLayout, distribute};
use crate::config::SizeValue;
use crate::tree::{ComponentId, Tree};

/// Cross-axis policy for the box layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Leave the cross axis unconstrained.
    #[default]
    Auto,
    /// Stretch every child to the container's cross extent.
    Stretch,
}

/// Stacks children left-to-right and distributes leftover width among
/// children with a `flex` weight.
///
/// Children without a weight keep their natural size and are measured
/// first; the remaining width is split `flex/totalFlex` per child with
/// floor rounding, the entire remainder going to the last flexed child so
/// the shares sum exactly. Hidden children are skipped entirely.
#[derive(Debug, Default)]
pub struct HBoxLayout {
    container: Option<ComponentId>,
    align: Align,
}

impl HBoxLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

impl ContainerLayout for HBoxLayout {
    fn name(&self) -> &'static str {
        "hbox"
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

        // Natural-size children first; their outer extent (including
        // margins) is what the flex pool cannot have.
        let mut unflexed_extent = 0i64;
        let mut flexed: Vec<(ComponentId, f64)> = Vec::new();
        for &child in &visible {
            match tree.flex_of(child).filter(|f| *f > 0.0) {
                Some(flex) => flexed.push((child, flex)),
                None => {
                    let _ = tree.perform_layout(child);
                    if let Some(el) = tree.element(child) {
                        unflexed_extent += tree.dom().extent_width(el) as i64;
                    }
                }
            }
        }

        let cross = match self.align {
            Align::Stretch => Some(SizeValue::Px(tree.dom().content_height(target))),
            Align::Auto => None,
        };

        if !flexed.is_empty() {
            let available = tree.dom().content_width(target) as i64;
            let remaining = available - unflexed_extent;
            let weights: Vec<f64> = flexed.iter().map(|(_, f)| *f).collect();
            let shares = distribute(remaining, &weights);
            for ((child, _), share) in flexed.iter().zip(shares) {
                tree.size_child(*child, Some(SizeValue::Px(share as i32)), cross.clone());
            }
        }

        if let Some(cross) = cross {
            for &child in &visible {
                if tree.flex_of(child).filter(|f| *f > 0.0).is_none() {
                    tree.size_child(child, None, Some(cross.clone()));
                }
            }
        }
    }
}
