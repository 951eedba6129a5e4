//! Multi-column layout.

use mdom::{ElementId, InsertPos};

use super::{ContainerLayout, distribute};
use crate::config::SizeValue;
use crate::tree::{ComponentId, Tree};

/// Proportional columns: widths distribute across the horizontal axis,
/// heights are never touched.
///
/// A child's weight is its `column_width` fraction when configured,
/// falling back to its `flex` share. Fixed-width children keep their
/// natural width and shrink the pool first; the same floor-and-carry
/// distribution as the box layouts keeps the column widths summing to
/// the leftover extent exactly.
#[derive(Debug, Default)]
pub struct ColumnLayout {
    container: Option<ComponentId>,
}

impl ColumnLayout {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContainerLayout for ColumnLayout {
    fn name(&self) -> &'static str {
        "column"
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

        let mut unweighted_extent = 0i64;
        let mut weighted: Vec<(ComponentId, f64)> = Vec::new();
        for &child in &visible {
            match tree.column_weight(child).filter(|w| *w > 0.0) {
                Some(weight) => weighted.push((child, weight)),
                None => {
                    let _ = tree.perform_layout(child);
                    if let Some(el) = tree.element(child) {
                        unweighted_extent += tree.dom().extent_width(el) as i64;
                    }
                }
            }
        }

        if weighted.is_empty() {
            return;
        }
        let available = tree.dom().content_width(target) as i64;
        let remaining = available - unweighted_extent;
        let weights: Vec<f64> = weighted.iter().map(|(_, w)| *w).collect();
        let shares = distribute(remaining, &weights);
        for ((child, _), share) in weighted.iter().zip(shares) {
            // Heights stay with the children; columns only size widths.
            tree.size_child(*child, Some(SizeValue::Px(share as i32)), None);
        }
    }
}
