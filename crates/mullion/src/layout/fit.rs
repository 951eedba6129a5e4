//! Single-child fit layout.

use mdom::{ElementId, InsertPos};

use super::ContainerLayout;
use crate::config::SizeValue;
use crate::tree::{ComponentId, Tree};

/// Sizes the first child to the container's full content box.
///
/// Only the first child renders; any other child surfaces are force-
/// detached in case a previous strategy or a reorder left stale placement
/// behind. A cache of the last assigned size avoids resize churn when
/// neither the target size nor the active child changed.
#[derive(Debug, Default)]
pub struct FitLayout {
    container: Option<ComponentId>,
    percent: bool,
    last: Option<(ComponentId, i32, i32)>,
}

impl FitLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the surface engine manage the child size through percentage
    /// styles instead of exact pixel assignment.
    pub fn browser_sized(mut self) -> Self {
        self.percent = true;
        self
    }
}

impl ContainerLayout for FitLayout {
    fn name(&self) -> &'static str {
        "fit"
    }

    fn bind(&mut self, container: ComponentId) {
        self.container = Some(container);
    }

    fn container(&self) -> Option<ComponentId> {
        self.container
    }

    fn on_layout(&mut self, tree: &mut Tree, container: ComponentId, target: ElementId) {
        let children = tree.items(container).to_vec();
        // Stale surfaces from a previous strategy or reordering.
        for &other in children.iter().skip(1) {
            if let Some(el) = tree.element(other) {
                tree.dom_mut().detach(el);
            }
        }
        let Some(&first) = children.first() else {
            self.last = None;
            return;
        };
        let _ = tree.render_child(first, target, Some(InsertPos::At(0)));
        if self.percent {
            tree.size_child(
                first,
                Some(SizeValue::from("100%")),
                Some(SizeValue::from("100%")),
            );
            return;
        }
        let width = tree.dom().content_width(target);
        let height = tree.dom().content_height(target);
        if self.last != Some((first, width, height)) {
            tree.size_child(first, Some(SizeValue::Px(width)), Some(SizeValue::Px(height)));
            self.last = Some((first, width, height));
        }
    }

    fn cleanup(&mut self, _tree: &mut Tree) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentConfig;

    fn fitted_tree() -> (Tree, ComponentId, ComponentId) {
        let mut tree = Tree::new();
        let ct = tree.container(ComponentConfig::new().with_width(400).with_height(300));
        tree.set_layout(ct, Box::new(FitLayout::new())).unwrap();
        let child = tree.component(ComponentConfig::new());
        let body = tree.body();
        tree.render(ct, body, None).unwrap();
        tree.add(ct, child).unwrap();
        (tree, ct, child)
    }

    #[test]
    fn first_child_fills_the_content_box() {
        let (tree, _ct, child) = fitted_tree();
        let el = tree.element(child).unwrap();
        assert_eq!(tree.dom().style(el, "width"), Some("400px"));
        assert_eq!(tree.dom().style(el, "height"), Some("300px"));
    }

    #[test]
    fn extra_children_are_detached() {
        let (mut tree, ct, child) = fitted_tree();
        let second = tree.component(ComponentConfig::new());
        let body = tree.body();
        tree.render(second, body, None).unwrap();
        tree.add(ct, second).unwrap();

        let target = tree.element(ct).unwrap();
        assert_eq!(tree.dom().children(target), &[tree.element(child).unwrap()]);
        assert_eq!(tree.dom().parent(tree.element(second).unwrap()), None);
    }

    #[test]
    fn child_sizing_accounts_for_its_box_model() {
        let mut tree = Tree::new();
        let ct = tree.container(ComponentConfig::new().with_width(400).with_height(300));
        tree.set_layout(ct, Box::new(FitLayout::new())).unwrap();
        let child = tree.component(
            ComponentConfig::new()
                .with_style("margin-left", "10px")
                .with_style("padding-left", "5px")
                .with_style("border-left-width", "1px"),
        );
        let body = tree.body();
        tree.render(ct, body, None).unwrap();
        tree.add(ct, child).unwrap();

        let el = tree.element(child).unwrap();
        // 400 minus margin 10, padding 5, border 1.
        assert_eq!(tree.dom().style(el, "width"), Some("384px"));
    }

    #[test]
    fn percent_mode_defers_to_the_surface() {
        let mut tree = Tree::new();
        let ct = tree.container(ComponentConfig::new().with_width(400).with_height(300));
        tree.set_layout(ct, Box::new(FitLayout::new().browser_sized()))
            .unwrap();
        let child = tree.component(ComponentConfig::new());
        let body = tree.body();
        tree.render(ct, body, None).unwrap();
        tree.add(ct, child).unwrap();

        let el = tree.element(child).unwrap();
        assert_eq!(tree.dom().style(el, "width"), Some("100%"));
        assert_eq!(tree.dom().style(el, "height"), Some("100%"));
    }
}
