//! Default stacking layout.

use mdom::{ElementId, InsertPos};

use super::ContainerLayout;
use crate::tree::{ComponentId, Tree};

/// Stacking layout: children render in document flow at their sequence
/// index and keep their natural sizes.
///
/// This is the default every container gets when no layout is configured.
#[derive(Debug, Default)]
pub struct AutoLayout {
    container: Option<ComponentId>,
}

impl AutoLayout {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContainerLayout for AutoLayout {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn bind(&mut self, container: ComponentId) {
        self.container = Some(container);
    }

    fn container(&self) -> Option<ComponentId> {
        self.container
    }

    fn on_layout(&mut self, tree: &mut Tree, container: ComponentId, target: ElementId) {
        for (i, child) in tree.items(container).to_vec().into_iter().enumerate() {
            let _ = tree.render_child(child, target, Some(InsertPos::At(i)));
        }
    }
}
