//! Mask overlay collaborator.
//!
//! A mask is the busy/loading veil drawn over a component's surface. The
//! core only decides *when* a mask shows (buffering requests until the
//! target is rendered and visible); the visual itself is behind the
//! [`MaskSurface`] trait. [`BasicMask`] is the minimal reference visual:
//! a single overlay element sized to the target.

use mdom::{Document, ElementId};

/// What the overlay displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskConfig {
    pub message: Option<String>,
    pub spinner: bool,
}

impl MaskConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_spinner(mut self) -> Self {
        self.spinner = true;
        self
    }
}

/// Overlay visual bound to one component's mask target.
pub trait MaskSurface {
    /// Create or reveal the overlay over `target`.
    fn show(&mut self, dom: &mut Document, target: ElementId, cfg: &MaskConfig)
    -> Option<ElementId>;

    /// Refresh an already-visible overlay with a new config.
    fn update(&mut self, dom: &mut Document, cfg: &MaskConfig);

    /// Take the overlay down, keeping it reusable.
    fn hide(&mut self, dom: &mut Document);

    /// Discard the overlay entirely.
    fn teardown(&mut self, dom: &mut Document);

    /// Current height of the masked target, for overlay sizing.
    fn target_height(&self, dom: &Document, target: ElementId) -> i32 {
        dom.outer_height(target)
    }
}

/// One overlay element with an optional message, sized to the target.
#[derive(Debug, Default)]
pub struct BasicMask {
    overlay: Option<ElementId>,
}

impl BasicMask {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_config(&self, dom: &mut Document, overlay: ElementId, cfg: &MaskConfig) {
        if cfg.spinner {
            dom.add_class(overlay, "mull-mask-loading");
        } else {
            dom.remove_class(overlay, "mull-mask-loading");
        }
        match &cfg.message {
            Some(message) => dom.set_text(overlay, message),
            None => dom.set_text(overlay, ""),
        }
    }
}

impl MaskSurface for BasicMask {
    fn show(
        &mut self,
        dom: &mut Document,
        target: ElementId,
        cfg: &MaskConfig,
    ) -> Option<ElementId> {
        let overlay = match self.overlay {
            Some(o) if dom.exists(o) => o,
            _ => {
                let o = dom.create_element("div");
                dom.add_class(o, "mull-mask");
                self.overlay = Some(o);
                o
            }
        };
        dom.append(target, overlay);
        let height = self.target_height(dom, target);
        dom.set_style(overlay, "height", &format!("{height}px"));
        dom.remove_style(overlay, "display");
        self.apply_config(dom, overlay, cfg);
        Some(overlay)
    }

    fn update(&mut self, dom: &mut Document, cfg: &MaskConfig) {
        if let Some(overlay) = self.overlay {
            self.apply_config(dom, overlay, cfg);
        }
    }

    fn hide(&mut self, dom: &mut Document) {
        if let Some(overlay) = self.overlay {
            dom.set_style(overlay, "display", "none");
        }
    }

    fn teardown(&mut self, dom: &mut Document) {
        if let Some(overlay) = self.overlay.take() {
            dom.remove(overlay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_creates_overlay_sized_to_target() {
        let mut dom = Document::new();
        let target = dom.create_element("div");
        dom.append(dom.body(), target);
        dom.set_style(target, "height", "80px");

        let mut mask = BasicMask::new();
        let overlay = mask
            .show(&mut dom, target, &MaskConfig::new().with_message("Loading..."))
            .expect("overlay created");
        assert_eq!(dom.parent(overlay), Some(target));
        assert_eq!(dom.style(overlay, "height"), Some("80px"));
        assert_eq!(dom.text(overlay), Some("Loading..."));
    }

    #[test]
    fn hide_keeps_overlay_reusable() {
        let mut dom = Document::new();
        let target = dom.create_element("div");
        dom.append(dom.body(), target);

        let mut mask = BasicMask::new();
        let overlay = mask.show(&mut dom, target, &MaskConfig::new()).unwrap();
        mask.hide(&mut dom);
        assert_eq!(dom.style(overlay, "display"), Some("none"));
        let again = mask.show(&mut dom, target, &MaskConfig::new()).unwrap();
        assert_eq!(again, overlay);
        assert_eq!(dom.style(overlay, "display"), None);
    }

    #[test]
    fn teardown_discards_overlay() {
        let mut dom = Document::new();
        let target = dom.create_element("div");
        dom.append(dom.body(), target);

        let mut mask = BasicMask::new();
        let overlay = mask.show(&mut dom, target, &MaskConfig::new()).unwrap();
        mask.teardown(&mut dom);
        assert!(!dom.exists(overlay));
    }
}
