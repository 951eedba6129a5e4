//! Component lifecycle state machine.
//!
//! A component owns exactly one surface element and moves through
//! construction → render → show/hide (possibly animated) → destroy. The
//! logical visibility flag always flips synchronously at the call site;
//! the visual transition may lag behind it when an animation is running.
//! At most one animation is in flight per component — starting an opposing
//! transition force-completes the old one first.
//!
//! State that cannot be applied yet is buffered: a mask requested before
//! render (or while hidden) waits for the surface to become measurable,
//! and an initial size waits for the surface to exist.

use mdom::{ElementId, InsertPos};

use crate::animate::{AnimationHandle, AnimationSpec};
use crate::config::{ComponentConfig, HideMode, SizeValue};
use crate::container::ContainerState;
use crate::error::{Error, Result};
use crate::events::{Control, EventDetail, EventKind, ListenerList};
use crate::mask::{MaskConfig, MaskSurface};
use crate::tree::{ComponentId, Tree};

/// CSS class stamped on every component surface.
pub(crate) const BASE_CLASS: &str = "mull-component";

bitflags::bitflags! {
    /// Lifecycle flags. Independently tracked; `RENDERED` is monotonic
    /// until destroy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CompFlags: u16 {
        const RENDERED = 1 << 0;
        /// Logically hidden. Flips synchronously at the show/hide call site.
        const HIDDEN = 1 << 1;
        /// A show transition is in progress.
        const SHOWING = 1 << 2;
        /// A hide transition is in progress.
        const HIDING = 1 << 3;
        /// The mask overlay is up.
        const MASKED = 1 << 4;
        /// Teardown is running.
        const DESTROYING = 1 << 5;
        /// Terminal.
        const DESTROYED = 1 << 6;
    }
}

/// Which way an in-flight visibility transition is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransitionKind {
    Show,
    Hide,
}

/// The single in-flight animation a component may carry.
pub(crate) struct RunningAnimation {
    pub(crate) handle: AnimationHandle,
    pub(crate) kind: TransitionKind,
}

/// Options for a show/hide call.
#[derive(Debug, Clone, Default)]
pub struct TransitionOptions {
    /// Visual transition to run; `None` completes synchronously.
    pub animation: Option<AnimationSpec>,
}

impl TransitionOptions {
    pub fn animated(spec: AnimationSpec) -> Self {
        Self {
            animation: Some(spec),
        }
    }
}

/// Arena entry for one component.
pub(crate) struct ComponentNode {
    /// Process-unique id, auto-generated when not configured.
    pub(crate) item_id: String,
    /// Globally-unique internal id correlating the component with its
    /// surface element.
    pub(crate) dom_id: String,
    pub(crate) ctype: String,
    pub(crate) tag: String,
    pub(crate) classes: Vec<String>,
    pub(crate) style: Vec<(String, String)>,
    pub(crate) width: Option<SizeValue>,
    pub(crate) height: Option<SizeValue>,
    pub(crate) flex: Option<f64>,
    pub(crate) column_width: Option<f64>,
    pub(crate) html: Option<String>,
    pub(crate) hide_mode: HideMode,
    pub(crate) flags: CompFlags,
    pub(crate) el: Option<ElementId>,
    /// Weak back-reference; the container owns the component, not the
    /// other way around.
    pub(crate) parent: Option<ComponentId>,
    pub(crate) current_animation: Option<RunningAnimation>,
    pub(crate) mask: Option<Box<dyn MaskSurface>>,
    /// Config of the visible overlay, kept for update and suspend.
    pub(crate) mask_cfg: Option<MaskConfig>,
    /// Buffered mask request, flushed when the target becomes visible.
    pub(crate) pending_mask: Option<MaskConfig>,
    pub(crate) mask_target: Option<ElementId>,
    /// A layout pass was requested while it could not run.
    pub(crate) layout_pending: bool,
    pub(crate) listeners: ListenerList,
    /// Present only on containers.
    pub(crate) container: Option<ContainerState>,
}

impl Tree {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a plain component from `config`.
    pub fn component(&mut self, config: ComponentConfig) -> ComponentId {
        self.insert_node("component".to_string(), config, false)
    }

    /// Create a container from `config`.
    ///
    /// The layout defaults to stacking on the first pass; replace it with
    /// [`Tree::set_layout`].
    pub fn container(&mut self, config: ComponentConfig) -> ComponentId {
        self.insert_node("container".to_string(), config, true)
    }

    /// Resolve a descriptor through the type registry.
    ///
    /// An unregistered `ctype` degrades to `None` instead of failing —
    /// missing types are common while a UI is still being assembled.
    pub fn create(&mut self, config: ComponentConfig) -> Option<ComponentId> {
        let ctype = config
            .ctype
            .clone()
            .unwrap_or_else(|| "component".to_string());
        let Some(entry) = self.registry.get(&ctype) else {
            log::warn!("unknown component type `{ctype}`; descriptor ignored");
            return None;
        };
        let is_container = entry.container;
        let configure = entry.configure;
        let mut config = config;
        if let Some(hook) = configure {
            hook(&mut config);
        }
        Some(self.insert_node(ctype, config, is_container))
    }

    pub(crate) fn insert_node(
        &mut self,
        ctype: String,
        config: ComponentConfig,
        is_container: bool,
    ) -> ComponentId {
        self.next_seq += 1;
        let seq = self.next_seq;
        let mut flags = CompFlags::empty();
        if config.hidden {
            flags |= CompFlags::HIDDEN;
        }
        let container = is_container.then(|| ContainerState::from_config(&config));
        self.components.insert(ComponentNode {
            item_id: config.item_id.unwrap_or_else(|| format!("comp-{seq}")),
            dom_id: format!("mull-{seq}"),
            ctype,
            tag: config.tag.unwrap_or_else(|| "div".to_string()),
            classes: config.classes,
            style: config.style,
            width: config.width,
            height: config.height,
            flex: config.flex,
            column_width: config.column_width,
            html: config.html,
            hide_mode: config.hide_mode,
            flags,
            el: None,
            parent: None,
            current_animation: None,
            mask: None,
            mask_cfg: None,
            pending_mask: None,
            mask_target: config.mask_target,
            layout_pending: false,
            listeners: ListenerList::new(),
            container,
        })
    }

    // =========================================================================
    // Render
    // =========================================================================

    /// Render the component into `target`, optionally at a position.
    ///
    /// Destroyed components absorb the call. An already-rendered component
    /// is only repositioned — the surface is never rebuilt, and it is not
    /// moved when already at the requested position, so repeated calls are
    /// free of DOM churn.
    pub fn render(
        &mut self,
        id: ComponentId,
        target: ElementId,
        pos: Option<InsertPos>,
    ) -> Result<()> {
        let Some((rendered, existing)) = self
            .components
            .get(id)
            .map(|n| (n.flags.contains(CompFlags::RENDERED), n.el))
        else {
            return Ok(());
        };
        if !self.dom.exists(target) {
            return Err(Error::InvalidTarget);
        }
        if rendered {
            if let Some(el) = existing {
                match pos {
                    None => {
                        if self.dom.parent(el) != Some(target) {
                            self.dom.insert(target, el, InsertPos::End);
                        }
                    }
                    Some(p) => {
                        if !self.dom.at_position(target, el, p) {
                            self.dom.insert(target, el, p);
                        }
                    }
                }
            }
            return Ok(());
        }

        // First render: build the surface.
        let (tag, dom_id, classes, style, width, height, html, hidden, hide_mode) = {
            let n = &self.components[id];
            (
                n.tag.clone(),
                n.dom_id.clone(),
                n.classes.clone(),
                n.style.clone(),
                n.width.clone(),
                n.height.clone(),
                n.html.clone(),
                n.flags.contains(CompFlags::HIDDEN),
                n.hide_mode,
            )
        };
        let el = self.dom.create_element(&tag);
        self.dom.set_attr_id(el, &dom_id);
        self.dom.add_class(el, BASE_CLASS);
        for class in &classes {
            self.dom.add_class(el, class);
        }
        for (prop, value) in &style {
            self.dom.set_style(el, prop, value);
        }
        // Numeric sizes normalize to px; strings pass through.
        if let Some(w) = &width {
            self.dom.set_style(el, "width", &w.to_css());
        }
        if let Some(h) = &height {
            self.dom.set_style(el, "height", &h.to_css());
        }
        // The surface must be in the document before the type hook runs:
        // hooks may build child elements that need a connected parent.
        self.dom.insert(target, el, pos.unwrap_or_default());
        if let Some(node) = self.components.get_mut(id) {
            node.el = Some(el);
            node.flags.insert(CompFlags::RENDERED);
        }
        let ctype = self.components[id].ctype.clone();
        if let Some(hook) = self.registry.render_hook(&ctype) {
            hook(self, id);
        }
        // Buffered content.
        if let Some(html) = &html {
            self.dom.set_text(el, html);
        }
        // Initial visibility, then any buffered mask request.
        if hidden {
            self.apply_visibility_style(el, hide_mode, true);
        } else {
            self.flush_pending_mask(id);
        }
        self.fire(id, EventKind::Render, EventDetail::None);
        log::debug!("rendered {dom_id}");
        // A freshly attached component lays itself out (deferred while
        // hidden).
        self.perform_layout(id)?;
        Ok(())
    }

    pub(crate) fn apply_visibility_style(&mut self, el: ElementId, mode: HideMode, hidden: bool) {
        match (mode, hidden) {
            (HideMode::Display, true) => self.dom.set_style(el, "display", "none"),
            (HideMode::Display, false) => self.dom.remove_style(el, "display"),
            (HideMode::Visibility, true) => self.dom.set_style(el, "visibility", "hidden"),
            (HideMode::Visibility, false) => self.dom.remove_style(el, "visibility"),
        }
    }

    // =========================================================================
    // Show / hide
    // =========================================================================

    /// Make a hidden component visible. Returns `false` for a no-op or a
    /// vetoed transition.
    ///
    /// The `HIDDEN` flag clears synchronously before this returns, even
    /// when an animation is still running.
    pub fn show(&mut self, id: ComponentId, opts: TransitionOptions) -> bool {
        let Some(node) = self.components.get(id) else {
            return false;
        };
        if !node.flags.contains(CompFlags::HIDDEN) {
            return false;
        }
        if self.fire(id, EventKind::BeforeShow, EventDetail::None) == Control::Veto {
            return false;
        }
        if !self.components[id].flags.contains(CompFlags::RENDERED) {
            // Unrendered: the flag change is all that happens; the visual
            // effect lands at render time.
            if let Some(n) = self.components.get_mut(id) {
                n.flags.remove(CompFlags::HIDDEN);
            }
            return true;
        }
        // An opposing hide animation must land before the show starts.
        self.force_complete_animation(id);
        let (el, mode) = {
            let Some(n) = self.components.get_mut(id) else {
                return false;
            };
            n.flags.remove(CompFlags::HIDDEN);
            n.flags.insert(CompFlags::SHOWING);
            (n.el, n.hide_mode)
        };
        // The logical transition has begun; handlers observe the new state.
        self.fire(id, EventKind::ShowBegin, EventDetail::None);
        self.fire(id, EventKind::Show, EventDetail::None);
        if let Some(el) = el {
            self.apply_visibility_style(el, mode, false);
            if let Some(spec) = opts.animation {
                self.start_transition(id, el, spec, TransitionKind::Show);
                return true;
            }
        }
        self.finish_transition(id, TransitionKind::Show);
        true
    }

    /// Hide a visible component. Returns `false` for a no-op or a vetoed
    /// transition.
    ///
    /// The `HIDDEN` flag is set synchronously before this returns; with an
    /// animation the surface stays on screen until the transition lands.
    pub fn hide(&mut self, id: ComponentId, opts: TransitionOptions) -> bool {
        let Some(node) = self.components.get(id) else {
            return false;
        };
        if node.flags.contains(CompFlags::HIDDEN) {
            return false;
        }
        if self.fire(id, EventKind::BeforeHide, EventDetail::None) == Control::Veto {
            return false;
        }
        if !self.components[id].flags.contains(CompFlags::RENDERED) {
            if let Some(n) = self.components.get_mut(id) {
                n.flags.insert(CompFlags::HIDDEN);
            }
            return true;
        }
        self.force_complete_animation(id);
        let (el, masked) = {
            let Some(n) = self.components.get_mut(id) else {
                return false;
            };
            n.flags.insert(CompFlags::HIDDEN);
            n.flags.insert(CompFlags::HIDING);
            (n.el, n.flags.contains(CompFlags::MASKED))
        };
        // The overlay comes down with its target; re-shown on the next show.
        if masked {
            self.suspend_mask(id);
        }
        self.fire(id, EventKind::HideBegin, EventDetail::None);
        self.fire(id, EventKind::Hide, EventDetail::None);
        if let (Some(el), Some(spec)) = (el, opts.animation) {
            self.start_transition(id, el, spec, TransitionKind::Hide);
            return true;
        }
        self.finish_transition(id, TransitionKind::Hide);
        true
    }

    fn start_transition(
        &mut self,
        id: ComponentId,
        el: ElementId,
        spec: AnimationSpec,
        kind: TransitionKind,
    ) {
        let handle = self.engine.start(&mut self.dom, el, &spec);
        if let Some(n) = self.components.get_mut(id) {
            n.current_animation = Some(RunningAnimation { handle, kind });
        }
        // Engines may complete synchronously; the instant engine always does.
        if self.engine.is_done(handle) {
            if let Some(n) = self.components.get_mut(id) {
                n.current_animation = None;
            }
            self.finish_transition(id, kind);
        }
    }

    /// Completion bookkeeping for a transition. Runs exactly once per
    /// transition: callers clear `current_animation` before entering.
    fn finish_transition(&mut self, id: ComponentId, kind: TransitionKind) {
        match kind {
            TransitionKind::Show => {
                let pending_layout = {
                    let Some(n) = self.components.get_mut(id) else {
                        return;
                    };
                    n.flags.remove(CompFlags::SHOWING);
                    n.layout_pending
                };
                // Deferred mask-show requests land once visible.
                self.flush_pending_mask(id);
                if pending_layout {
                    let _ = self.perform_layout(id);
                }
                self.fire(id, EventKind::AfterShow, EventDetail::None);
            }
            TransitionKind::Hide => {
                let (el, mode) = {
                    let Some(n) = self.components.get_mut(id) else {
                        return;
                    };
                    n.flags.remove(CompFlags::HIDING);
                    (n.el, n.hide_mode)
                };
                if let Some(el) = el {
                    self.apply_visibility_style(el, mode, true);
                }
                self.fire(id, EventKind::AfterHide, EventDetail::None);
            }
        }
    }

    /// Jump any in-flight transition to its end state, synchronously.
    pub(crate) fn force_complete_animation(&mut self, id: ComponentId) {
        let Some(anim) = self
            .components
            .get_mut(id)
            .and_then(|n| n.current_animation.take())
        else {
            return;
        };
        self.engine.finish(&mut self.dom, anim.handle);
        self.finish_transition(id, anim.kind);
    }

    /// Run completion bookkeeping for every transition the engine has
    /// finished. The host event loop calls this once per turn.
    pub fn pump_animations(&mut self) {
        let finished: Vec<(ComponentId, TransitionKind)> = self
            .components
            .iter()
            .filter_map(|(k, n)| n.current_animation.as_ref().map(|a| (k, a.handle, a.kind)))
            .filter(|(_, handle, _)| self.engine.is_done(*handle))
            .map(|(k, _, kind)| (k, kind))
            .collect();
        for (id, kind) in finished {
            if let Some(n) = self.components.get_mut(id) {
                n.current_animation = None;
            }
            self.finish_transition(id, kind);
        }
    }

    // =========================================================================
    // Mask
    // =========================================================================

    /// Show a busy overlay over the component's mask target.
    ///
    /// Masking needs a measurable, visible target: requests made before
    /// render or while hidden are buffered and flushed on the next
    /// successful show.
    pub fn mask(&mut self, id: ComponentId, cfg: MaskConfig) {
        let Some(node) = self.components.get(id) else {
            return;
        };
        let ready = node.flags.contains(CompFlags::RENDERED)
            && !node.flags.contains(CompFlags::HIDDEN);
        if !ready {
            if let Some(n) = self.components.get_mut(id) {
                n.pending_mask = Some(cfg);
            }
            return;
        }
        self.apply_mask(id, cfg);
    }

    /// Take the mask down and drop any buffered request.
    pub fn un_mask(&mut self, id: ComponentId) {
        let Self {
            components, dom, ..
        } = self;
        let Some(node) = components.get_mut(id) else {
            return;
        };
        node.pending_mask = None;
        node.mask_cfg = None;
        if node.flags.contains(CompFlags::MASKED) {
            if let Some(mask) = node.mask.as_mut() {
                mask.hide(dom);
            }
            node.flags.remove(CompFlags::MASKED);
        }
    }

    fn apply_mask(&mut self, id: ComponentId, cfg: MaskConfig) {
        let Self {
            components,
            dom,
            mask_factory,
            ..
        } = self;
        let Some(node) = components.get_mut(id) else {
            return;
        };
        let Some(own_el) = node.el else {
            return;
        };
        let target = node.mask_target.unwrap_or(own_el);
        let already = node.flags.contains(CompFlags::MASKED);
        let mask = node.mask.get_or_insert_with(|| mask_factory());
        if already {
            mask.update(dom, &cfg);
        } else {
            mask.show(dom, target, &cfg);
        }
        node.mask_cfg = Some(cfg);
        node.flags.insert(CompFlags::MASKED);
    }

    fn flush_pending_mask(&mut self, id: ComponentId) {
        let cfg = self
            .components
            .get_mut(id)
            .and_then(|n| n.pending_mask.take());
        if let Some(cfg) = cfg {
            self.apply_mask(id, cfg);
        }
    }

    /// Hide the overlay with its target and re-buffer the config.
    fn suspend_mask(&mut self, id: ComponentId) {
        let Self {
            components, dom, ..
        } = self;
        let Some(node) = components.get_mut(id) else {
            return;
        };
        if node.flags.contains(CompFlags::MASKED) {
            if let Some(mask) = node.mask.as_mut() {
                mask.hide(dom);
            }
            node.flags.remove(CompFlags::MASKED);
            node.pending_mask = node.mask_cfg.take();
        }
    }

    // =========================================================================
    // Size
    // =========================================================================

    /// Set the configured size. Buffered until render; applied to the
    /// surface immediately afterwards.
    pub fn set_size(
        &mut self,
        id: ComponentId,
        width: Option<SizeValue>,
        height: Option<SizeValue>,
    ) {
        let el = {
            let Some(n) = self.components.get_mut(id) else {
                return;
            };
            if let Some(w) = width.clone() {
                n.width = Some(w);
            }
            if let Some(h) = height.clone() {
                n.height = Some(h);
            }
            n.el
        };
        let Some(el) = el else {
            return;
        };
        if let Some(w) = width {
            self.dom.set_style(el, "width", &w.to_css());
        }
        if let Some(h) = height {
            self.dom.set_style(el, "height", &h.to_css());
        }
    }

    // =========================================================================
    // Destroy
    // =========================================================================

    /// Tear the component down. Idempotent; vetoable through
    /// `BeforeDestroy`. Containers destroy their children recursively.
    ///
    /// Owned resources are released in a fixed order: type hook, children
    /// and layout (containers), in-flight animation, mask, surface. The
    /// `Destroy` notification fires before subscriptions are purged, so
    /// subscribers still receive it.
    pub fn destroy(&mut self, id: ComponentId) -> bool {
        let Some(node) = self.components.get(id) else {
            return false;
        };
        if node.flags.contains(CompFlags::DESTROYING) {
            return false;
        }
        if self.fire(id, EventKind::BeforeDestroy, EventDetail::None) == Control::Veto {
            return false;
        }
        if let Some(n) = self.components.get_mut(id) {
            n.flags.insert(CompFlags::DESTROYING);
        }
        let ctype = self.components[id].ctype.clone();
        if let Some(hook) = self.registry.destroy_hook(&ctype) {
            hook(self, id);
        }
        // Container teardown: children first, then the layout.
        if self
            .components
            .get(id)
            .is_some_and(|n| n.container.is_some())
        {
            let items = self
                .components
                .get_mut(id)
                .and_then(|n| n.container.as_mut())
                .map(|s| std::mem::take(&mut s.items))
                .unwrap_or_default();
            for child in items {
                if let Some(c) = self.components.get_mut(child) {
                    c.parent = None;
                }
                self.destroy(child);
            }
            let layout = self
                .components
                .get_mut(id)
                .and_then(|n| n.container.as_mut())
                .and_then(|s| s.layout.take());
            if let Some(mut layout) = layout {
                layout.cleanup(self);
            }
        }
        self.force_complete_animation(id);
        // Mask teardown.
        {
            let Self {
                components, dom, ..
            } = self;
            if let Some(n) = components.get_mut(id) {
                if let Some(mask) = n.mask.as_mut() {
                    mask.teardown(dom);
                }
                n.mask = None;
                n.mask_cfg = None;
                n.pending_mask = None;
            }
        }
        // Release the surface.
        let el = self.components.get_mut(id).and_then(|n| n.el.take());
        if let Some(el) = el {
            self.dom.remove(el);
        }
        // Drop out of the owning container, if still listed.
        let parent = self.components.get(id).and_then(|n| n.parent);
        if let Some(p) = parent {
            if let Some(state) = self.components.get_mut(p).and_then(|n| n.container.as_mut()) {
                state.items.retain(|c| *c != id);
            }
        }
        if let Some(n) = self.components.get_mut(id) {
            n.flags.remove(CompFlags::RENDERED);
            n.flags.remove(CompFlags::DESTROYING);
            n.flags.insert(CompFlags::DESTROYED);
        }
        self.fire(id, EventKind::Destroy, EventDetail::None);
        // Subscriptions die with the arena entry — after the destroy event.
        self.components.remove(id);
        log::debug!("destroyed {:?}", id);
        true
    }

    // =========================================================================
    // State queries
    // =========================================================================

    pub fn is_rendered(&self, id: ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|n| n.flags.contains(CompFlags::RENDERED))
    }

    /// The logical visibility flag. Synchronous with show/hide calls.
    pub fn is_hidden(&self, id: ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|n| n.flags.contains(CompFlags::HIDDEN))
    }

    pub fn is_masked(&self, id: ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|n| n.flags.contains(CompFlags::MASKED))
    }

    /// Destroyed components leave the arena; a stale id means destroyed.
    pub fn is_destroyed(&self, id: ComponentId) -> bool {
        !self.components.contains_key(id)
    }

    /// Rendered and not logically hidden.
    pub fn is_component_visible(&self, id: ComponentId) -> bool {
        self.components.get(id).is_some_and(|n| {
            n.flags.contains(CompFlags::RENDERED) && !n.flags.contains(CompFlags::HIDDEN)
        })
    }

    pub fn has_running_animation(&self, id: ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|n| n.current_animation.is_some())
    }

    pub fn element(&self, id: ComponentId) -> Option<ElementId> {
        self.components.get(id).and_then(|n| n.el)
    }

    pub fn item_id(&self, id: ComponentId) -> Option<&str> {
        self.components.get(id).map(|n| n.item_id.as_str())
    }

    pub fn ctype(&self, id: ComponentId) -> Option<&str> {
        self.components.get(id).map(|n| n.ctype.as_str())
    }

    pub fn parent_of(&self, id: ComponentId) -> Option<ComponentId> {
        self.components.get(id).and_then(|n| n.parent)
    }

    pub fn flex_of(&self, id: ComponentId) -> Option<f64> {
        self.components.get(id).and_then(|n| n.flex)
    }

    pub fn set_flex(&mut self, id: ComponentId, flex: Option<f64>) {
        if let Some(n) = self.components.get_mut(id) {
            n.flex = flex;
        }
    }

    /// Weight used by the column layout: the column width fraction when
    /// configured, otherwise the flex share.
    pub(crate) fn column_weight(&self, id: ComponentId) -> Option<f64> {
        self.components
            .get(id)
            .and_then(|n| n.column_width.or(n.flex))
    }
}
