//! Animation engine contract.
//!
//! The component core does not animate anything itself: show/hide hand the
//! visual transition to an [`AnimationEngine`] and carry on. The engine's
//! obligations are small — start a transition, report when it is done, and
//! support a "jump to end" cancellation primitive. Completion bookkeeping
//! (clearing the in-flight reference, deferred mask flush, the `After*`
//! notification) is owned by the core and runs exactly once per
//! transition, whether the engine finished naturally or was forced.
//!
//! Two engines ship with the crate: [`InstantEngine`], where every
//! transition completes the moment it starts (the no-animation default),
//! and [`ManualEngine`], which holds transitions open until a test drives
//! them — the deterministic stand-in for a real timeline.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mdom::{Document, ElementId};

/// Identifies one running transition until it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
}

/// What the transition does to the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Opacity ramp between hidden and shown.
    Fade,
    /// Slide along the vertical axis.
    Slide,
    /// Free-form target properties, applied when the transition ends.
    Properties(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub effect: Effect,
    pub duration_ms: u32,
    pub easing: Easing,
}

impl AnimationSpec {
    pub fn fade(duration_ms: u32) -> Self {
        Self {
            effect: Effect::Fade,
            duration_ms,
            easing: Easing::default(),
        }
    }

    pub fn slide(duration_ms: u32) -> Self {
        Self {
            effect: Effect::Slide,
            duration_ms,
            easing: Easing::default(),
        }
    }

    pub fn properties(props: Vec<(String, String)>, duration_ms: u32) -> Self {
        Self {
            effect: Effect::Properties(props),
            duration_ms,
            easing: Easing::default(),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// The low-level animation collaborator.
pub trait AnimationEngine {
    /// Begin a transition on `el`. The handle identifies it until done.
    fn start(&mut self, dom: &mut Document, el: ElementId, spec: &AnimationSpec) -> AnimationHandle;

    /// Jump the transition to its end state. Idempotent; unknown handles
    /// are ignored.
    fn finish(&mut self, dom: &mut Document, handle: AnimationHandle);

    /// True once the transition has reached its end state.
    fn is_done(&self, handle: AnimationHandle) -> bool;
}

fn apply_end_state(dom: &mut Document, el: ElementId, spec: &AnimationSpec) {
    if let Effect::Properties(props) = &spec.effect {
        for (prop, value) in props {
            dom.set_style(el, prop, value);
        }
    }
}

/// Engine where every transition completes the moment it starts.
#[derive(Debug, Default)]
pub struct InstantEngine {
    next: u64,
}

impl InstantEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnimationEngine for InstantEngine {
    fn start(&mut self, dom: &mut Document, el: ElementId, spec: &AnimationSpec) -> AnimationHandle {
        self.next += 1;
        apply_end_state(dom, el, spec);
        AnimationHandle(self.next)
    }

    fn finish(&mut self, _dom: &mut Document, _handle: AnimationHandle) {}

    fn is_done(&self, _handle: AnimationHandle) -> bool {
        true
    }
}

#[derive(Default)]
struct ManualState {
    next: u64,
    running: HashMap<u64, (ElementId, AnimationSpec)>,
}

/// Engine whose transitions stay open until completed through a
/// [`ManualControl`] or forced by the core.
///
/// # Example
///
/// ```
/// use mullion::{ManualEngine, Tree};
///
/// let (engine, control) = ManualEngine::new();
/// let mut tree = Tree::with_engine(Box::new(engine));
/// // ... start an animated hide, then later:
/// control.complete_all();
/// tree.pump_animations();
/// ```
pub struct ManualEngine {
    state: Rc<RefCell<ManualState>>,
}

/// Test-side handle that completes a [`ManualEngine`]'s transitions.
pub struct ManualControl {
    state: Rc<RefCell<ManualState>>,
}

impl ManualEngine {
    pub fn new() -> (Self, ManualControl) {
        let state = Rc::new(RefCell::new(ManualState::default()));
        (
            Self {
                state: state.clone(),
            },
            ManualControl { state },
        )
    }
}

impl AnimationEngine for ManualEngine {
    fn start(&mut self, _dom: &mut Document, el: ElementId, spec: &AnimationSpec) -> AnimationHandle {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let handle = state.next;
        state.running.insert(handle, (el, spec.clone()));
        AnimationHandle(handle)
    }

    fn finish(&mut self, dom: &mut Document, handle: AnimationHandle) {
        let entry = self.state.borrow_mut().running.remove(&handle.0);
        if let Some((el, spec)) = entry {
            apply_end_state(dom, el, &spec);
        }
    }

    fn is_done(&self, handle: AnimationHandle) -> bool {
        !self.state.borrow().running.contains_key(&handle.0)
    }
}

impl ManualControl {
    /// Mark every running transition as complete. End-state properties are
    /// not applied through this path; tests that care use the forced
    /// completion on the tree instead.
    pub fn complete_all(&self) {
        self.state.borrow_mut().running.clear();
    }

    /// Number of transitions currently in flight.
    pub fn running(&self) -> usize {
        self.state.borrow().running.len()
    }
}
