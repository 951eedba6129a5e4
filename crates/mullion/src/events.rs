//! Typed notification mechanism.
//!
//! Components fire typed events over their lifecycle. Handlers attached to
//! a `Before*` event may return [`Control::Veto`] to cancel the action —
//! this is the normal, non-error cancellation channel. All other events
//! are informational.
//!
//! An optional relay can be installed on the tree to observe every event
//! after local handlers ran; this is the hook a cross-tree event bus
//! attaches to, instead of wrapping the firing mechanism itself.

use smallvec::SmallVec;

use crate::tree::{ComponentId, Tree};

/// The event vocabulary of the component lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The surface was built and attached.
    Render,
    /// Vetoable: a hidden component is about to become visible.
    BeforeShow,
    /// The show transition started (the logical flag already flipped).
    ShowBegin,
    /// The primary show notification; fires before any animation completes.
    Show,
    /// The show transition fully completed, including any animation.
    AfterShow,
    /// Vetoable: a visible component is about to be hidden.
    BeforeHide,
    HideBegin,
    Hide,
    AfterHide,
    /// Vetoable: the component is about to be torn down.
    BeforeDestroy,
    /// The component was torn down. Subscriptions are purged after this.
    Destroy,
    /// Vetoable: a child is about to enter the container.
    BeforeAdd,
    Add,
    /// Vetoable: a child is about to leave the container.
    BeforeRemove,
    Remove,
    /// A child already in the container moved to a new index.
    Reorder,
    /// The component finished its own layout pass.
    AfterLayout,
    /// The container's layout strategy was replaced.
    LayoutReplaced,
    /// The card layout's active item changed.
    CardChange,
}

/// Event payload beyond the component it fired on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventDetail {
    #[default]
    None,
    Added {
        child: ComponentId,
        index: usize,
    },
    Removed {
        child: ComponentId,
        destroyed: bool,
    },
    Reordered {
        child: ComponentId,
        from: usize,
        to: usize,
    },
    CardChanged {
        new: Option<ComponentId>,
        previous: Option<ComponentId>,
    },
}

#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub component: ComponentId,
    pub detail: EventDetail,
}

/// Handler verdict. Only `Before*` events honor [`Control::Veto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Veto,
}

/// Token returned by [`Tree::on`]; pass back to [`Tree::un`] to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(pub(crate) u64);

pub(crate) struct ListenerEntry {
    pub(crate) id: u64,
    pub(crate) kind: EventKind,
    pub(crate) handler: Box<dyn FnMut(&Event) -> Control>,
}

pub(crate) type ListenerList = SmallVec<[ListenerEntry; 2]>;

impl Tree {
    /// Attach a handler for `kind` on `id`.
    ///
    /// Handlers on `Before*` events may return [`Control::Veto`] to cancel
    /// the action. Registration on a destroyed component is a no-op (the
    /// returned token is inert).
    pub fn on<F>(&mut self, id: ComponentId, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&Event) -> Control + 'static,
    {
        self.next_handler += 1;
        let token = HandlerId(self.next_handler);
        if let Some(node) = self.components.get_mut(id) {
            node.listeners.push(ListenerEntry {
                id: token.0,
                kind,
                handler: Box::new(handler),
            });
        }
        token
    }

    /// Attach a non-vetoing observer for `kind` on `id`.
    pub fn observe<F>(&mut self, id: ComponentId, kind: EventKind, mut f: F) -> HandlerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.on(id, kind, move |event| {
            f(event);
            Control::Continue
        })
    }

    /// Detach a handler previously attached with [`Tree::on`].
    pub fn un(&mut self, id: ComponentId, handler: HandlerId) {
        if let Some(node) = self.components.get_mut(id) {
            node.listeners.retain(|entry| entry.id != handler.0);
        }
    }

    /// Install the relay notified of every event after local handlers.
    pub fn set_relay<F>(&mut self, relay: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.relay = Some(Box::new(relay));
    }

    /// Fire `kind` on `id`. Returns `Veto` if any handler vetoed.
    pub(crate) fn fire(&mut self, id: ComponentId, kind: EventKind, detail: EventDetail) -> Control {
        let event = Event {
            kind,
            component: id,
            detail,
        };
        let mut control = Control::Continue;
        if let Some(node) = self.components.get_mut(id) {
            for entry in node.listeners.iter_mut() {
                if entry.kind == kind && (entry.handler)(&event) == Control::Veto {
                    control = Control::Veto;
                }
            }
        }
        if let Some(relay) = self.relay.as_mut() {
            relay(&event);
        }
        control
    }
}
