//! Component lifecycle and container/layout engine.
//!
//! `mullion` is a retained-mode UI component core: a tree of components,
//! each backed by one surface element, composed into containers that
//! apply pluggable layout strategies to size and position their children.
//!
//! The pieces:
//!
//! - **Component lifecycle** — construction → render → show/hide
//!   (possibly animated) → destroy, with synchronous logical state and
//!   buffered deferred state ([`component`]).
//! - **Containers** — ordered child sequences under add/insert/remove/
//!   reorder, with at most one parent per child ([`container`]).
//! - **Layouts** — stacking, single-fit, proportional boxes and columns,
//!   and the single-active-card layout with pluggable transitions
//!   ([`layout`]).
//! - **Collaborator contracts** — the document surface ([`mdom`]), the
//!   animation engine ([`animate`]), the mask overlay ([`mask`]) and the
//!   component factory ([`registry`]).
//!
//! # Example
//!
//! ```
//! use mullion::{ComponentConfig, HBoxLayout, Tree};
//!
//! let mut tree = Tree::new();
//! let panel = tree.container(ComponentConfig::new().with_width(300).with_height(120));
//! tree.set_layout(panel, Box::new(HBoxLayout::new())).unwrap();
//!
//! let body = tree.body();
//! tree.render(panel, body, None).unwrap();
//! tree.add(panel, ComponentConfig::new().with_flex(1.0)).unwrap();
//! tree.add(panel, ComponentConfig::new().with_flex(2.0)).unwrap();
//! ```

pub mod animate;
pub mod component;
pub mod config;
pub mod container;
pub mod error;
pub mod events;
pub mod layout;
mod log_init;
pub mod mask;
pub mod registry;
pub mod tree;

pub use animate::{
    AnimationEngine, AnimationHandle, AnimationSpec, Easing, Effect, InstantEngine, ManualControl,
    ManualEngine,
};
pub use component::{CompFlags, TransitionOptions};
pub use config::{ChildSpec, ComponentConfig, HideMode, SizeValue};
pub use error::{Error, Result};
pub use events::{Control, Event, EventDetail, EventKind, HandlerId};
pub use layout::{
    Align, AutoLayout, CardLayout, CardRef, CardTransition, ColumnLayout, ContainerLayout,
    FitLayout, HBoxLayout, InstantTransition, VBoxLayout,
};
pub use log_init::init_logger;
pub use mask::{BasicMask, MaskConfig, MaskSurface};
pub use registry::{ComponentRegistry, TypeEntry};
pub use tree::{ComponentId, Tree};

// Surface types callers touch directly.
pub use mdom::{BoxEdges, Document, ElementId, InsertPos};

// Re-export the log facade so hosts can use mullion::log::debug!, etc.
pub use log;
