//! Meta-crate for the mullion workspace.
//!
//! Re-exports the component core ([`mullion`]) and the document surface
//! ([`mdom`]) so applications can depend on one crate.

pub use mdom;
pub use mullion;

pub use mullion::{
    Align, AnimationEngine, AnimationSpec, AutoLayout, CardLayout, CardRef, CardTransition,
    ChildSpec, ColumnLayout, ComponentConfig, ComponentId, ComponentRegistry, ContainerLayout,
    Control, Document, Easing, Effect, ElementId, Error, Event, EventDetail, EventKind, FitLayout,
    HBoxLayout, HideMode, InsertPos, InstantEngine, InstantTransition, ManualControl, ManualEngine,
    MaskConfig, MaskSurface, Result, SizeValue, TransitionOptions, Tree, TypeEntry, VBoxLayout,
};
