//! In-memory document surface for the mullion component toolkit.
//!
//! `mdom` is the concrete stand-in for the browser DOM the component core
//! renders into: an arena of elements with tags, ids, classes, inline
//! styles and an ordered child list, plus the box-model measurement
//! helpers layouts need (content/outer/extent sizes, per-side padding,
//! margin and border widths).
//!
//! The document is deliberately deterministic: structural changes bump a
//! mutation counter, which lets callers assert that an operation performed
//! zero DOM churn (the idempotent-render contract).

pub mod document;
pub mod geometry;

pub use document::{Document, ElementId, InsertPos};
pub use geometry::BoxEdges;
