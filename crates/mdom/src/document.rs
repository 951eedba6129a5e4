//! Arena-backed element tree with box-model measurement.
//!
//! A [`Document`] owns every element; [`ElementId`] handles are
//! generational, so a handle to a removed element is detected as stale
//! instead of aliasing a newer element. Structural operations on stale
//! handles are silent no-ops.

use std::collections::HashMap;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::geometry::BoxEdges;

new_key_type! {
    /// Handle to an element in a [`Document`].
    pub struct ElementId;
}

/// Where to place an element inside its new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPos {
    /// Append after the parent's current last child.
    #[default]
    End,
    /// Insert at this child index (clamped to the child count).
    At(usize),
    /// Insert immediately before this sibling.
    Before(ElementId),
}

#[derive(Debug, Default)]
struct ElementNode {
    tag: String,
    attr_id: Option<String>,
    classes: SmallVec<[String; 4]>,
    style: HashMap<String, String>,
    text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// An in-memory document: one `body` root plus any number of attached or
/// detached element subtrees.
///
/// Structural mutations (insert, move, detach, remove) increment a counter
/// readable through [`Document::mutations`]. Re-inserting an element at the
/// position it already occupies does not count as a mutation — callers rely
/// on this to prove an operation left the tree untouched.
pub struct Document {
    nodes: SlotMap<ElementId, ElementNode>,
    body: ElementId,
    mutations: u64,
}

impl Document {
    pub fn new() -> Self {
        let mut nodes: SlotMap<ElementId, ElementNode> = SlotMap::with_key();
        let body = nodes.insert(ElementNode {
            tag: "body".to_string(),
            ..ElementNode::default()
        });
        Self {
            nodes,
            body,
            mutations: 0,
        }
    }

    /// The document root every connected element hangs off.
    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn exists(&self, el: ElementId) -> bool {
        self.nodes.contains_key(el)
    }

    /// Number of structural mutations (insert/move/detach/remove) so far.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    // =========================================================================
    // Creation and attributes
    // =========================================================================

    /// Create a detached element with the given tag.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.insert(ElementNode {
            tag: tag.to_string(),
            ..ElementNode::default()
        })
    }

    pub fn tag(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(el).map(|n| n.tag.as_str())
    }

    pub fn set_attr_id(&mut self, el: ElementId, id: &str) {
        if let Some(n) = self.nodes.get_mut(el) {
            n.attr_id = Some(id.to_string());
        }
    }

    pub fn attr_id(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(el).and_then(|n| n.attr_id.as_deref())
    }

    pub fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(n) = self.nodes.get_mut(el) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(n) = self.nodes.get_mut(el) {
            n.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.nodes
            .get(el)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn classes(&self, el: ElementId) -> &[String] {
        self.nodes.get(el).map(|n| n.classes.as_slice()).unwrap_or(&[])
    }

    pub fn set_style(&mut self, el: ElementId, prop: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(el) {
            n.style.insert(prop.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, el: ElementId, prop: &str) {
        if let Some(n) = self.nodes.get_mut(el) {
            n.style.remove(prop);
        }
    }

    pub fn style(&self, el: ElementId, prop: &str) -> Option<&str> {
        self.nodes
            .get(el)
            .and_then(|n| n.style.get(prop))
            .map(|s| s.as_str())
    }

    pub fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(n) = self.nodes.get_mut(el) {
            n.text = Some(text.to_string());
        }
    }

    pub fn text(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(el).and_then(|n| n.text.as_deref())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append `el` as the last child of `parent`.
    pub fn append(&mut self, parent: ElementId, el: ElementId) {
        self.insert(parent, el, InsertPos::End);
    }

    /// Insert `el` into `parent` at `pos`, detaching it from its current
    /// parent first if necessary.
    ///
    /// Inserting an element at the position it already occupies is a no-op
    /// and does not count as a mutation.
    pub fn insert(&mut self, parent: ElementId, el: ElementId, pos: InsertPos) {
        if el == parent || !self.nodes.contains_key(parent) || !self.nodes.contains_key(el) {
            return;
        }
        // Refuse to create a cycle.
        if self.contains(el, parent) {
            log::warn!("mdom: refusing insert that would create a cycle");
            return;
        }
        if self.at_position(parent, el, pos) {
            return;
        }
        self.detach_quiet(el);
        let index = self.resolve_index(parent, pos);
        let node = self.nodes.get_mut(parent).expect("parent checked above");
        let index = index.min(node.children.len());
        node.children.insert(index, el);
        self.nodes[el].parent = Some(parent);
        self.mutations += 1;
    }

    /// Child index a position resolves to, before clamping.
    fn resolve_index(&self, parent: ElementId, pos: InsertPos) -> usize {
        match pos {
            InsertPos::End => usize::MAX,
            InsertPos::At(n) => n,
            InsertPos::Before(sib) => self.nodes[parent]
                .children
                .iter()
                .position(|c| *c == sib)
                .unwrap_or(usize::MAX),
        }
    }

    /// True if `el` is already a child of `parent` at the requested position.
    pub fn at_position(&self, parent: ElementId, el: ElementId, pos: InsertPos) -> bool {
        let Some(node) = self.nodes.get(el) else {
            return false;
        };
        if node.parent != Some(parent) {
            return false;
        }
        let children = &self.nodes[parent].children;
        let idx = children
            .iter()
            .position(|c| *c == el)
            .expect("child list and parent link agree");
        match pos {
            InsertPos::End => idx + 1 == children.len(),
            InsertPos::At(n) => idx == n.min(children.len().saturating_sub(1)),
            InsertPos::Before(sib) => children.get(idx + 1) == Some(&sib),
        }
    }

    /// Unlink `el` from its parent, leaving the subtree alive but detached.
    pub fn detach(&mut self, el: ElementId) {
        if self.parent(el).is_some() {
            self.detach_quiet(el);
            self.mutations += 1;
        }
    }

    fn detach_quiet(&mut self, el: ElementId) {
        let Some(p) = self.nodes.get(el).and_then(|n| n.parent) else {
            return;
        };
        if let Some(pn) = self.nodes.get_mut(p) {
            pn.children.retain(|c| *c != el);
        }
        if let Some(n) = self.nodes.get_mut(el) {
            n.parent = None;
        }
    }

    /// Detach `el` and discard it together with its entire subtree.
    pub fn remove(&mut self, el: ElementId) {
        if el == self.body || !self.nodes.contains_key(el) {
            return;
        }
        self.detach_quiet(el);
        let mut stack = vec![el];
        while let Some(e) = stack.pop() {
            if let Some(n) = self.nodes.remove(e) {
                stack.extend(n.children);
            }
        }
        self.mutations += 1;
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.get(el).and_then(|n| n.parent)
    }

    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.nodes.get(el).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn index_in_parent(&self, el: ElementId) -> Option<usize> {
        let parent = self.parent(el)?;
        self.nodes[parent].children.iter().position(|c| *c == el)
    }

    /// Depth-first search for an element by its id attribute.
    pub fn find_by_attr_id(&self, id: &str) -> Option<ElementId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.attr_id.as_deref() == Some(id))
            .map(|(k, _)| k)
    }

    /// True if `el` is `ancestor` or a descendant of it.
    pub fn contains(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut current = Some(el);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// True if `el` is attached under the document body.
    pub fn is_connected(&self, el: ElementId) -> bool {
        self.exists(el) && self.contains(self.body, el)
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    fn style_px(&self, el: ElementId, prop: &str) -> i32 {
        let Some(v) = self.style(el, prop) else {
            return 0;
        };
        let v = v.trim();
        let v = v.strip_suffix("px").unwrap_or(v).trim();
        v.parse::<f64>().map(|f| f as i32).unwrap_or(0)
    }

    /// Content-box width in pixels (0 for auto/non-pixel widths — an
    /// in-memory document has no text metrics to fall back on).
    pub fn content_width(&self, el: ElementId) -> i32 {
        self.style_px(el, "width")
    }

    /// Content-box height in pixels.
    pub fn content_height(&self, el: ElementId) -> i32 {
        self.style_px(el, "height")
    }

    pub fn padding(&self, el: ElementId) -> BoxEdges {
        BoxEdges {
            top: self.style_px(el, "padding-top"),
            right: self.style_px(el, "padding-right"),
            bottom: self.style_px(el, "padding-bottom"),
            left: self.style_px(el, "padding-left"),
        }
    }

    pub fn margin(&self, el: ElementId) -> BoxEdges {
        BoxEdges {
            top: self.style_px(el, "margin-top"),
            right: self.style_px(el, "margin-right"),
            bottom: self.style_px(el, "margin-bottom"),
            left: self.style_px(el, "margin-left"),
        }
    }

    pub fn border_widths(&self, el: ElementId) -> BoxEdges {
        BoxEdges {
            top: self.style_px(el, "border-top-width"),
            right: self.style_px(el, "border-right-width"),
            bottom: self.style_px(el, "border-bottom-width"),
            left: self.style_px(el, "border-left-width"),
        }
    }

    /// Horizontal frame: padding plus border on the left and right sides.
    pub fn frame_width(&self, el: ElementId) -> i32 {
        self.padding(el).horizontal() + self.border_widths(el).horizontal()
    }

    /// Vertical frame: padding plus border on the top and bottom sides.
    pub fn frame_height(&self, el: ElementId) -> i32 {
        self.padding(el).vertical() + self.border_widths(el).vertical()
    }

    /// Border-box width: content plus padding plus border.
    pub fn outer_width(&self, el: ElementId) -> i32 {
        self.content_width(el) + self.frame_width(el)
    }

    /// Border-box height: content plus padding plus border.
    pub fn outer_height(&self, el: ElementId) -> i32 {
        self.content_height(el) + self.frame_height(el)
    }

    /// Outer extent on the horizontal axis: border box plus margins.
    pub fn extent_width(&self, el: ElementId) -> i32 {
        self.outer_width(el) + self.margin(el).horizontal()
    }

    /// Outer extent on the vertical axis: border box plus margins.
    pub fn extent_height(&self, el: ElementId) -> i32 {
        self.outer_height(el) + self.margin(el).vertical()
    }

    pub fn is_display_none(&self, el: ElementId) -> bool {
        self.style(el, "display") == Some("none")
    }

    /// True if `el` is connected and no element on the path to the body is
    /// `display: none`.
    pub fn is_visible(&self, el: ElementId) -> bool {
        if !self.is_connected(el) {
            return false;
        }
        let mut current = Some(el);
        while let Some(c) = current {
            if self.is_display_none(c) {
                return false;
            }
            current = self.parent(c);
        }
        true
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Render the connected tree as indented text, one element per line.
    ///
    /// Intended for snapshot tests: ids, classes and styles are emitted in
    /// a deterministic order.
    pub fn to_snapshot(&self) -> String {
        let mut out = String::new();
        self.snapshot_node(self.body, 0, &mut out);
        out
    }

    fn snapshot_node(&self, el: ElementId, depth: usize, out: &mut String) {
        let Some(n) = self.nodes.get(el) else {
            return;
        };
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&n.tag);
        if let Some(id) = &n.attr_id {
            out.push('#');
            out.push_str(id);
        }
        for c in &n.classes {
            out.push('.');
            out.push_str(c);
        }
        if !n.style.is_empty() {
            let mut props: Vec<_> = n.style.iter().collect();
            props.sort();
            out.push_str(" {");
            for (i, (k, v)) in props.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                out.push_str(k);
                out.push(':');
                out.push_str(v);
            }
            out.push('}');
        }
        if let Some(t) = &n.text {
            out.push_str(" \"");
            out.push_str(t);
            out.push('"');
        }
        out.push('\n');
        for child in n.children.clone() {
            self.snapshot_node(child, depth + 1, out);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
