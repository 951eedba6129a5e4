//! Component configuration.
//!
//! A [`ComponentConfig`] describes a component before it exists: surface
//! tag, classes, inline style, initial size and visibility, layout hints.
//! Plain configs double as the descriptor form containers accept — a
//! config with a `ctype` is resolved through the type registry when added
//! to a container.

use mdom::ElementId;

use crate::tree::ComponentId;

/// A CSS dimension: numeric values are pixel counts and are normalized to
/// `"<n>px"` when written to the surface; string values pass through
/// unchanged (`"auto"`, `"100%"`, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum SizeValue {
    Px(i32),
    Str(String),
}

impl SizeValue {
    /// The CSS text written to the surface.
    pub fn to_css(&self) -> String {
        match self {
            Self::Px(n) => format!("{n}px"),
            Self::Str(s) => s.clone(),
        }
    }

    pub fn as_px(&self) -> Option<i32> {
        match self {
            Self::Px(n) => Some(*n),
            Self::Str(_) => None,
        }
    }
}

impl From<i32> for SizeValue {
    fn from(n: i32) -> Self {
        Self::Px(n)
    }
}

impl From<&str> for SizeValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for SizeValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// How the hidden state is expressed on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HideMode {
    /// `display: none` — the surface leaves the flow entirely.
    #[default]
    Display,
    /// `visibility: hidden` — the surface keeps its box but paints nothing.
    Visibility,
}

/// Configuration for a component to be created.
///
/// # Example
///
/// ```
/// use mullion::ComponentConfig;
///
/// let config = ComponentConfig::new()
///     .with_item_id("sidebar")
///     .with_class("app-sidebar")
///     .with_width(240)
///     .hidden();
/// ```
#[derive(Debug, Clone)]
pub struct ComponentConfig {
    /// Surface tag. Defaults to `div`.
    pub tag: Option<String>,
    /// Process-unique component id; auto-generated when absent.
    pub item_id: Option<String>,
    /// Registry type name used when this config is a descriptor.
    pub ctype: Option<String>,
    pub classes: Vec<String>,
    pub style: Vec<(String, String)>,
    /// Initial size, buffered until render.
    pub width: Option<SizeValue>,
    pub height: Option<SizeValue>,
    pub hidden: bool,
    pub hide_mode: HideMode,
    /// Relative share on a proportional layout's flex axis.
    pub flex: Option<f64>,
    /// Column layout width weight (alias for a flex share on the
    /// horizontal axis).
    pub column_width: Option<f64>,
    /// Buffered text content, applied once the surface exists.
    pub html: Option<String>,
    /// Container-only: base type children must satisfy.
    pub accepts: Option<String>,
    /// Container-only: type applied to descriptor children without one.
    pub default_ctype: Option<String>,
    /// Container-only: whether removed children are destroyed by default.
    pub auto_destroy: bool,
    /// Overrides the element the mask overlay binds to.
    pub mask_target: Option<ElementId>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            tag: None,
            item_id: None,
            ctype: None,
            classes: Vec::new(),
            style: Vec::new(),
            width: None,
            height: None,
            hidden: false,
            hide_mode: HideMode::default(),
            flex: None,
            column_width: None,
            html: None,
            accepts: None,
            default_ctype: None,
            auto_destroy: true,
            mask_target: None,
        }
    }
}

impl ComponentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_item_id(mut self, id: impl Into<String>) -> Self {
        self.item_id = Some(id.into());
        self
    }

    pub fn with_ctype(mut self, ctype: impl Into<String>) -> Self {
        self.ctype = Some(ctype.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_style(mut self, prop: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.push((prop.into(), value.into()));
        self
    }

    pub fn with_width(mut self, width: impl Into<SizeValue>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_height(mut self, height: impl Into<SizeValue>) -> Self {
        self.height = Some(height.into());
        self
    }

    /// Start in the hidden state; the surface carries it from first render.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_hide_mode(mut self, mode: HideMode) -> Self {
        self.hide_mode = mode;
        self
    }

    pub fn with_flex(mut self, flex: f64) -> Self {
        self.flex = Some(flex);
        self
    }

    pub fn with_column_width(mut self, width: f64) -> Self {
        self.column_width = Some(width);
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_accepts(mut self, ctype: impl Into<String>) -> Self {
        self.accepts = Some(ctype.into());
        self
    }

    pub fn with_default_ctype(mut self, ctype: impl Into<String>) -> Self {
        self.default_ctype = Some(ctype.into());
        self
    }

    /// Removed children are detached but left alive and reusable.
    pub fn keep_removed_children(mut self) -> Self {
        self.auto_destroy = false;
        self
    }

    pub fn with_mask_target(mut self, el: ElementId) -> Self {
        self.mask_target = Some(el);
        self
    }
}

/// What a container accepts in `add`/`insert`: an existing component or a
/// descriptor to be resolved through the factory.
#[derive(Debug, Clone)]
pub enum ChildSpec {
    Existing(ComponentId),
    Config(ComponentConfig),
}

impl From<ComponentId> for ChildSpec {
    fn from(id: ComponentId) -> Self {
        Self::Existing(id)
    }
}

impl From<ComponentConfig> for ChildSpec {
    fn from(config: ComponentConfig) -> Self {
        Self::Config(config)
    }
}
