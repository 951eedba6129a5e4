//! Component factory and type registry.
//!
//! Containers accept plain descriptor configs; the registry turns a
//! `ctype` name into a live component. It is an explicit object owned by
//! the tree — constructed once, passed by reference — not a global
//! singleton. Types form a lineage (`"toolbar-button"` extends
//! `"component"`), which drives container acceptance checks and
//! `find_by_ctype`.
//!
//! Duplicate registration is a fatal error; looking up an unregistered
//! name degrades to an empty result, since that is common while a UI is
//! still being assembled.

use std::collections::HashMap;

use crate::config::ComponentConfig;
use crate::error::{Error, Result};
use crate::tree::{ComponentId, Tree};

/// Adjusts a descriptor config with type defaults before creation.
pub type ConfigureHook = fn(&mut ComponentConfig);

/// Lifecycle extension hook for a registered type.
///
/// The render hook runs after the surface is attached to the document —
/// child elements built here may rely on being connected. The destroy
/// hook runs at the start of teardown, before owned resources are
/// released.
pub type ComponentHook = fn(&mut Tree, ComponentId);

/// One registered component type.
#[derive(Clone, Default)]
pub struct TypeEntry {
    pub(crate) parent: Option<String>,
    pub(crate) container: bool,
    pub(crate) configure: Option<ConfigureHook>,
    pub(crate) on_render: Option<ComponentHook>,
    pub(crate) on_destroy: Option<ComponentHook>,
}

impl TypeEntry {
    /// A leaf type extending `"component"`.
    pub fn new() -> Self {
        Self {
            parent: Some("component".to_string()),
            ..Self::default()
        }
    }

    /// A type extending the given registered parent.
    pub fn extends(parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Self::default()
        }
    }

    /// Mark the type as a container (it owns a child list and a layout).
    pub fn container(mut self) -> Self {
        self.container = true;
        self
    }

    pub fn with_configure(mut self, hook: ConfigureHook) -> Self {
        self.configure = Some(hook);
        self
    }

    pub fn with_render_hook(mut self, hook: ComponentHook) -> Self {
        self.on_render = Some(hook);
        self
    }

    pub fn with_destroy_hook(mut self, hook: ComponentHook) -> Self {
        self.on_destroy = Some(hook);
        self
    }
}

/// String-keyed component type map with lineage.
pub struct ComponentRegistry {
    types: HashMap<String, TypeEntry>,
}

impl ComponentRegistry {
    /// Registry preloaded with the built-in `"component"` and
    /// `"container"` types.
    pub(crate) fn with_builtins() -> Self {
        let mut types = HashMap::new();
        types.insert("component".to_string(), TypeEntry::default());
        types.insert(
            "container".to_string(),
            TypeEntry {
                parent: Some("component".to_string()),
                container: true,
                ..TypeEntry::default()
            },
        );
        Self { types }
    }

    /// Register a type. Re-registering a name is fatal, as is naming a
    /// parent that does not exist yet.
    pub fn register(&mut self, name: &str, entry: TypeEntry) -> Result<()> {
        if self.types.contains_key(name) {
            return Err(Error::DuplicateType(name.to_string()));
        }
        if let Some(parent) = &entry.parent {
            if !self.types.contains_key(parent) {
                return Err(Error::UnknownType(parent.clone()));
            }
        }
        self.types.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// True if `name` is `ancestor` or extends it, directly or not.
    pub fn is_type(&self, name: &str, ancestor: &str) -> bool {
        let mut current = name;
        // Registration guarantees parents exist, so the walk terminates.
        loop {
            if current == ancestor {
                return true;
            }
            match self.types.get(current).and_then(|e| e.parent.as_deref()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub(crate) fn render_hook(&self, name: &str) -> Option<ComponentHook> {
        self.types.get(name).and_then(|e| e.on_render)
    }

    pub(crate) fn destroy_hook(&self, name: &str) -> Option<ComponentHook> {
        self.types.get(name).and_then(|e| e.on_destroy)
    }
}
