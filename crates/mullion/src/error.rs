//! Error types for the component core.
//!
//! Only contract violations are errors: bad configuration, an invalid
//! render target, a rejected child type. Vetoed lifecycle actions and
//! failed lookups are normal control flow and never surface here.

use thiserror::Error;

/// Fatal, synchronous contract violations.
///
/// There is no retry path for any of these; callers are expected to fix
/// the configuration that produced them.
#[derive(Error, Debug)]
pub enum Error {
    /// The render target element does not exist in the document.
    #[error("render target element is not in the document")]
    InvalidTarget,

    /// A container operation was invoked on a plain component.
    #[error("component is not a container")]
    NotAContainer,

    /// The referenced component does not exist (or was destroyed).
    #[error("unknown component")]
    UnknownComponent,

    /// A child failed its container's type-acceptance check.
    #[error("child of type `{child}` rejected: container accepts `{accepts}`")]
    IncompatibleChild { child: String, accepts: String },

    /// A component type name was registered twice.
    #[error("component type `{0}` is already registered")]
    DuplicateType(String),

    /// A type registration referenced a parent type that does not exist.
    #[error("parent type `{0}` is not registered")]
    UnknownType(String),

    /// Required configuration was not supplied.
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
