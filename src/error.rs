//! Error types for the context runtime.

use std::fmt;

/// Composition and lifecycle errors.
///
/// Represents the error conditions a caller's composition can provoke when
/// mutating a context. Duplicate and ambiguity errors are never recovered by
/// the runtime: the composition itself is incorrect and the failed operation
/// leaves the context untouched.
///
/// # Examples
///
/// ```rust
/// use contextwire::{Context, CoreObject, WireError};
///
/// struct Foo;
/// impl CoreObject for Foo {}
///
/// let ctx = Context::new_root();
/// ctx.add(Foo).unwrap();
/// match ctx.add(Foo) {
///     Err(WireError::DuplicateType(name)) => assert!(name.contains("Foo")),
///     _ => panic!("expected a duplicate-type error"),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum WireError {
    /// The same object was added to the same context more than once.
    DuplicateMember(&'static str),
    /// A second value was added for a type the context already has.
    DuplicateType(&'static str),
    /// Two members of one context independently satisfy the same sought type.
    AmbiguousAutowire(&'static str),
    /// A mutating operation was attempted on a context that has shut down.
    ContextShutdown(&'static str),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::DuplicateMember(name) => {
                write!(f, "Object of type {} is already a member of this context", name)
            }
            WireError::DuplicateType(name) => {
                write!(f, "A member of type {} already exists in this context", name)
            }
            WireError::AmbiguousAutowire(name) => {
                write!(f, "Ambiguous autowiring: a second member satisfies {}", name)
            }
            WireError::ContextShutdown(op) => {
                write!(f, "Operation {} attempted on a shut-down context", op)
            }
        }
    }
}

impl std::error::Error for WireError {}

/// Result type for context operations
///
/// A convenience alias for `Result<T, WireError>` used throughout
/// contextwire.
pub type WireResult<T> = Result<T, WireError>;
