//! Type identity keys for context membership and event routing.

use std::any::TypeId;

/// Identity of a type as seen by the runtime.
///
/// A `Key` names one autowiring identity: a concrete member type, an exposed
/// interface (`dyn Trait`), an event capability, or a context sigil. Keys are
/// compared and hashed by `TypeId` alone; the type name rides along purely
/// for diagnostics and error messages.
///
/// # Examples
///
/// ```rust
/// use contextwire::{key_of, Key};
///
/// trait Logger: Send + Sync {}
///
/// let concrete = key_of::<u32>();
/// let capability = key_of::<dyn Logger>();
///
/// assert_eq!(concrete, key_of::<u32>());
/// assert_ne!(concrete, capability);
/// assert_eq!(concrete.display_name(), "u32");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Get the type name for display.
    ///
    /// Returns the `std::any::type_name` result for the identified type,
    /// suitable for error messages and dumps.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Raw `TypeId` of the identified type.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Whether this key names the anonymous (void) sigil.
    pub fn is_anonymous(&self) -> bool {
        self.id == TypeId::of::<()>()
    }
}

// Hot path: TypeId comparison only, the name is diagnostic freight.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Build the key for `T`.
///
/// Works uniformly for sized types and for `dyn Trait` object types, so the
/// same identity scheme serves concrete members, exposed capabilities and
/// sigils.
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> Key {
    Key {
        id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
    }
}
