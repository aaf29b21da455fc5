//! Core member contracts.

use std::sync::Arc;

use crate::member::MemberTraits;

/// An object that can become a context member.
///
/// The runtime registers a member under every capability it exposes. Rust has
/// no dynamic cross-cast, so discovery works through a tagged record: the
/// member's `member_traits` implementation lists the capability views it
/// offers. The default implementation exposes the concrete type only, which
/// is all a plain data member needs.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use contextwire::{Context, ContextMember, CoreObject, MemberTraits};
///
/// struct Settings {
///     verbose: bool,
/// }
///
/// // A plain member: concrete identity only.
/// impl CoreObject for Settings {}
///
/// struct Session;
///
/// impl ContextMember for Session {
///     fn notify_context_teardown(&self) {
///         // flush, close, etc.
///     }
/// }
///
/// // A member with capabilities lists them explicitly.
/// impl CoreObject for Session {
///     fn member_traits(this: &Arc<Self>) -> MemberTraits {
///         MemberTraits::new(this.clone()).context_member(this.clone())
///     }
/// }
///
/// let ctx = Context::new_root();
/// let settings = ctx.add(Settings { verbose: true }).unwrap();
/// assert!(settings.verbose);
/// ctx.add(Session).unwrap();
/// ```
pub trait CoreObject: Send + Sync + 'static {
    /// Describe the capability set of this member.
    fn member_traits(this: &Arc<Self>) -> MemberTraits
    where
        Self: Sized,
    {
        MemberTraits::new(this.clone())
    }
}

/// A member that participates in context teardown notification.
pub trait ContextMember: Send + Sync {
    /// Invoked once while the owning context is being destroyed, in reverse
    /// insertion order. Must not panic and must not touch the owning context.
    fn notify_context_teardown(&self);
}

/// Marker capability for members of the packet/dataflow layer built on top
/// of the core. The core records these members; routing them is the packet
/// subsystem's concern.
pub trait PacketSubscriber: Send + Sync {}
