//! Diagnostic signals for composition traceability.
//!
//! The global context exposes the [`AutowiringEvents`] capability: every
//! context creation and every membership mutation anywhere in the process
//! fires through it. Listeners register like any other event receiver, on
//! the global context, and can ask an existing tree to replay itself
//! via [`Context::build_current_state`](crate::Context::build_current_state).

use std::sync::Arc;

use crate::context::{global_context, Context};
use crate::key::Key;
use crate::member::MemberTraits;
use crate::traits::CoreObject;

/// Process-wide composition events.
///
/// Fired whenever membership mutates; used for diagnostics and state
/// reconstruction. Listener implementations should stay lightweight: they
/// run inline on the mutating thread.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use contextwire::{
///     global_context, AutowiringEvents, Context, CoreObject, Key, MemberTraits,
/// };
///
/// #[derive(Default)]
/// struct Census {
///     contexts: AtomicUsize,
///     objects: AtomicUsize,
/// }
///
/// impl AutowiringEvents for Census {
///     fn new_context(&self, _context: &Context) {
///         self.contexts.fetch_add(1, Ordering::SeqCst);
///     }
///     fn new_object(&self, _context: &Context, _member: Key) {
///         self.objects.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// impl CoreObject for Census {
///     fn member_traits(this: &Arc<Self>) -> MemberTraits {
///         MemberTraits::new(this.clone()).receives::<dyn AutowiringEvents>(this.clone())
///     }
/// }
///
/// let census = global_context().add(Census::default()).unwrap();
/// let root = Context::new_root();
/// let _child = root.create_anonymous();
/// assert!(census.contexts.load(Ordering::SeqCst) >= 1);
/// ```
pub trait AutowiringEvents: Send + Sync {
    /// A context was created.
    fn new_context(&self, context: &Context);

    /// An object became a member of `context` under its concrete identity.
    fn new_object(&self, context: &Context, member: Key);
}

pub(crate) fn notify_new_context(context: &Context) {
    global_context()
        .event_sender::<dyn AutowiringEvents>()
        .fire(|listener| listener.new_context(context));
}

pub(crate) fn notify_new_object(context: &Context, member: Key) {
    global_context()
        .event_sender::<dyn AutowiringEvents>()
        .fire(|listener| listener.new_object(context, member));
}

/// Ready-made [`AutowiringEvents`] listener that emits `tracing` events.
///
/// Add it to the global context to get a structured trace of the whole
/// composition as it forms.
#[derive(Default)]
pub struct TracingAutowiringListener;

impl AutowiringEvents for TracingAutowiringListener {
    fn new_context(&self, context: &Context) {
        tracing::debug!(sigil = %context.sigil(), "new context");
    }

    fn new_object(&self, context: &Context, member: Key) {
        tracing::debug!(sigil = %context.sigil(), member = %member, "new object");
    }
}

impl CoreObject for TracingAutowiringListener {
    fn member_traits(this: &Arc<Self>) -> MemberTraits {
        MemberTraits::new(this.clone()).receives::<dyn AutowiringEvents>(this.clone())
    }
}
