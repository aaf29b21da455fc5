//! Exception filtering contracts.

use std::any::Any;
use std::panic;

use crate::key::Key;
use crate::member::ObjectId;

/// A captured panic travelling through a filter chain.
///
/// Event dispatch and [`Context::run_filtered`](crate::Context::run_filtered)
/// catch panics from user code and wrap the payload here before offering it
/// to the context's exception filters. Filters peek at the payload without
/// consuming it; whoever declines last rethrows.
pub struct CaughtException {
    payload: Box<dyn Any + Send>,
}

impl CaughtException {
    pub(crate) fn new(payload: Box<dyn Any + Send>) -> Self {
        Self { payload }
    }

    /// The panic message, when the payload is a string.
    ///
    /// Covers the two payload shapes produced by `panic!` with a literal or
    /// a formatted message. Structured payloads raised through
    /// `panic::panic_any` are reachable via [`CaughtException::payload`].
    pub fn message(&self) -> Option<&str> {
        if let Some(s) = self.payload.downcast_ref::<&'static str>() {
            Some(*s)
        } else {
            self.payload.downcast_ref::<String>().map(String::as_str)
        }
    }

    /// Borrow the raw panic payload for typed inspection.
    pub fn payload(&self) -> &(dyn Any + Send) {
        &*self.payload
    }

    /// Resume unwinding with the original payload.
    pub fn rethrow(self) -> ! {
        panic::resume_unwind(self.payload)
    }
}

impl std::fmt::Debug for CaughtException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaughtException")
            .field("message", &self.message())
            .finish()
    }
}

/// A member consulted when an exception propagates through its context.
///
/// Filters are offered exceptions in insertion order at the throwing node,
/// then at each ancestor. Returning `true` consumes the exception and stops
/// propagation; returning `false` declines it and the next filter is tried.
/// A filter that panics while filtering is treated as having declined.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use contextwire::{CaughtException, Context, CoreObject, ExceptionFilter, MemberTraits};
///
/// #[derive(Default)]
/// struct Swallower {
///     seen: AtomicUsize,
/// }
///
/// impl ExceptionFilter for Swallower {
///     fn filter(&self, exception: &CaughtException) -> bool {
///         self.seen.fetch_add(1, Ordering::SeqCst);
///         exception.message() == Some("recoverable")
///     }
/// }
///
/// impl CoreObject for Swallower {
///     fn member_traits(this: &Arc<Self>) -> MemberTraits {
///         MemberTraits::new(this.clone()).exception_filter(this.clone())
///     }
/// }
///
/// let ctx = Context::new_root();
/// let filter = ctx.add(Swallower::default()).unwrap();
///
/// let outcome = ctx.run_filtered(|| panic!("recoverable"));
/// assert!(outcome.is_none());
/// assert_eq!(filter.seen.load(Ordering::SeqCst), 1);
/// ```
pub trait ExceptionFilter: Send + Sync {
    /// Consume or decline an exception raised inside a context operation.
    fn filter(&self, exception: &CaughtException) -> bool;

    /// Consume or decline an exception thrown by an event receiver during a
    /// fire. `event` identifies the event capability being dispatched and
    /// `recipient` the receiver that threw. Defaults to the untagged filter.
    fn filter_firing(&self, exception: &CaughtException, event: &Key, recipient: ObjectId) -> bool {
        let _ = (event, recipient);
        self.filter(exception)
    }
}
