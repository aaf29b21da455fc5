//! Tagged capability records for context members.

use std::any::Any;
use std::sync::Arc;

use crate::events::receiver::{EventBinding, TypedEventBinding};
use crate::events::DispatchQueue;
use crate::internal::{erase_view, object_id_of};
use crate::key::{key_of, Key};
use crate::traits::{Bolt, ContextMember, ExceptionFilter, PacketSubscriber, Runnable};

/// Type-erased shared handle used for memo and view storage.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Identity of a member allocation, stable across capability views.
///
/// All views of one member are coerced from the same shared handle, so the
/// underlying data address identifies the object regardless of which
/// capability it was seen through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

/// The capability record of one prospective member.
///
/// Built by a member's [`CoreObject::member_traits`](crate::CoreObject)
/// implementation and consumed by [`Context::add`](crate::Context::add),
/// which registers the object under its concrete identity, every exposed
/// interface, and each declared capability hook.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use contextwire::{Context, CoreObject, MemberTraits};
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock(u64);
///
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 {
///         self.0
///     }
/// }
///
/// impl CoreObject for FixedClock {
///     fn member_traits(this: &Arc<Self>) -> MemberTraits {
///         MemberTraits::new(this.clone()).expose::<dyn Clock>(this.clone())
///     }
/// }
///
/// let ctx = Context::new_root();
/// ctx.add(FixedClock(42)).unwrap();
///
/// let clock = ctx.find_by_type::<dyn Clock>().unwrap();
/// assert_eq!(clock.now(), 42);
/// ```
pub struct MemberTraits {
    pub(crate) concrete: Key,
    pub(crate) concrete_view: AnyArc,
    pub(crate) object_id: ObjectId,
    pub(crate) interfaces: Vec<(Key, AnyArc)>,
    pub(crate) context_member: Option<Arc<dyn ContextMember>>,
    pub(crate) runnable: Option<Arc<dyn Runnable>>,
    pub(crate) filter: Option<Arc<dyn ExceptionFilter>>,
    pub(crate) bolt: Option<Arc<dyn Bolt>>,
    pub(crate) packet_subscriber: Option<Arc<dyn PacketSubscriber>>,
    pub(crate) event_bindings: Vec<Arc<dyn EventBinding>>,
}

impl MemberTraits {
    /// Start a record for `object`, exposing its concrete identity only.
    pub fn new<T: Send + Sync + 'static>(object: Arc<T>) -> Self {
        let object_id = object_id_of(&object);
        Self {
            concrete: key_of::<T>(),
            concrete_view: erase_view(&object),
            object_id,
            interfaces: Vec::new(),
            context_member: None,
            runnable: None,
            filter: None,
            bolt: None,
            packet_subscriber: None,
            event_bindings: Vec::new(),
        }
    }

    /// Expose an additional autowiring identity, typically `dyn Trait`.
    ///
    /// The view must be a coercion of the same object the record was started
    /// with; exposing a different allocation would corrupt identity tracking.
    pub fn expose<I: ?Sized + Send + Sync + 'static>(mut self, view: Arc<I>) -> Self {
        debug_assert_eq!(object_id_of(&view), self.object_id);
        self.interfaces.push((key_of::<I>(), erase_view(&view)));
        self
    }

    /// Participate in teardown notification.
    pub fn context_member(mut self, member: Arc<dyn ContextMember>) -> Self {
        self.context_member = Some(member);
        self
    }

    /// Offer start/stop/wait; started on initiate, counted as outstanding.
    pub fn runnable(mut self, runnable: Arc<dyn Runnable>) -> Self {
        self.runnable = Some(runnable);
        self
    }

    /// Join the context's exception filter chain.
    pub fn exception_filter(mut self, filter: Arc<dyn ExceptionFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Listen for child-context creation.
    pub fn bolt(mut self, bolt: Arc<dyn Bolt>) -> Self {
        self.bolt = Some(bolt);
        self
    }

    /// Participate in the packet layer built on top of the core.
    pub fn packet_subscriber(mut self, subscriber: Arc<dyn PacketSubscriber>) -> Self {
        self.packet_subscriber = Some(subscriber);
        self
    }

    /// Receive events of capability `E`, dispatched inline on the firing
    /// thread.
    pub fn receives<E: ?Sized + Send + Sync + 'static>(mut self, receiver: Arc<E>) -> Self {
        debug_assert_eq!(object_id_of(&receiver), self.object_id);
        self.event_bindings.push(Arc::new(TypedEventBinding {
            receiver,
            queue: None,
            object: self.object_id,
        }));
        self
    }

    /// Receive events of capability `E`, with deferred operations enqueued
    /// onto `queue` for execution on the receiver's own dispatch thread.
    pub fn receives_deferred<E: ?Sized + Send + Sync + 'static>(
        mut self,
        receiver: Arc<E>,
        queue: Arc<DispatchQueue>,
    ) -> Self {
        debug_assert_eq!(object_id_of(&receiver), self.object_id);
        self.event_bindings.push(Arc::new(TypedEventBinding {
            receiver,
            queue: Some(queue),
            object: self.object_id,
        }));
        self
    }
}
