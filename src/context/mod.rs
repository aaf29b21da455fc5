//! The context tree: membership, autowiring, events and lifecycle.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};

use crate::autowired::{Autowired, AutowiredSlot};
use crate::deferred::{AutowiringStrategy, DeferrableAutowiring};
use crate::error::{WireError, WireResult};
use crate::events::receiver::ReceiverRegistration;
use crate::events::{EventSender, JunctionBoxManager};
use crate::internal::{object_id_of, view_as};
use crate::key::{key_of, Key};
use crate::member::{AnyArc, MemberTraits, ObjectId};
use crate::registry::{satisfy_chain, MemoValue, TypeRegistry};
use crate::traits::{Bolt, CaughtException, ContextMember, CoreObject, ExceptionFilter, PacketSubscriber, Runnable};

pub(crate) mod current;
pub(crate) mod global;
mod lifecycle;

pub use current::CurrentContextGuard;
pub use global::{global_context, GlobalSigil};

/// One-way lifecycle of a context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    Initiated,
    Shutdown,
}

/// How shutdown treats in-flight work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Runnables may drain queued work before stopping.
    Graceful,
    /// Runnables are asked to stop as soon as possible.
    Immediate,
}

/// Strong record of one member under its concrete identity.
pub(crate) struct MemberHandle {
    pub key: Key,
    pub object: ObjectId,
    /// Owning view; a member's lifetime is bounded by its enclosing context
    /// unless externally retained.
    #[allow(dead_code)]
    pub view: AnyArc,
}

pub(crate) struct ContextState {
    pub phase: LifecycleState,
    pub members: Vec<MemberHandle>,
    pub registry: TypeRegistry,
    pub context_members: Vec<Arc<dyn ContextMember>>,
    pub runnables: Vec<Arc<dyn Runnable>>,
    pub filters: Vec<Arc<dyn ExceptionFilter>>,
    pub bolts: HashMap<Key, Vec<Arc<dyn Bolt>>>,
    pub children: Vec<WeakContext>,
    pub event_receivers: Vec<Arc<ReceiverRegistration>>,
    pub delayed_receivers: Vec<Arc<ReceiverRegistration>>,
    pub snoopers: HashSet<ObjectId>,
    pub packet_subscribers: Vec<Arc<dyn PacketSubscriber>>,
    pub outstanding: Weak<crate::outstanding::OutstandingToken>,
}

impl ContextState {
    fn new() -> Self {
        Self {
            phase: LifecycleState::Constructed,
            members: Vec::new(),
            registry: TypeRegistry::default(),
            context_members: Vec::new(),
            runnables: Vec::new(),
            filters: Vec::new(),
            bolts: HashMap::new(),
            children: Vec::new(),
            event_receivers: Vec::new(),
            delayed_receivers: Vec::new(),
            snoopers: HashSet::new(),
            packet_subscribers: Vec::new(),
            outstanding: Weak::new(),
        }
    }

    fn live_children(&self) -> Vec<Context> {
        self.children
            .iter()
            .filter_map(WeakContext::upgrade)
            .collect()
    }
}

pub(crate) struct ContextInner {
    /// Strong reference up: the parent outlives the child.
    pub parent: Option<Context>,
    pub sigil: Key,
    /// Shared with peer contexts; otherwise exclusive to this node.
    pub junction: Arc<JunctionBoxManager>,
    pub state: Mutex<ContextState>,
    pub state_changed: Condvar,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        current::assert_not_current(self as *const _);

        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        // Make sure events aren't happening anymore: evict every receiver
        // registration from this manager and from the ancestor chain.
        let receivers = std::mem::take(&mut state.event_receivers);
        state.delayed_receivers.clear();
        for reg in &receivers {
            for binding in &reg.bindings {
                binding.detach(&self.junction, &reg.owner);
            }
            let mut node = self.parent.clone();
            while let Some(ancestor) = node {
                {
                    let mut st = ancestor.lock_state();
                    st.delayed_receivers.retain(|r| !Arc::ptr_eq(r, reg));
                }
                for binding in &reg.bindings {
                    binding.detach(&ancestor.inner.junction, &reg.owner);
                }
                node = ancestor.parent();
            }
        }

        // Teardown notification, reverse insertion order.
        for member in state.context_members.iter().rev() {
            member.notify_context_teardown();
        }

        tracing::trace!(sigil = %self.sigil, "context destroyed");
    }
}

/// A node in the composition tree.
///
/// `Context` is a cheap handle over shared node state; clones refer to the
/// same node. A context owns its members, distributes events among members
/// that implement matching listener capabilities, and manages the lifecycle
/// of runnables declared inside it. Children hold strong references upward;
/// parents hold weak references downward, so a subtree is collected once
/// all external holders release it.
///
/// # Examples
///
/// ```rust
/// use contextwire::{Context, CoreObject};
///
/// struct Config {
///     name: &'static str,
/// }
/// impl CoreObject for Config {}
///
/// let root = Context::new_root();
/// root.add(Config { name: "app" }).unwrap();
///
/// struct WorkerSigil;
/// let worker = root.create::<WorkerSigil>();
///
/// // Resolution ascends: the child sees the root's member.
/// let config = worker.find_by_type::<Config>().unwrap();
/// assert_eq!(config.name, "app");
/// ```
#[derive(Clone)]
pub struct Context {
    pub(crate) inner: Arc<ContextInner>,
}

/// A non-owning handle to a context node.
#[derive(Clone)]
pub struct WeakContext {
    inner: Weak<ContextInner>,
}

impl WeakContext {
    /// A handle that never upgrades.
    pub fn new() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn upgrade(&self) -> Option<Context> {
        self.inner.upgrade().map(|inner| Context { inner })
    }

    pub(crate) fn ptr_eq(a: &WeakContext, b: &WeakContext) -> bool {
        Weak::ptr_eq(&a.inner, &b.inner)
    }
}

impl Default for WeakContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Context {}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Context({})", self.inner.sigil)
    }
}

impl Context {
    // ----- construction and tree shape -----

    pub(crate) fn new_node(
        parent: Option<Context>,
        sigil: Key,
        junction: Arc<JunctionBoxManager>,
    ) -> Context {
        Context {
            inner: Arc::new(ContextInner {
                parent,
                sigil,
                junction,
                state: Mutex::new(ContextState::new()),
                state_changed: Condvar::new(),
            }),
        }
    }

    /// Create an independent root context.
    ///
    /// Embedders and tests that do not want to share the process-wide
    /// [`global_context`] can build their own tree from here.
    pub fn new_root() -> Context {
        Context::new_node(None, key_of::<()>(), Arc::new(JunctionBoxManager::new()))
    }

    /// The process-wide global context.
    pub fn global() -> Context {
        global_context()
    }

    /// Construct a child node under sigil `S`.
    ///
    /// The child is recorded in this node's child list and the sigil is
    /// broadcast upward, invoking matching bolts at each ancestor.
    pub fn create<S: 'static>(&self) -> Context {
        let sigil = key_of::<S>();
        let child = Context::new_node(
            Some(self.clone()),
            sigil,
            Arc::new(JunctionBoxManager::new()),
        );
        {
            let mut st = self.lock_state();
            st.children.retain(|w| w.upgrade().is_some());
            st.children.push(child.downgrade());
        }
        crate::observer::notify_new_context(&child);
        self.broadcast_context_creation(sigil, &child);
        tracing::debug!(sigil = %child.sigil(), "child context created");
        child
    }

    /// Construct a child node under the anonymous sigil.
    pub fn create_anonymous(&self) -> Context {
        self.create::<()>()
    }

    /// Construct a sibling sharing this node's junction-box manager.
    ///
    /// The peer has independent membership, deferrals and lifecycle, but a
    /// receiver added in either peer is reached through the other's
    /// senders of the same event type.
    pub fn create_peer<S: 'static>(&self) -> Context {
        let sigil = key_of::<S>();
        let parent = self.parent();
        let peer = Context::new_node(parent.clone(), sigil, self.inner.junction.clone());
        if let Some(parent) = &parent {
            {
                let mut st = parent.lock_state();
                st.children.retain(|w| w.upgrade().is_some());
                st.children.push(peer.downgrade());
            }
        }
        crate::observer::notify_new_context(&peer);
        if let Some(parent) = &parent {
            parent.broadcast_context_creation(sigil, &peer);
        }
        tracing::debug!(sigil = %peer.sigil(), "peer context created");
        peer
    }

    pub fn parent(&self) -> Option<Context> {
        self.inner.parent.clone()
    }

    /// The sigil this context was created under.
    pub fn sigil(&self) -> Key {
        self.inner.sigil
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ContextState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ----- membership -----

    /// Construct `value` as a member of this node.
    ///
    /// Registers the object under its concrete identity, every interface
    /// its capability record exposes, and each declared capability hook;
    /// resolves all now-satisfiable deferred fields in this subtree before
    /// returning; and signals `new_object` on the global context.
    pub fn add<T: CoreObject>(&self, value: T) -> WireResult<Arc<T>> {
        self.add_shared(Arc::new(value))
    }

    /// Register an externally constructed object as a member of this node.
    pub fn add_shared<T: CoreObject>(&self, object: Arc<T>) -> WireResult<Arc<T>> {
        let traits = T::member_traits(&object);
        self.add_traits(traits)?;
        Ok(object)
    }

    /// Construct a `T` via `Default` as a member of this node.
    pub fn inject<T: CoreObject + Default>(&self) -> WireResult<Arc<T>> {
        self.add(T::default())
    }

    /// Construct a member with an explicit factory.
    ///
    /// The factory runs before any lock is taken, so it may freely consult
    /// other contexts, but must not mutate this one.
    pub fn inject_with<T: CoreObject>(&self, make: impl FnOnce() -> T) -> WireResult<Arc<T>> {
        self.add(make())
    }

    /// Find-or-construct: the nearest reachable `T`, creating one in this
    /// node when none exists.
    pub fn require<T: CoreObject + Default>(&self) -> WireResult<Arc<T>> {
        if let Some(existing) = self.find_by_type::<T>() {
            return Ok(existing);
        }
        match self.inject::<T>() {
            Ok(created) => Ok(created),
            // Lost a race with a concurrent require; take the winner.
            Err(WireError::DuplicateType(_)) | Err(WireError::DuplicateMember(_)) => self
                .find_by_type::<T>()
                .ok_or(WireError::DuplicateType(std::any::type_name::<T>())),
            Err(other) => Err(other),
        }
    }

    fn add_traits(&self, traits: MemberTraits) -> WireResult<()> {
        let MemberTraits {
            concrete,
            concrete_view,
            object_id,
            interfaces,
            context_member,
            runnable,
            filter,
            bolt,
            packet_subscriber,
            event_bindings,
        } = traits;

        let mut pairs: Vec<(Key, AnyArc)> = Vec::with_capacity(1 + interfaces.len());
        pairs.push((concrete, concrete_view));
        pairs.extend(interfaces);

        let mut finalizers: Vec<(Arc<dyn AutowiringStrategy>, Arc<dyn DeferrableAutowiring>)> =
            Vec::new();
        let late_runnable;
        let children;
        {
            let mut st = self.lock_state();
            if st.phase == LifecycleState::Shutdown {
                return Err(WireError::ContextShutdown("add"));
            }

            // Validate that this addition does not generate an ambiguity.
            if let Some(memo) = st.registry.get(&concrete) {
                if let Some(value) = &memo.value {
                    if value.local {
                        return Err(if value.object == object_id {
                            WireError::DuplicateMember(concrete.display_name())
                        } else {
                            WireError::DuplicateType(concrete.display_name())
                        });
                    }
                }
            }
            for (key, _) in pairs.iter().skip(1) {
                if let Some(memo) = st.registry.get(key) {
                    if let Some(value) = &memo.value {
                        if value.local && value.object != object_id {
                            return Err(WireError::AmbiguousAutowire(key.display_name()));
                        }
                    }
                }
            }

            // Record the member and its capability hooks.
            st.members.push(MemberHandle {
                key: concrete,
                object: object_id,
                view: pairs[0].1.clone(),
            });
            if let Some(member) = context_member {
                st.context_members.push(member);
            }
            late_runnable = match runnable {
                Some(r) => {
                    st.runnables.push(r.clone());
                    (st.phase == LifecycleState::Initiated).then_some(r)
                }
                None => None,
            };
            if let Some(f) = filter {
                st.filters.push(f);
            }
            if let Some(b) = bolt {
                let sigils = b.context_sigils();
                if sigils.is_empty() {
                    st.bolts.entry(key_of::<()>()).or_default().push(b);
                } else {
                    for sigil in sigils {
                        st.bolts.entry(sigil).or_default().push(b.clone());
                    }
                }
            }
            if let Some(p) = packet_subscriber {
                st.packet_subscribers.push(p);
            }

            // Install the value in every matching memo and detach the
            // now-satisfiable chains. Chains are walked while the lock is
            // held; they are owned exclusively once detached.
            for (key, view) in &pairs {
                let memo = st.registry.memo_mut(*key);
                if let Some(existing) = &memo.value {
                    if existing.local && existing.object == object_id {
                        // The record listed the same identity twice.
                        continue;
                    }
                }
                let had_value = memo.value.is_some();
                memo.value = Some(MemoValue {
                    view: view.clone(),
                    object: object_id,
                    local: true,
                });
                if !had_value {
                    if let Some(head) = memo.first.take() {
                        satisfy_chain(head, view, &mut finalizers);
                    }
                }
            }

            children = st.live_children();
        }

        // Give children a chance to also update their deferred elements.
        for child in &children {
            child.update_deferred(object_id, &pairs);
        }

        if !event_bindings.is_empty() {
            self.register_receivers(Arc::new(ReceiverRegistration {
                owner: self.downgrade(),
                object: object_id,
                bindings: event_bindings,
            }));
        }

        if let Some(r) = late_runnable {
            // Late to the party: the context already runs, start now.
            r.start(self.increment_outstanding());
        }

        // Strategy finalizers may re-enter context operations; run them
        // outside every lock.
        for (strategy, field) in finalizers {
            strategy.finalize(&field);
        }

        crate::observer::notify_new_object(self, concrete);
        tracing::debug!(sigil = %self.sigil(), member = %concrete, "member added");
        Ok(())
    }

    pub(crate) fn update_deferred(&self, object: ObjectId, pairs: &[(Key, AnyArc)]) {
        let mut finalizers: Vec<(Arc<dyn AutowiringStrategy>, Arc<dyn DeferrableAutowiring>)> =
            Vec::new();
        let children;
        {
            let mut st = self.lock_state();
            for (key, view) in pairs {
                // Only memos that already exist participate; downward
                // resolution never creates interest in a type.
                if let Some(memo) = st.registry.get_mut(key) {
                    if memo.value.is_none() {
                        memo.value = Some(MemoValue {
                            view: view.clone(),
                            object,
                            local: false,
                        });
                        if let Some(head) = memo.first.take() {
                            satisfy_chain(head, view, &mut finalizers);
                        }
                    }
                }
            }
            children = st.live_children();
        }
        for child in &children {
            child.update_deferred(object, pairs);
        }
        for (strategy, field) in finalizers {
            strategy.finalize(&field);
        }
    }

    /// The current member satisfying `T` in this node or the nearest
    /// ancestor.
    pub fn find_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let key = key_of::<T>();
        let mut node = Some(self.clone());
        while let Some(n) = node {
            {
                let st = n.lock_state();
                if let Some(memo) = st.registry.get(&key) {
                    if let Some(value) = &memo.value {
                        return view_as::<T>(&value.view);
                    }
                }
            }
            node = n.parent();
        }
        None
    }

    // ----- autowiring -----

    /// Declare a field of type `T` against this context.
    ///
    /// Satisfied immediately when a matching member is reachable; otherwise
    /// deferred until one is added here or in an ancestor.
    pub fn autowire<T: ?Sized + Send + Sync + 'static>(&self) -> Autowired<T> {
        let slot = AutowiredSlot::<T>::new();
        self.autowire_field(slot.clone() as Arc<dyn DeferrableAutowiring>);
        Autowired::from_parts(slot, self.downgrade())
    }

    /// Wire an externally implemented deferrable field.
    pub fn autowire_field(&self, field: Arc<dyn DeferrableAutowiring>) {
        let key = field.key();
        // Hold the issuing node's lock across the whole walk: a concurrent
        // add in an ancestor recurses downward through this lock, so it
        // cannot slip between our miss and the chain link. Taking ancestor
        // locks underneath ours follows the child-to-parent order.
        let mut st = self.lock_state();
        if let Some(memo) = st.registry.get(&key) {
            if let Some(value) = &memo.value {
                field.satisfy(&value.view);
                return;
            }
        }
        let mut node = self.parent();
        while let Some(n) = node {
            {
                let ancestor = n.lock_state();
                if let Some(memo) = ancestor.registry.get(&key) {
                    if let Some(value) = &memo.value {
                        field.satisfy(&value.view);
                        return;
                    }
                }
            }
            node = n.parent();
        }
        // Unsatisfied everywhere: link onto this node's chain.
        let memo = st.registry.memo_mut(key);
        field.set_flink(memo.first.take());
        memo.first = Some(field);
    }

    /// Remove a deferred field from its chain and finalize its strategy.
    pub fn cancel_autowiring(&self, field: &Arc<dyn DeferrableAutowiring>) {
        let strategy = field.strategy();
        let unlinked = {
            let mut st = self.lock_state();
            st.registry.unlink(field)
        };
        if let Some(strategy) = strategy {
            strategy.finalize(field);
        }
        if unlinked {
            tracing::trace!(sought = field.key().display_name(), "autowiring cancelled");
        }
    }

    // ----- events -----

    /// A sender handle for event capability `E`.
    ///
    /// The handle binds this node's junction box and every ancestor's at
    /// creation, so firing reaches receivers installed anywhere in the tree
    /// that shares an ancestor with this node, without walking the tree at
    /// fire time.
    pub fn event_sender<E: ?Sized + Send + Sync + 'static>(&self) -> EventSender<E> {
        let mut boxes = Vec::new();
        let mut node = Some(self.clone());
        while let Some(n) = node {
            boxes.push(n.inner.junction.junction_box::<E>());
            node = n.parent();
        }
        EventSender::new(boxes, self.clone())
    }

    /// Register an external object's event receivers with this context
    /// without making it a member.
    pub fn snoop<T: CoreObject>(&self, object: &Arc<T>) {
        let traits = T::member_traits(object);
        if traits.event_bindings.is_empty() {
            return;
        }
        let registration = Arc::new(ReceiverRegistration {
            owner: self.downgrade(),
            object: traits.object_id,
            bindings: traits.event_bindings,
        });
        {
            let mut st = self.lock_state();
            st.snoopers.insert(traits.object_id);
        }
        self.register_receivers(registration);
    }

    /// Remove a snooped object's receivers from this context.
    ///
    /// The removal ascends only while the ancestor holds the object
    /// neither as a member nor as a snooper of its own.
    pub fn unsnoop<T: CoreObject>(&self, object: &Arc<T>) {
        let id = object_id_of(object);
        let registration = {
            let mut st = self.lock_state();
            if !st.snoopers.remove(&id) {
                return;
            }
            st.delayed_receivers.retain(|r| r.object != id);
            let position = st.event_receivers.iter().position(|r| r.object == id);
            position.map(|p| st.event_receivers.remove(p))
        };
        let Some(registration) = registration else {
            return;
        };
        for binding in &registration.bindings {
            binding.detach(&self.inner.junction, &registration.owner);
        }
        let mut node = self.parent();
        while let Some(ancestor) = node {
            let holds = {
                let st = ancestor.lock_state();
                st.snoopers.contains(&id) || st.members.iter().any(|m| m.object == id)
            };
            if holds {
                break;
            }
            {
                let mut st = ancestor.lock_state();
                st.delayed_receivers
                    .retain(|r| !Arc::ptr_eq(r, &registration));
            }
            for binding in &registration.bindings {
                binding.detach(&ancestor.inner.junction, &registration.owner);
            }
            node = ancestor.parent();
        }
    }

    // ----- exception filtering -----

    /// Offer an exception to the filter chain: local filters in insertion
    /// order, then each ancestor's. Returns whether a filter consumed it.
    pub fn filter_exception(&self, exception: &CaughtException) -> bool {
        let mut node = Some(self.clone());
        while let Some(n) = node {
            let filters = { n.lock_state().filters.clone() };
            for filter in filters {
                let consumed =
                    panic::catch_unwind(AssertUnwindSafe(|| filter.filter(exception)))
                        .unwrap_or(false);
                if consumed {
                    return true;
                }
            }
            node = n.parent();
        }
        false
    }

    pub(crate) fn filter_firing_exception(
        &self,
        exception: &CaughtException,
        event: &Key,
        recipient: ObjectId,
    ) -> bool {
        let mut node = Some(self.clone());
        while let Some(n) = node {
            let filters = { n.lock_state().filters.clone() };
            for filter in filters {
                let consumed = panic::catch_unwind(AssertUnwindSafe(|| {
                    filter.filter_firing(exception, event, recipient)
                }))
                .unwrap_or(false);
                if consumed {
                    return true;
                }
            }
            node = n.parent();
        }
        false
    }

    /// Run `f` with panic protection: a panic is offered to this context's
    /// filter chain, and rethrown when no filter consumes it.
    ///
    /// Returns `None` when a panic occurred and was consumed.
    pub fn run_filtered<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let exception = CaughtException::new(payload);
                if self.filter_exception(&exception) {
                    None
                } else {
                    exception.rethrow()
                }
            }
        }
    }

    // ----- bolts -----

    fn broadcast_context_creation(&self, sigil: Key, child: &Context) {
        let mut node = Some(self.clone());
        while let Some(n) = node {
            let listeners: Vec<Arc<dyn Bolt>> = {
                let st = n.lock_state();
                let mut out: Vec<Arc<dyn Bolt>> = Vec::new();
                if let Some(list) = st.bolts.get(&sigil) {
                    out.extend(list.iter().cloned());
                }
                // Anonymous listeners hear every creation, but never twice
                // for one event.
                if !sigil.is_anonymous() {
                    if let Some(list) = st.bolts.get(&key_of::<()>()) {
                        for bolt in list {
                            let duplicate = out.iter().any(|b| {
                                std::ptr::eq(
                                    Arc::as_ptr(b) as *const (),
                                    Arc::as_ptr(bolt) as *const (),
                                )
                            });
                            if !duplicate {
                                out.push(bolt.clone());
                            }
                        }
                    }
                }
                out
            };
            for bolt in listeners {
                bolt.context_created(child);
            }
            node = n.parent();
        }
    }

    // ----- diagnostics -----

    /// Replay `new_context`/`new_object` for this subtree so late-attached
    /// diagnostic listeners can reconstruct the composition.
    pub fn build_current_state(&self) {
        crate::observer::notify_new_context(self);
        let (member_keys, children) = {
            let st = self.lock_state();
            (
                st.members.iter().map(|m| m.key).collect::<Vec<_>>(),
                st.live_children(),
            )
        };
        for key in member_keys {
            crate::observer::notify_new_object(self, key);
        }
        for child in children {
            child.build_current_state();
        }
    }

    /// Human-readable snapshot of this node's memos and runnables.
    pub fn dump(&self) -> String {
        use std::fmt::Write as _;
        let st = self.lock_state();
        let mut out = String::new();
        let _ = writeln!(out, "context [{}] {:?}", self.inner.sigil, st.phase);
        for (key, memo) in st.registry.iter() {
            match &memo.value {
                Some(value) if value.local => {
                    let _ = writeln!(out, "  {key} -> satisfied");
                }
                Some(_) => {
                    let _ = writeln!(out, "  {key} -> satisfied (ancestor)");
                }
                None => {
                    let _ = writeln!(out, "  {key} -> deferred");
                }
            }
        }
        let _ = writeln!(out, "  runnables: {}", st.runnables.len());
        if !st.packet_subscribers.is_empty() {
            let _ = writeln!(out, "  packet subscribers: {}", st.packet_subscribers.len());
        }
        out
    }
}
