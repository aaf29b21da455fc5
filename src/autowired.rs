//! Declarative autowired fields.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::context::{Context, WeakContext};
use crate::deferred::{AutowiringStrategy, DeferrableAutowiring};
use crate::internal::view_as;
use crate::key::{key_of, Key};
use crate::member::AnyArc;

type Callback<T> = Box<dyn FnOnce(&Arc<T>) + Send>;

/// The slot record linked into a context's deferred chain.
pub(crate) struct AutowiredSlot<T: ?Sized + Send + Sync + 'static> {
    this: Weak<AutowiredSlot<T>>,
    value: Mutex<Option<Arc<T>>>,
    flink: Mutex<Option<Arc<dyn DeferrableAutowiring>>>,
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T: ?Sized + Send + Sync + 'static> AutowiredSlot<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            value: Mutex::new(None),
            flink: Mutex::new(None),
            callbacks: Mutex::new(Vec::new()),
        })
    }

    fn value(&self) -> Option<Arc<T>> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn run_callbacks(&self) {
        let drained: Vec<Callback<T>> = {
            let mut callbacks = self
                .callbacks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            callbacks.drain(..).collect()
        };
        if drained.is_empty() {
            return;
        }
        if let Some(value) = self.value() {
            for callback in drained {
                callback(&value);
            }
        }
        // Cancelled before satisfaction: callbacks are dropped unrun.
    }
}

impl<T: ?Sized + Send + Sync + 'static> DeferrableAutowiring for AutowiredSlot<T> {
    fn key(&self) -> Key {
        key_of::<T>()
    }

    fn satisfy(&self, view: &AnyArc) -> bool {
        match view_as::<T>(view) {
            Some(value) => {
                *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
                true
            }
            None => false,
        }
    }

    fn flink(&self) -> Option<Arc<dyn DeferrableAutowiring>> {
        self.flink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_flink(&self, next: Option<Arc<dyn DeferrableAutowiring>>) {
        *self.flink.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn strategy(&self) -> Option<Arc<dyn AutowiringStrategy>> {
        let has_callbacks = !self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty();
        if has_callbacks {
            self.this
                .upgrade()
                .map(|slot| slot as Arc<dyn AutowiringStrategy>)
        } else {
            None
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> AutowiringStrategy for AutowiredSlot<T> {
    fn finalize(&self, _field: &Arc<dyn DeferrableAutowiring>) {
        self.run_callbacks();
    }
}

/// A field bound to the first type-compatible member reachable upward in
/// the context tree.
///
/// Construction consults the issuing context and its ancestors; when no
/// matching member exists yet the field is linked into the issuing
/// context's deferred chain. It is satisfied, before the corresponding
/// `add` returns, once a match appears there or in any ancestor. Dropping
/// an unsatisfied field cancels the pending autowiring.
///
/// # Examples
///
/// ```rust
/// use contextwire::{Autowired, Context, CoreObject};
///
/// struct Engine {
///     rpm: u32,
/// }
/// impl CoreObject for Engine {}
///
/// let root = Context::new_root();
/// let engine: Autowired<Engine> = root.autowire();
/// assert!(!engine.is_satisfied());
///
/// let added = root.add(Engine { rpm: 7000 }).unwrap();
/// let resolved = engine.get().unwrap();
/// assert_eq!(resolved.rpm, 7000);
/// assert!(std::sync::Arc::ptr_eq(&added, &resolved));
/// ```
pub struct Autowired<T: ?Sized + Send + Sync + 'static> {
    slot: Arc<AutowiredSlot<T>>,
    context: WeakContext,
}

impl<T: ?Sized + Send + Sync + 'static> Autowired<T> {
    /// Autowire against the thread's current context.
    pub fn new() -> Self {
        Context::current().autowire()
    }

    pub(crate) fn from_parts(slot: Arc<AutowiredSlot<T>>, context: WeakContext) -> Self {
        Self { slot, context }
    }

    /// The satisfying member, when one has been found.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.value()
    }

    /// The satisfying member, panicking when unsatisfied.
    pub fn get_required(&self) -> Arc<T> {
        self.get().unwrap_or_else(|| {
            panic!(
                "autowired field of type {} is not satisfied",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn is_satisfied(&self) -> bool {
        self.slot.value().is_some()
    }

    /// The context this field was issued in, if it is still alive.
    pub fn context(&self) -> Option<Context> {
        self.context.upgrade()
    }

    /// Run `callback` once the field is satisfied.
    ///
    /// Runs inline when the field is already satisfied; otherwise the
    /// callback is finalized outside any context lock after the satisfying
    /// `add`. A cancelled field drops its callbacks unrun.
    pub fn notify_when_autowired(&self, callback: impl FnOnce(&Arc<T>) + Send + 'static) {
        if let Some(value) = self.get() {
            callback(&value);
            return;
        }
        self.slot
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(callback));
        // Satisfaction may have raced the registration; drain ourselves if
        // the strategy already ran.
        if self.is_satisfied() {
            self.slot.run_callbacks();
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Drop for Autowired<T> {
    fn drop(&mut self) {
        if self.is_satisfied() {
            return;
        }
        if let Some(context) = self.context.upgrade() {
            let field = self.slot.clone() as Arc<dyn DeferrableAutowiring>;
            context.cancel_autowiring(&field);
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> std::fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autowired")
            .field("type", &std::any::type_name::<T>())
            .field("satisfied", &self.is_satisfied())
            .finish()
    }
}
