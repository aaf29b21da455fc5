//! The per-event-type receiver set.

use std::sync::{Arc, Mutex, PoisonError};

use crate::context::WeakContext;
use crate::events::dispatch::DispatchQueue;
use crate::member::ObjectId;

/// One receiver's entry in a junction box, tagged with the context that
/// owns the registration so snoop and teardown can remove exactly their
/// own entries.
pub(crate) struct JunctionBoxEntry<E: ?Sized> {
    pub owner: WeakContext,
    pub receiver: Arc<E>,
    pub queue: Option<Arc<DispatchQueue>>,
    pub object: ObjectId,
}

impl<E: ?Sized> Clone for JunctionBoxEntry<E> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            receiver: self.receiver.clone(),
            queue: self.queue.clone(),
            object: self.object,
        }
    }
}

/// The set of receivers for one event capability.
///
/// Senders iterate a snapshot taken under the internal lock, so concurrent
/// add/remove observe a consistent set (copy-on-iterate). A receiver added
/// during a fire is seen by the next fire, never by the one in flight.
pub struct JunctionBox<E: ?Sized + Send + Sync + 'static> {
    entries: Mutex<Vec<JunctionBoxEntry<E>>>,
}

impl<E: ?Sized + Send + Sync + 'static> JunctionBox<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<JunctionBoxEntry<E>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an entry. Re-insertion of the same `{owner, object}` pair is
    /// idempotent; ascending registration can revisit a manager shared by
    /// peer contexts.
    pub(crate) fn add(&self, entry: JunctionBoxEntry<E>) {
        let mut entries = self.lock();
        let present = entries
            .iter()
            .any(|e| e.object == entry.object && WeakContext::ptr_eq(&e.owner, &entry.owner));
        if !present {
            entries.push(entry);
        }
    }

    /// Remove the entry registered by `owner` for `object`, if present.
    pub(crate) fn remove(&self, object: ObjectId, owner: &WeakContext) {
        self.lock()
            .retain(|e| !(e.object == object && WeakContext::ptr_eq(&e.owner, owner)));
    }

    pub(crate) fn snapshot(&self) -> Vec<JunctionBoxEntry<E>> {
        self.lock().clone()
    }

    /// Whether any receiver is currently registered.
    pub fn has_listeners(&self) -> bool {
        !self.lock().is_empty()
    }
}
