//! Type-erased receiver bindings.
//!
//! A member's capability record lists its event capabilities as erased
//! bindings; each binding remembers the concrete event type and knows how
//! to insert or remove the receiver's entry in a junction-box manager.

use std::sync::Arc;

use crate::context::WeakContext;
use crate::events::dispatch::DispatchQueue;
use crate::events::junction_box::JunctionBoxEntry;
use crate::events::manager::JunctionBoxManager;
use crate::member::ObjectId;

pub(crate) trait EventBinding: Send + Sync {
    fn attach(&self, manager: &JunctionBoxManager, owner: &WeakContext);
    fn detach(&self, manager: &JunctionBoxManager, owner: &WeakContext);
}

pub(crate) struct TypedEventBinding<E: ?Sized + Send + Sync + 'static> {
    pub receiver: Arc<E>,
    pub queue: Option<Arc<DispatchQueue>>,
    pub object: ObjectId,
}

impl<E: ?Sized + Send + Sync + 'static> EventBinding for TypedEventBinding<E> {
    fn attach(&self, manager: &JunctionBoxManager, owner: &WeakContext) {
        manager.junction_box::<E>().add(JunctionBoxEntry {
            owner: owner.clone(),
            receiver: self.receiver.clone(),
            queue: self.queue.clone(),
            object: self.object,
        });
    }

    fn detach(&self, manager: &JunctionBoxManager, owner: &WeakContext) {
        manager.junction_box::<E>().remove(self.object, owner);
    }
}

/// One member's (or snooper's) full set of receiver bindings, registered
/// with the context named by `owner`.
pub(crate) struct ReceiverRegistration {
    pub owner: WeakContext,
    pub object: ObjectId,
    pub bindings: Vec<Arc<dyn EventBinding>>,
}
