//! Ownership of one junction box per event type.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::events::junction_box::JunctionBox;
use crate::key::{key_of, Key};
use crate::member::AnyArc;

/// Owns one [`JunctionBox`] per event type ever referenced through the
/// owning context, and routes add/remove to the right box.
///
/// Peer contexts share a single manager, which is what lets a receiver
/// added in one peer be reached through the other's senders.
pub struct JunctionBoxManager {
    boxes: Mutex<HashMap<Key, AnyArc>>,
}

impl JunctionBoxManager {
    pub(crate) fn new() -> Self {
        Self {
            boxes: Mutex::new(HashMap::new()),
        }
    }

    /// The junction box for event capability `E`, created on first use.
    pub(crate) fn junction_box<E: ?Sized + Send + Sync + 'static>(&self) -> Arc<JunctionBox<E>> {
        let mut boxes = self.boxes.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = boxes
            .entry(key_of::<E>())
            .or_insert_with(|| Arc::new(JunctionBox::<E>::new()) as AnyArc);
        entry
            .clone()
            .downcast::<JunctionBox<E>>()
            .expect("junction box stored under a mismatched event key")
    }
}
