//! Sender handles and the invoke relay.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::{Context, WeakContext};
use crate::events::dispatch::{Deferred, FiredReturn};
use crate::events::junction_box::{JunctionBox, JunctionBoxEntry};
use crate::key::{key_of, Key};
use crate::traits::CaughtException;

/// A per-event-type sender handle.
///
/// Obtained from [`Context::event_sender`]; cheap to clone and to hold.
/// The handle binds the junction boxes of the issuing context and every
/// ancestor once, at creation; firing never walks the tree. Combined with
/// ascending receiver registration this makes the reach symmetric: a
/// sender anywhere reaches initiated receivers installed above it, beside
/// it, or below it, each exactly once.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use contextwire::{Context, CoreObject, MemberTraits};
///
/// trait Ping: Send + Sync {
///     fn ping(&self, value: u32);
/// }
///
/// #[derive(Default)]
/// struct Counter(AtomicU32);
///
/// impl Ping for Counter {
///     fn ping(&self, value: u32) {
///         self.0.fetch_add(value, Ordering::SeqCst);
///     }
/// }
///
/// impl CoreObject for Counter {
///     fn member_traits(this: &Arc<Self>) -> MemberTraits {
///         MemberTraits::new(this.clone()).receives::<dyn Ping>(this.clone())
///     }
/// }
///
/// let root = Context::new_root();
/// let counter = root.add(Counter::default()).unwrap();
///
/// // A sender in a grandchild reaches the listener installed in the root.
/// let child = root.create_anonymous();
/// let grandchild = child.create_anonymous();
/// grandchild.initiate();
///
/// grandchild.event_sender::<dyn Ping>().fire(|r| r.ping(3));
/// assert_eq!(counter.0.load(Ordering::SeqCst), 3);
/// ```
pub struct EventSender<E: ?Sized + Send + Sync + 'static> {
    /// Junction boxes of the origin and each ancestor, nearest first.
    boxes: Vec<Arc<JunctionBox<E>>>,
    origin: Context,
}

impl<E: ?Sized + Send + Sync + 'static> Clone for EventSender<E> {
    fn clone(&self) -> Self {
        Self {
            boxes: self.boxes.clone(),
            origin: self.origin.clone(),
        }
    }
}

impl<E: ?Sized + Send + Sync + 'static> EventSender<E> {
    pub(crate) fn new(boxes: Vec<Arc<JunctionBox<E>>>, origin: Context) -> Self {
        Self { boxes, origin }
    }

    /// Snapshot the current receiver set into a relay.
    ///
    /// The relay observes a consistent set regardless of concurrent
    /// add/remove; receivers added after this call are not reached. A
    /// receiver registered in several bound boxes (its own and, after
    /// initiation, its ancestors') is captured once.
    pub fn invoke(&self) -> InvokeRelay<E> {
        let mut entries: Vec<JunctionBoxEntry<E>> = Vec::new();
        for junction_box in &self.boxes {
            for entry in junction_box.snapshot() {
                let duplicate = entries.iter().any(|e| {
                    e.object == entry.object && WeakContext::ptr_eq(&e.owner, &entry.owner)
                });
                if !duplicate {
                    entries.push(entry);
                }
            }
        }
        InvokeRelay {
            entries,
            origin: self.origin.clone(),
            event: key_of::<E>(),
        }
    }

    /// Invoke `op` inline on every current receiver, on this thread.
    ///
    /// A receiver panic is offered to the owning context's exception filter
    /// chain; if no filter consumes it, the panic resumes on this thread.
    pub fn fire<R: FiredReturn, F: Fn(&E) -> R>(&self, op: F) {
        self.invoke().fire(op);
    }

    /// Enqueue `op` onto every current receiver's dispatch queue.
    ///
    /// Only operations returning the [`Deferred`] marker are accepted;
    /// receivers registered without a dispatch queue are skipped with a
    /// warning rather than being invoked on this thread.
    pub fn defer<F>(&self, op: F)
    where
        F: Fn(&E) -> Deferred + Clone + Send + Sync + 'static,
    {
        self.invoke().defer(op);
    }

    /// Whether any receiver is currently reachable for `E`.
    pub fn has_listeners(&self) -> bool {
        self.boxes.iter().any(|b| b.has_listeners())
    }
}

/// A captured snapshot of receivers, ready to be applied to one operation.
pub struct InvokeRelay<E: ?Sized + Send + Sync + 'static> {
    entries: Vec<JunctionBoxEntry<E>>,
    origin: Context,
    event: Key,
}

impl<E: ?Sized + Send + Sync + 'static> InvokeRelay<E> {
    /// Number of receivers this relay will reach.
    pub fn receiver_count(&self) -> usize {
        self.entries.len()
    }

    /// Apply `op` to each receiver inline. See [`EventSender::fire`].
    pub fn fire<R: FiredReturn, F: Fn(&E) -> R>(self, op: F) {
        for entry in &self.entries {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                op(&*entry.receiver);
            }));
            if let Err(payload) = outcome {
                let exception = CaughtException::new(payload);
                let owner = entry
                    .owner
                    .upgrade()
                    .unwrap_or_else(|| self.origin.clone());
                if !owner.filter_firing_exception(&exception, &self.event, entry.object) {
                    exception.rethrow();
                }
            }
        }
    }

    /// Enqueue `op` for each receiver. See [`EventSender::defer`].
    pub fn defer<F>(self, op: F)
    where
        F: Fn(&E) -> Deferred + Clone + Send + Sync + 'static,
    {
        for entry in self.entries {
            match &entry.queue {
                Some(queue) => {
                    let receiver = entry.receiver.clone();
                    let op = op.clone();
                    let accepted = queue.enqueue(Box::new(move || {
                        op(&*receiver);
                    }));
                    if !accepted {
                        tracing::warn!(
                            event = self.event.display_name(),
                            "dispatch queue aborted; deferred invocation dropped"
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        event = self.event.display_name(),
                        "deferred event receiver exposes no dispatch queue; invocation dropped"
                    );
                }
            }
        }
    }
}
