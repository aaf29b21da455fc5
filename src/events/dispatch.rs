//! Dispatch intent markers and the receiver-owned dispatch queue.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, PoisonError};

/// Return marker for event operations that must not run on the firing
/// thread.
///
/// An operation declared as returning `Deferred` is only reachable through
/// [`EventSender::defer`](crate::EventSender::defer), which enqueues the
/// invocation onto the receiver's [`DispatchQueue`]. Attempting to `fire`
/// such an operation fails to compile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deferred;

mod sealed {
    pub trait Sealed {}
    impl Sealed for () {}
}

/// Return marker for event operations dispatched inline by
/// [`EventSender::fire`](crate::EventSender::fire).
///
/// Implemented for `()` only; the [`Deferred`] marker deliberately does not
/// implement it, which is what rejects firing a deferred operation at the
/// call site.
pub trait FiredReturn: sealed::Sealed {}

impl FiredReturn for () {}

type Thunk = Box<dyn FnOnce() + Send>;

struct QueueState {
    pending: VecDeque<Thunk>,
    aborted: bool,
}

/// A receiver-owned queue of pending deferred event invocations.
///
/// Deferred operations land here at `defer` time and execute when the
/// owning receiver drives the queue, typically from its worker thread.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use contextwire::DispatchQueue;
///
/// let queue = Arc::new(DispatchQueue::new());
/// assert_eq!(queue.dispatch_all(), 0);
/// ```
pub struct DispatchQueue {
    state: Mutex<QueueState>,
    cond: Condvar,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                aborted: false,
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue one invocation. Returns `false` when the queue has been
    /// aborted, in which case the invocation is dropped.
    pub(crate) fn enqueue(&self, thunk: Thunk) -> bool {
        let mut st = self.lock();
        if st.aborted {
            return false;
        }
        st.pending.push_back(thunk);
        drop(st);
        self.cond.notify_one();
        true
    }

    /// Run every currently queued invocation on the calling thread.
    ///
    /// Invocations enqueued while draining are left for the next call, so a
    /// receiver that defers to itself cannot spin forever here.
    pub fn dispatch_all(&self) -> usize {
        let drained: Vec<Thunk> = {
            let mut st = self.lock();
            st.pending.drain(..).collect()
        };
        let count = drained.len();
        for thunk in drained {
            thunk();
        }
        count
    }

    /// Block until one invocation is available, then run it.
    ///
    /// Returns `false` when the queue is aborted while waiting.
    pub fn dispatch_event(&self) -> bool {
        let mut st = self.lock();
        loop {
            if let Some(thunk) = st.pending.pop_front() {
                drop(st);
                thunk();
                return true;
            }
            if st.aborted {
                return false;
            }
            st = self
                .cond
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Drop all pending invocations and wake any blocked dispatcher.
    pub fn abort(&self) {
        let mut st = self.lock();
        st.aborted = true;
        st.pending.clear();
        drop(st);
        self.cond.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}
