//! The per-thread current-context slot.

use std::cell::RefCell;

use crate::context::{global_context, Context, ContextInner};

thread_local! {
    // A strong handle: holding a context current keeps it alive. Threads
    // must not hold the global context here explicitly; the fallback in
    // `Context::current` covers that case without pinning teardown order.
    static CURRENT_CONTEXT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

impl Context {
    /// The thread's current context, or the process global context when
    /// none has been made current.
    pub fn current() -> Context {
        let existing = CURRENT_CONTEXT.with(|slot| slot.borrow().clone());
        existing.unwrap_or_else(global_context)
    }

    /// Make this context current for the calling thread.
    ///
    /// Returns the previous occupant, which may be `None`. Prefer
    /// [`Context::make_current`] when the previous value should be restored
    /// on scope exit.
    pub fn set_current(&self) -> Option<Context> {
        CURRENT_CONTEXT.with(|slot| slot.replace(Some(self.clone())))
    }

    /// Clear the calling thread's current-context slot.
    pub fn evict_current() {
        let _previous = CURRENT_CONTEXT.with(|slot| slot.replace(None));
    }

    /// Make this context current, restoring the previous occupant when the
    /// returned guard drops.
    ///
    /// ```rust
    /// use contextwire::Context;
    ///
    /// let root = Context::new_root();
    /// let child = root.create_anonymous();
    /// {
    ///     let _guard = child.make_current();
    ///     assert_eq!(Context::current(), child);
    /// }
    /// assert_ne!(Context::current(), child);
    /// ```
    pub fn make_current(&self) -> CurrentContextGuard {
        CurrentContextGuard {
            previous: self.set_current(),
        }
    }
}

/// Restores the previously current context on drop.
pub struct CurrentContextGuard {
    previous: Option<Context>,
}

impl Drop for CurrentContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        // try_with: the slot may already be gone during thread teardown.
        let _evicted = CURRENT_CONTEXT.try_with(|slot| slot.replace(previous));
    }
}

/// A destructing node must not be the thread-current node.
pub(crate) fn assert_not_current(inner: *const ContextInner) {
    #[cfg(debug_assertions)]
    {
        let _ = CURRENT_CONTEXT.try_with(|slot| {
            if let Ok(slot) = slot.try_borrow() {
                if let Some(current) = slot.as_ref() {
                    debug_assert!(
                        !std::ptr::eq(std::sync::Arc::as_ptr(&current.inner), inner),
                        "a context must not be destroyed while it is the thread-current context"
                    );
                }
            }
        });
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = inner;
    }
}
