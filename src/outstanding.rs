//! Outstanding-work counting for context subtrees.

use std::sync::Arc;

use crate::context::Context;

/// Shared token whose live count equals the number of active runnables in a
/// context's subtree.
///
/// A context creates its token lazily on initiation and hands a handle to
/// every runnable it starts; the runnable holds the handle until its work
/// has fully retired. Creating a token also acquires the parent's token, so
/// an ancestor's count stays non-zero while any descendant runnable is
/// alive. This is what makes [`Context::wait`] observe the whole subtree.
///
/// Dropping the last handle wakes every thread blocked on the owning
/// context's state condition.
#[derive(Clone)]
pub struct Outstanding {
    /// RAII hold on the token; dropping the last handle retires the count.
    _token: Arc<OutstandingToken>,
}

impl Outstanding {
    pub(crate) fn from_token(token: Arc<OutstandingToken>) -> Self {
        Self { _token: token }
    }
}

impl std::fmt::Debug for Outstanding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outstanding").finish_non_exhaustive()
    }
}

pub(crate) struct OutstandingToken {
    /// Keeps the context alive while any of its runnables are still working.
    context: Context,
    /// Holds the parent's count captive until this subtree retires.
    _parent: Option<Outstanding>,
}

impl OutstandingToken {
    pub(crate) fn new(context: Context, parent: Option<Outstanding>) -> Self {
        Self {
            context,
            _parent: parent,
        }
    }
}

impl Drop for OutstandingToken {
    fn drop(&mut self) {
        self.context.on_outstanding_expired();
        // _parent drops afterwards, cascading the wake-up to ancestors.
    }
}
