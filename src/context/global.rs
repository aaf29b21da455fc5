//! The process-wide root context.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::context::Context;
use crate::events::JunctionBoxManager;
use crate::key::key_of;

/// Sigil of the process-wide root context.
pub struct GlobalSigil;

static GLOBAL_CONTEXT: OnceCell<Context> = OnceCell::new();

/// The process-wide root context, constructed lazily and torn down last.
///
/// The global context is initiated at construction so that diagnostic
/// receivers registered on it, notably
/// [`AutowiringEvents`](crate::AutowiringEvents) listeners, dispatch
/// without an explicit initiation step nobody owns.
pub fn global_context() -> Context {
    GLOBAL_CONTEXT
        .get_or_init(|| {
            let root = Context::new_node(
                None,
                key_of::<GlobalSigil>(),
                Arc::new(JunctionBoxManager::new()),
            );
            root.initiate();
            root
        })
        .clone()
}
