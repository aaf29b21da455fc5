//! The deferrable autowiring contract.

use std::sync::Arc;

use crate::key::Key;
use crate::member::AnyArc;

/// A field waiting for a member of some type to appear.
///
/// Unsatisfied fields form per-type singly-linked chains hanging off the
/// memo of the context they were issued in. The forward link is only ever
/// mutated by the owning context while its lock is held, or by the resolver
/// after the chain has been detached from the memo; a detached chain is
/// owned exclusively by the resolving thread.
///
/// [`Autowired`](crate::Autowired) is the ready-made implementation; custom
/// implementations can participate in the same chains.
pub trait DeferrableAutowiring: Send + Sync {
    /// The autowiring identity this field seeks.
    fn key(&self) -> Key;

    /// Attempt assignment from a type-erased view of the satisfying member.
    ///
    /// Returns `false` when the view does not recover under this field's
    /// type, which indicates a key/view mismatch upstream.
    fn satisfy(&self, view: &AnyArc) -> bool;

    /// Forward link in the deferred chain.
    fn flink(&self) -> Option<Arc<dyn DeferrableAutowiring>>;

    /// Replace the forward link.
    fn set_flink(&self, next: Option<Arc<dyn DeferrableAutowiring>>);

    /// Hand over a chain of fields that became satisfiable because this one
    /// was satisfied. The resolver splices it onto its work stack.
    fn release_dependent_chain(&self) -> Option<Arc<dyn DeferrableAutowiring>> {
        None
    }

    /// The finalization strategy for this field, if it requires one.
    fn strategy(&self) -> Option<Arc<dyn AutowiringStrategy>> {
        None
    }
}

/// Finalization hook run after a field is satisfied or cancelled.
///
/// Invoked outside any context lock, exactly once per field per
/// satisfaction or cancellation, so it may freely re-enter context
/// operations.
pub trait AutowiringStrategy: Send + Sync {
    /// Finalize `field` after satisfaction or cancellation.
    fn finalize(&self, field: &Arc<dyn DeferrableAutowiring>);
}
