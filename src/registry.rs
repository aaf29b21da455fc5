//! Per-context type memos and deferred-chain resolution.

use std::collections::HashMap;
use std::sync::Arc;

use crate::deferred::{AutowiringStrategy, DeferrableAutowiring};
use crate::key::Key;
use crate::member::{AnyArc, ObjectId};

/// A satisfying value recorded in a memo.
pub(crate) struct MemoValue {
    /// Type-erased view recoverable under the memo's key.
    pub view: AnyArc,
    /// Identity of the member behind the view.
    pub object: ObjectId,
    /// Whether the member belongs to this context, as opposed to a value
    /// cached from an ancestor during downward deferral resolution. Only
    /// local values participate in duplicate and ambiguity detection.
    pub local: bool,
}

/// The per-type entry: current value plus the deferred-chain head.
#[derive(Default)]
pub(crate) struct Memo {
    pub value: Option<MemoValue>,
    pub first: Option<Arc<dyn DeferrableAutowiring>>,
}

/// Maps autowiring identities to their memos within one context.
#[derive(Default)]
pub(crate) struct TypeRegistry {
    memos: HashMap<Key, Memo>,
}

impl TypeRegistry {
    pub fn get(&self, key: &Key) -> Option<&Memo> {
        self.memos.get(key)
    }

    /// Existing memo only; downward deferral updates never create memos.
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Memo> {
        self.memos.get_mut(key)
    }

    /// Memo for `key`, created empty on first reference.
    pub fn memo_mut(&mut self, key: Key) -> &mut Memo {
        self.memos.entry(key).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Memo)> {
        self.memos.iter()
    }

    /// Remove `field` from its chain by link elision. Linear scan; the
    /// chain is short and cancellation is rare.
    pub fn unlink(&mut self, field: &Arc<dyn DeferrableAutowiring>) -> bool {
        let Some(memo) = self.memos.get_mut(&field.key()) else {
            return false;
        };
        let Some(head) = memo.first.clone() else {
            return false;
        };
        if same_field(&head, field) {
            memo.first = field.flink();
            field.set_flink(None);
            return true;
        }
        let mut prior = head;
        while let Some(cur) = prior.flink() {
            if same_field(&cur, field) {
                prior.set_flink(field.flink());
                field.set_flink(None);
                return true;
            }
            prior = cur;
        }
        false
    }
}

/// Identity comparison for chain entries, by allocation address.
pub(crate) fn same_field(
    a: &Arc<dyn DeferrableAutowiring>,
    b: &Arc<dyn DeferrableAutowiring>,
) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Satisfy every field reachable from a detached chain head.
///
/// Walks the chain depth-first with an explicit stack so that dependent
/// chains released by satisfied fields are processed in the same pass.
/// Fields whose strategy demands finalization are collected into
/// `satisfied`; the caller runs those outside any lock. The chain is owned
/// exclusively by the caller once detached from its memo, so in-lock
/// traversal is safe.
pub(crate) fn satisfy_chain(
    head: Arc<dyn DeferrableAutowiring>,
    view: &AnyArc,
    satisfied: &mut Vec<(Arc<dyn AutowiringStrategy>, Arc<dyn DeferrableAutowiring>)>,
) {
    let mut stack = vec![head];
    while let Some(top) = stack.pop() {
        let mut cur = Some(top);
        while let Some(field) = cur {
            if !field.satisfy(view) {
                tracing::warn!(
                    sought = field.key().display_name(),
                    "deferred field rejected a view recorded under its own key"
                );
            }
            if let Some(dependent) = field.release_dependent_chain() {
                stack.push(dependent);
            }
            if let Some(strategy) = field.strategy() {
                satisfied.push((strategy, field.clone()));
            }
            let next = field.flink();
            field.set_flink(None);
            cur = next;
        }
    }
}
