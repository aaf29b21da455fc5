//! Context-creation listeners.

use crate::context::Context;
use crate::key::Key;

/// A listener fired when a child context with a matching sigil is created.
///
/// A bolt installed in a context hears about every matching child created at
/// that context or anywhere beneath it. Declaring no sigils at all means
/// "every creation"; a bolt that declares both a named sigil and the
/// anonymous sigil is still invoked exactly once per creation.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use contextwire::{key_of, Bolt, Context, CoreObject, Key, MemberTraits};
///
/// struct PipelineSigil;
///
/// #[derive(Default)]
/// struct PipelineWatcher {
///     created: AtomicUsize,
/// }
///
/// impl Bolt for PipelineWatcher {
///     fn context_sigils(&self) -> Vec<Key> {
///         vec![key_of::<PipelineSigil>()]
///     }
///
///     fn context_created(&self, _child: &Context) {
///         self.created.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// impl CoreObject for PipelineWatcher {
///     fn member_traits(this: &Arc<Self>) -> MemberTraits {
///         MemberTraits::new(this.clone()).bolt(this.clone())
///     }
/// }
///
/// let root = Context::new_root();
/// let watcher = root.add(PipelineWatcher::default()).unwrap();
///
/// let _pipeline = root.create::<PipelineSigil>();
/// let _other = root.create_anonymous();
///
/// assert_eq!(watcher.created.load(Ordering::SeqCst), 1);
/// ```
pub trait Bolt: Send + Sync {
    /// Sigils this bolt listens for. An empty list means every creation.
    fn context_sigils(&self) -> Vec<Key>;

    /// Invoked when a matching child context appears.
    fn context_created(&self, child: &Context);
}
