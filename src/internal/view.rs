//! Type-erased member views.
//!
//! Every memo value and capability view is stored as an `AnyArc` holding an
//! `Arc<Arc<T>>`. Boxing the handle one level deep lets sized types and
//! `dyn Trait` object types share a single storage and recovery scheme: an
//! `Arc<dyn Trait>` is itself a sized value, so it can ride inside `dyn Any`
//! where the trait object could not.

use std::sync::Arc;

use crate::member::{AnyArc, ObjectId};

/// Erase a typed view for memo storage.
pub(crate) fn erase_view<T: ?Sized + Send + Sync + 'static>(view: &Arc<T>) -> AnyArc {
    Arc::new(view.clone())
}

/// Recover a typed view from memo storage.
///
/// Returns `None` when the stored view was erased under a different type,
/// which indicates a key/view mismatch upstream.
pub(crate) fn view_as<T: ?Sized + Send + Sync + 'static>(view: &AnyArc) -> Option<Arc<T>> {
    view.clone()
        .downcast::<Arc<T>>()
        .ok()
        .map(|boxed| (*boxed).clone())
}

/// Identity of the allocation behind a handle.
///
/// Capability views of one member are coerced from the same `Arc`, so their
/// data pointers agree even when the fat-pointer metadata differs.
pub(crate) fn object_id_of<T: ?Sized>(object: &Arc<T>) -> ObjectId {
    ObjectId(Arc::as_ptr(object) as *const () as usize)
}
