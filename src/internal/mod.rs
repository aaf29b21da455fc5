//! Internal support machinery, not part of the public contract.

mod view;

pub(crate) use view::{erase_view, object_id_of, view_as};
