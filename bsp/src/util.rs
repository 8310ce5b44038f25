use std::convert::TryFrom;

/// Decodes a node's `front`/`back` field: negative values mark leaves,
/// anything else is an index into the node array.
pub fn node_child(id: i32) -> Option<usize> {
    usize::try_from(id).ok()
}
