use domtape_tree::NodeRef;
use rustc_hash::FxHashMap;

use crate::error::ApplyError;

/// Sparse mapping from producer-assigned integer ids to live nodes.
///
/// Ids are opaque here: they may arrive in any order and be overwritten in
/// place. Entries are never collected while the interpreter lives; the
/// producer owns the id space.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeTable {
    nodes: FxHashMap<u64, NodeRef>,
}

impl NodeTable {
    pub fn store(&mut self, id: u64, node: NodeRef) {
        self.nodes.insert(id, node);
    }

    /// Reading an id that was never stored is a dangling reference, a fatal
    /// condition rather than a default.
    pub fn get(&self, id: u64) -> Result<NodeRef, ApplyError> {
        self.nodes
            .get(&id)
            .copied()
            .ok_or(ApplyError::UnknownNodeId(id))
    }

    pub fn lookup(&self, id: u64) -> Option<NodeRef> {
        self.nodes.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domtape_tree::Document;

    #[test]
    fn test_sparse_store_and_overwrite() {
        let mut doc = Document::new();
        let first = doc.create_text("a");
        let second = doc.create_text("b");

        let mut table = NodeTable::default();
        table.store(1000, first);
        assert_eq!(table.get(1000), Ok(first));

        table.store(1000, second);
        assert_eq!(table.get(1000), Ok(second));
    }

    #[test]
    fn test_unknown_id_fails_loudly() {
        let table = NodeTable::default();
        assert_eq!(table.get(7), Err(ApplyError::UnknownNodeId(7)));
        assert_eq!(table.lookup(7), None);
    }
}
