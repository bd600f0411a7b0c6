use domtape_tree::{Document, NodeRef, TreeError};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy)]
struct PendingParent {
    parent: NodeRef,
    remaining: u32,
}

/// Tracks in-progress multi-child creations: "create element with N
/// children" pushes an entry here, and the next N created nodes attach to
/// it without an explicit append instruction per child.
///
/// Invariant: a live entry always has `remaining > 0`; it is popped exactly
/// when the count reaches zero.
#[derive(Debug, Default)]
pub(crate) struct BatchStack {
    entries: SmallVec<[PendingParent; 8]>,
}

impl BatchStack {
    pub fn push(&mut self, parent: NodeRef, remaining: u32) {
        debug_assert!(remaining > 0);
        self.entries.push(PendingParent { parent, remaining });
    }

    /// Called after every node creation: attaches `node` under the pending
    /// parent, if any, and retires the entry once its count is exhausted.
    pub fn note_created(&mut self, document: &mut Document, node: NodeRef) -> Result<(), TreeError> {
        let Some(top) = self.entries.last_mut() else {
            return Ok(());
        };
        let parent = top.parent;
        top.remaining -= 1;
        if top.remaining == 0 {
            self.entries.pop();
        }
        document.append_child(parent, node)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
