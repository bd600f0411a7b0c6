use domtape_tree::TreeError;
use domtape_wire::{Opcode, WireError};
use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// A fault that aborted a batch, an edit list or an event dispatch.
///
/// There is no rollback: edits applied before the faulting instruction
/// remain applied. The host decides whether to tear the tree down or keep
/// going from the surviving state.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("batch decode failed at byte {offset}")]
    #[diagnostic(
        code(domtape::vm::decode),
        help("the batch was aborted; edits applied before the fault remain applied")
    )]
    Decode {
        offset: usize,
        opcode: Option<Opcode>,
        #[source]
        source: WireError,
    },
    #[error("{opcode:?} failed at byte {offset}")]
    #[diagnostic(
        code(domtape::vm::apply),
        help("the batch was aborted; edits applied before the fault remain applied")
    )]
    Apply {
        offset: usize,
        opcode: Opcode,
        #[source]
        source: ApplyError,
    },
    #[error("edit {index} failed")]
    #[diagnostic(code(domtape::vm::edit))]
    Edit {
        index: usize,
        #[source]
        source: ApplyError,
    },
    #[error("event dispatch failed")]
    #[diagnostic(code(domtape::vm::event))]
    Event {
        #[source]
        source: ApplyError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("node id {0} was referenced before it was stored")]
    UnknownNodeId(u64),
    #[error("no current node: navigation moved past the edge of the tree")]
    VacantCursor,
    #[error("event listener registration requires an explicit node id")]
    ListenerWithoutId,
    #[error("no outstanding {scope} listener for \"{event}\"")]
    ListenerImbalance { event: SmolStr, scope: &'static str },
    #[error("identity marker {0:?} is not a valid node id")]
    MalformedMarker(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl ApplyError {
    pub(crate) fn imbalance(event: &str, bubbles: bool) -> Self {
        ApplyError::ListenerImbalance {
            event: event.into(),
            scope: if bubbles { "bubbling" } else { "local" },
        }
    }
}
