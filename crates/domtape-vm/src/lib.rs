//! `domtape-vm` is a patch-application virtual machine: it replays a
//! compact binary instruction stream of tree edits against a live
//! [`Document`](domtape_tree::Document), while keeping a stable mapping
//! from small integer ids to live nodes so a remote producer can address
//! the tree without holding references into it.
//!
//! The interpreter is explicitly owned and explicitly passed; its state
//! (node table, cursor, batching stack, listener registry) lives as long
//! as the hosting session and survives across batches. Outbound traffic to
//! the host — the one-time `initialize` signal, `user_event` deliveries,
//! `browser_open` redirects — goes through a fire-and-forget
//! [`IpcSender`].
//!
//! ## Examples
//!
//! ```
//! use domtape_vm::{Halt, Interpreter, IpcSender};
//! use domtape_wire::{Opcode, TapeWriter};
//!
//! let (ipc, _events) = IpcSender::channel();
//! let mut vm = Interpreter::new(ipc);
//!
//! // one element with one text child, appended under the root (id 0)
//! let mut tape = TapeWriter::new();
//! tape.op(Opcode::CreateElement)
//!     .maybe_id(Some(1))
//!     .string("p")
//!     .flag(false)
//!     .u32(1)
//!     .op(Opcode::CreateTextNode)
//!     .maybe_id(None)
//!     .string("hello")
//!     .op(Opcode::AppendChildren)
//!     .maybe_id(Some(0))
//!     .u32(1)
//!     .id(1)
//!     .op(Opcode::Stop);
//!
//! assert_eq!(vm.run(&tape.batch()).unwrap(), Halt::Stopped);
//!
//! let doc = vm.document();
//! let paragraph = vm.node(1).unwrap();
//! assert_eq!(doc.parent(paragraph).unwrap(), Some(doc.root()));
//! ```
mod attributes;
mod edits;
mod error;
mod events;
mod interpreter;
mod ipc;
mod listeners;
mod stack;
mod table;

pub use edits::Edit;
pub use error::{ApplyError, Error};
pub use events::{DomEvent, EventOutcome, event_bubbles};
pub use interpreter::{Halt, Interpreter, Options};
pub use ipc::{IpcMessage, IpcSender};

pub use domtape_tree::{Document, NodeRef};
pub use domtape_wire::{Batch, BatchHeader, IdWidth};
