//! `domtape-wire` defines the binary patch protocol the
//! [domtape](https://github.com/mhvelplund/domtape) interpreter replays: a
//! self-describing byte stream of tree-edit opcodes plus a side-channel blob
//! of UTF-8 string data.
//!
//! One [`Batch`] is one invocation's worth of instructions. The opcode
//! stream is read strictly forward by a [`BatchReader`] (the only rewind is
//! the one-byte pushback that implements the unknown-opcode soft stop), and
//! string operands are sliced out of the blob by a [`StringTable`] in the
//! exact order they were encoded. All multi-byte integers are
//! little-endian; node identifiers use a configurable byte width
//! ([`IdWidth`]) that a batch can change mid-stream.
//!
//! ## Examples
//!
//! ```
//! use domtape_wire::{BatchReader, IdWidth, Opcode, TapeWriter};
//!
//! let mut tape = TapeWriter::new();
//! tape.op(Opcode::SetLastNode).id(7).op(Opcode::Stop);
//!
//! let batch = tape.batch();
//! let mut reader = BatchReader::new(batch.ops);
//! assert_eq!(Opcode::from_byte(reader.read_u8().unwrap()), Some(Opcode::SetLastNode));
//! assert_eq!(reader.read_id().unwrap(), 7);
//! ```
mod batch;
mod error;
mod opcode;
mod reader;
mod strings;
mod writer;

pub use batch::{Batch, BatchHeader};
pub use error::WireError;
pub use opcode::Opcode;
pub use reader::{BatchReader, IdWidth};
pub use strings::StringTable;
pub use writer::TapeWriter;
