//! `domtape-tree` is the in-memory UI document model driven by the
//! [domtape](https://github.com/mhvelplund/domtape) patch interpreter.
//!
//! The document is a tree of nodes over a closed set of kinds (elements,
//! text, hidden placeholders) stored in a slot map, so references held by a
//! caller stay cheap to copy and become detectably stale once a node is
//! dropped. It covers the capability surface a patch producer needs:
//! structural edits, attribute and style storage, element properties,
//! deep cloning, sibling/parent navigation and per-node event listener
//! bookkeeping.
//!
//! ## Examples
//!
//! ```
//! use domtape_tree::Document;
//!
//! let mut doc = Document::new();
//! let heading = doc.create_element("h1");
//! let text = doc.create_text("hello");
//! doc.append_child(heading, text).unwrap();
//! doc.append_child(doc.root(), heading).unwrap();
//!
//! assert_eq!(doc.first_child(doc.root()).unwrap(), Some(heading));
//! ```
mod document;
mod error;
mod node;

pub use document::{Document, NodeRef};
pub use error::TreeError;
pub use node::{AttrKey, Element, ElementProps, NodeKind, Text};
