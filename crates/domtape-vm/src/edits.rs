use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// JSON-shaped form of the patch stream, for hosts that drive the
/// interpreter over a structured transport instead of the binary tape.
///
/// `root` is the maybe-present target operand: `None` means "the current
/// node", the same implicit-operand rule the binary encoding uses.
/// Listener bubbling on this path comes from
/// [`event_bubbles`](crate::event_bubbles) since no wire flag exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Edit {
    AppendChildren {
        #[serde(default)]
        root: Option<u64>,
        children: Vec<u64>,
    },
    ReplaceWith {
        #[serde(default)]
        root: Option<u64>,
        nodes: Vec<u64>,
    },
    InsertAfter {
        #[serde(default)]
        root: Option<u64>,
        nodes: Vec<u64>,
    },
    InsertBefore {
        #[serde(default)]
        root: Option<u64>,
        nodes: Vec<u64>,
    },
    Remove {
        #[serde(default)]
        root: Option<u64>,
    },
    CreateTextNode {
        #[serde(default)]
        root: Option<u64>,
        text: String,
    },
    CreateElement {
        #[serde(default)]
        root: Option<u64>,
        tag: SmolStr,
        #[serde(default)]
        children: u32,
    },
    CreateElementNs {
        #[serde(default)]
        root: Option<u64>,
        tag: SmolStr,
        ns: SmolStr,
        #[serde(default)]
        children: u32,
    },
    CreatePlaceholder {
        #[serde(default)]
        root: Option<u64>,
    },
    NewEventListener {
        root: u64,
        event_name: SmolStr,
    },
    RemoveEventListener {
        #[serde(default)]
        root: Option<u64>,
        event_name: SmolStr,
    },
    SetText {
        #[serde(default)]
        root: Option<u64>,
        text: String,
    },
    SetAttribute {
        #[serde(default)]
        root: Option<u64>,
        field: SmolStr,
        value: String,
        #[serde(default)]
        ns: Option<SmolStr>,
    },
    RemoveAttribute {
        #[serde(default)]
        root: Option<u64>,
        name: SmolStr,
        #[serde(default)]
        ns: Option<SmolStr>,
    },
    CloneNode {
        #[serde(default)]
        id: Option<u64>,
        #[serde(default)]
        new_id: Option<u64>,
    },
    CloneNodeChildren {
        #[serde(default)]
        id: Option<u64>,
        new_ids: Vec<u64>,
    },
    FirstChild,
    NextSibling,
    ParentNode,
    StoreWithId {
        id: u64,
    },
    SetLastNode {
        id: u64,
    },
}
