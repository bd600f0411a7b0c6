use domtape_tree::{AttrKey, Document, NodeRef};
use domtape_wire::{Batch, BatchReader, IdWidth, Opcode, StringTable, WireError};
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{
    attributes,
    edits::Edit,
    error::{ApplyError, Error},
    events::{self, DispatchContext, DomEvent, EventOutcome, event_bubbles},
    ipc::{IpcMessage, IpcSender},
    listeners::ListenerRegistry,
    stack::BatchStack,
    table::NodeTable,
};

/// Interpreter configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Identifier byte width batches start with; a batch can change it with
    /// the dedicated instruction, and the change persists across batches.
    pub id_width: IdWidth,
    /// Attribute carrying a node's table id, readable during dispatch.
    pub marker_attribute: SmolStr,
    /// Attribute naming the event whose platform default the host should
    /// suppress, as `on<event>`.
    pub prevent_default_attribute: SmolStr,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            id_width: IdWidth::ONE,
            marker_attribute: "data-domtape-id".into(),
            prevent_default_attribute: "domtape-prevent-default".into(),
        }
    }
}

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The explicit stop instruction.
    Stopped,
    /// An unrecognized opcode byte: the cursor was rewound one byte and
    /// control handed back without error.
    SoftStopped,
}

/// The patch-application virtual machine.
///
/// Owns the live [`Document`] plus all per-session state: the id → node
/// table, the "last node" cursor, the batching stack and the listener
/// registry. One instance is explicitly owned and passed by the hosting
/// layer; state survives across [`Interpreter::run`] calls until
/// [`Interpreter::reset`].
#[derive(Debug)]
pub struct Interpreter {
    document: Document,
    table: NodeTable,
    cursor: Option<NodeRef>,
    stack: BatchStack,
    listeners: ListenerRegistry,
    ipc: IpcSender,
    id_width: IdWidth,
    options: Options,
}

enum StepError {
    Decode(WireError),
    Apply(ApplyError),
}

impl StepError {
    fn into_error(self, offset: usize, opcode: Opcode) -> Error {
        match self {
            StepError::Decode(source) => Error::Decode {
                offset,
                opcode: Some(opcode),
                source,
            },
            StepError::Apply(source) => Error::Apply {
                offset,
                opcode,
                source,
            },
        }
    }
}

impl From<WireError> for StepError {
    fn from(source: WireError) -> Self {
        StepError::Decode(source)
    }
}

impl From<ApplyError> for StepError {
    fn from(source: ApplyError) -> Self {
        StepError::Apply(source)
    }
}

impl From<domtape_tree::TreeError> for StepError {
    fn from(source: domtape_tree::TreeError) -> Self {
        StepError::Apply(source.into())
    }
}

impl Interpreter {
    /// Stands up an interpreter against a fresh document and posts the
    /// one-time `initialize` signal. Id 0 maps to the root.
    pub fn new(ipc: IpcSender) -> Self {
        Self::with_options(ipc, Options::default())
    }

    pub fn with_options(ipc: IpcSender, options: Options) -> Self {
        let document = Document::new();
        let mut table = NodeTable::default();
        table.store(0, document.root());
        let interpreter = Self {
            cursor: Some(document.root()),
            document,
            table,
            stack: BatchStack::default(),
            listeners: ListenerRegistry::default(),
            ipc,
            id_width: options.id_width,
            options,
        };
        interpreter.ipc.post(IpcMessage::initialize());
        interpreter
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The node the cursor currently points at, if navigation has not
    /// walked off a tree edge.
    pub fn cursor(&self) -> Option<NodeRef> {
        self.cursor
    }

    /// Looks up a producer id without failing; hosts use this to resolve
    /// event targets and for diagnostics.
    pub fn node(&self, id: u64) -> Option<NodeRef> {
        self.table.lookup(id)
    }

    /// Outstanding logical registrations for a bubbling event name.
    pub fn bubbling_listeners(&self, event: &str) -> u32 {
        self.listeners.active_count(event).unwrap_or(0)
    }

    /// Drops all session state and starts over on a fresh document,
    /// posting `initialize` again.
    pub fn reset(&mut self) {
        let ipc = self.ipc.clone();
        let options = self.options.clone();
        *self = Self::with_options(ipc, options);
    }

    /// Replays one batch to completion, an explicit stop, or a soft stop.
    ///
    /// A decode or apply fault aborts the batch; whatever was applied
    /// before the fault stays applied.
    pub fn run(&mut self, batch: &Batch<'_>) -> Result<Halt, Error> {
        let mut ops = BatchReader::new(batch.ops).with_id_width(self.id_width);
        let mut strings = StringTable::new(batch.strings);
        let result = self.run_loop(&mut ops, &mut strings);
        self.id_width = ops.id_width();
        match &result {
            Ok(halt) => {
                tracing::debug!("batch applied, {} byte(s) consumed ({:?})", ops.offset(), halt)
            }
            Err(error) => tracing::error!("batch aborted: {}", error),
        }
        result
    }

    fn run_loop(
        &mut self,
        ops: &mut BatchReader<'_>,
        strings: &mut StringTable<'_>,
    ) -> Result<Halt, Error> {
        loop {
            let at = ops.offset();
            let byte = ops.read_u8().map_err(|source| Error::Decode {
                offset: at,
                opcode: None,
                source,
            })?;
            let Some(opcode) = Opcode::from_byte(byte) else {
                ops.rewind();
                tracing::debug!("soft stop on unknown opcode {:#04x} at byte {}", byte, at);
                return Ok(Halt::SoftStopped);
            };
            if opcode == Opcode::Stop {
                return Ok(Halt::Stopped);
            }
            self.step(opcode, ops, strings)
                .map_err(|step| step.into_error(at, opcode))?;
        }
    }

    fn step(
        &mut self,
        opcode: Opcode,
        ops: &mut BatchReader<'_>,
        strings: &mut StringTable<'_>,
    ) -> Result<(), StepError> {
        match opcode {
            Opcode::AppendChildren => {
                let target = self.read_target(ops)?;
                let nodes = self.read_node_list(ops)?;
                self.append_children(target, &nodes)?;
            }
            Opcode::ReplaceWith => {
                let target = self.read_target(ops)?;
                let nodes = self.read_node_list(ops)?;
                self.document.replace_with(target, &nodes)?;
            }
            Opcode::InsertAfter => {
                let target = self.read_target(ops)?;
                let nodes = self.read_node_list(ops)?;
                self.document.insert_after(target, &nodes)?;
            }
            Opcode::InsertBefore => {
                let target = self.read_target(ops)?;
                let nodes = self.read_node_list(ops)?;
                self.document.insert_before(target, &nodes)?;
            }
            Opcode::Remove => {
                let target = self.read_target(ops)?;
                self.document.remove(target)?;
            }
            Opcode::CreateTextNode => {
                let id = ops.read_maybe_id()?;
                let text = read_string(ops, strings)?;
                self.create_text_node(id, text)?;
            }
            Opcode::CreateElement => {
                let id = ops.read_maybe_id()?;
                let tag = read_string(ops, strings)?;
                let namespace = if ops.read_u8()? == 1 {
                    Some(read_string(ops, strings)?)
                } else {
                    None
                };
                let declared_children = ops.read_u32()?;
                self.create_element(id, tag, namespace, declared_children)?;
            }
            Opcode::CreatePlaceholder => {
                let id = ops.read_maybe_id()?;
                self.create_placeholder(id)?;
            }
            Opcode::NewEventListener => {
                let id = ops.read_maybe_id()?.ok_or(ApplyError::ListenerWithoutId)?;
                let event = read_string(ops, strings)?;
                let bubbles = ops.read_u8()? == 1;
                self.new_listener(id, event, bubbles)?;
            }
            Opcode::RemoveEventListener => {
                let target = self.read_target(ops)?;
                let event = read_string(ops, strings)?;
                let bubbles = ops.read_u8()? == 1;
                self.remove_listener(target, event, bubbles)?;
            }
            Opcode::SetText => {
                let target = self.read_target(ops)?;
                let text = read_string(ops, strings)?;
                self.document.set_text(target, text)?;
            }
            Opcode::SetAttribute => {
                let target = self.read_target(ops)?;
                let name = read_string(ops, strings)?;
                let namespace = if ops.read_u8()? == 1 {
                    Some(read_string(ops, strings)?)
                } else {
                    None
                };
                let value = read_string(ops, strings)?;
                attributes::set_attribute(&mut self.document, target, name, namespace, value)?;
            }
            Opcode::RemoveAttribute => {
                let target = self.read_target(ops)?;
                let name = read_string(ops, strings)?;
                let namespace = if ops.read_u8()? == 1 {
                    Some(read_string(ops, strings)?)
                } else {
                    None
                };
                attributes::remove_attribute(&mut self.document, target, name, namespace)?;
            }
            Opcode::CloneNode => {
                let source = self.read_target(ops)?;
                let new_id = ops.read_maybe_id()?;
                self.clone_node(source, new_id)?;
            }
            Opcode::CloneNodeChildren => {
                let source = self.read_target(ops)?;
                for child in self.clone_children(source)? {
                    if let Some(id) = ops.read_maybe_id()? {
                        self.table.store(id, child);
                    }
                }
            }
            Opcode::FirstChild => self.nav_first_child()?,
            Opcode::NextSibling => self.nav_next_sibling()?,
            Opcode::ParentNode => self.nav_parent()?,
            Opcode::StoreWithId => {
                let id = ops.read_id()?;
                self.table.store(id, self.current()?);
            }
            Opcode::SetLastNode => {
                let id = ops.read_id()?;
                self.cursor = Some(self.table.get(id)?);
            }
            Opcode::SetIdSize => {
                let width = IdWidth::new(ops.read_u8()?)?;
                ops.set_id_width(width);
            }
            // handled by the loop
            Opcode::Stop => {}
        }
        Ok(())
    }

    /// Applies a JSON-shaped edit list through the same machinery the
    /// binary loop drives.
    pub fn apply_edits(&mut self, edits: &[Edit]) -> Result<(), Error> {
        for (index, edit) in edits.iter().enumerate() {
            self.apply_edit(edit)
                .map_err(|source| Error::Edit { index, source })?;
        }
        Ok(())
    }

    fn apply_edit(&mut self, edit: &Edit) -> Result<(), ApplyError> {
        match edit {
            Edit::AppendChildren { root, children } => {
                let target = self.target_from(*root)?;
                let nodes = self.lookup_all(children)?;
                self.append_children(target, &nodes)?;
            }
            Edit::ReplaceWith { root, nodes } => {
                let target = self.target_from(*root)?;
                let nodes = self.lookup_all(nodes)?;
                self.document.replace_with(target, &nodes)?;
            }
            Edit::InsertAfter { root, nodes } => {
                let target = self.target_from(*root)?;
                let nodes = self.lookup_all(nodes)?;
                self.document.insert_after(target, &nodes)?;
            }
            Edit::InsertBefore { root, nodes } => {
                let target = self.target_from(*root)?;
                let nodes = self.lookup_all(nodes)?;
                self.document.insert_before(target, &nodes)?;
            }
            Edit::Remove { root } => {
                let target = self.target_from(*root)?;
                self.document.remove(target)?;
            }
            Edit::CreateTextNode { root, text } => self.create_text_node(*root, text)?,
            Edit::CreateElement {
                root,
                tag,
                children,
            } => self.create_element(*root, tag, None, *children)?,
            Edit::CreateElementNs {
                root,
                tag,
                ns,
                children,
            } => self.create_element(*root, tag, Some(ns), *children)?,
            Edit::CreatePlaceholder { root } => self.create_placeholder(*root)?,
            Edit::NewEventListener { root, event_name } => {
                self.new_listener(*root, event_name, event_bubbles(event_name))?;
            }
            Edit::RemoveEventListener { root, event_name } => {
                let target = self.target_from(*root)?;
                self.remove_listener(target, event_name, event_bubbles(event_name))?;
            }
            Edit::SetText { root, text } => {
                let target = self.target_from(*root)?;
                self.document.set_text(target, text)?;
            }
            Edit::SetAttribute {
                root,
                field,
                value,
                ns,
            } => {
                let target = self.target_from(*root)?;
                attributes::set_attribute(&mut self.document, target, field, ns.as_deref(), value)?;
            }
            Edit::RemoveAttribute { root, name, ns } => {
                let target = self.target_from(*root)?;
                attributes::remove_attribute(&mut self.document, target, name, ns.as_deref())?;
            }
            Edit::CloneNode { id, new_id } => {
                let source = self.target_from(*id)?;
                self.clone_node(source, *new_id)?;
            }
            Edit::CloneNodeChildren { id, new_ids } => {
                let source = self.target_from(*id)?;
                for (child, &id) in self.clone_children(source)?.into_iter().zip(new_ids) {
                    self.table.store(id, child);
                }
            }
            Edit::FirstChild => self.nav_first_child()?,
            Edit::NextSibling => self.nav_next_sibling()?,
            Edit::ParentNode => self.nav_parent()?,
            Edit::StoreWithId { id } => {
                self.table.store(*id, self.current()?);
            }
            Edit::SetLastNode { id } => {
                self.cursor = Some(self.table.get(*id)?);
            }
        }
        Ok(())
    }

    /// Routes a host-dispatched input event to its logical node id and
    /// posts the outbound envelope. Takes `&self`: handlers cannot re-enter
    /// the VM loop.
    pub fn handle_event(&self, event: &DomEvent) -> Result<EventOutcome, Error> {
        let ctx = DispatchContext {
            document: &self.document,
            options: &self.options,
            ipc: &self.ipc,
        };
        events::dispatch(&ctx, event).map_err(|source| Error::Event { source })
    }

    fn current(&self) -> Result<NodeRef, ApplyError> {
        self.cursor.ok_or(ApplyError::VacantCursor)
    }

    /// Operand resolution: an explicit id must be live in the table; an
    /// absent id means "whatever we just built or navigated to".
    fn target_from(&self, id: Option<u64>) -> Result<NodeRef, ApplyError> {
        match id {
            Some(id) => self.table.get(id),
            None => self.current(),
        }
    }

    fn read_target(&self, ops: &mut BatchReader<'_>) -> Result<NodeRef, StepError> {
        Ok(self.target_from(ops.read_maybe_id()?)?)
    }

    fn read_node_list(
        &self,
        ops: &mut BatchReader<'_>,
    ) -> Result<SmallVec<[NodeRef; 8]>, StepError> {
        let len = ops.read_u32()?;
        let mut nodes = SmallVec::new();
        for _ in 0..len {
            nodes.push(self.table.get(ops.read_id()?)?);
        }
        Ok(nodes)
    }

    fn lookup_all(&self, ids: &[u64]) -> Result<SmallVec<[NodeRef; 8]>, ApplyError> {
        ids.iter().map(|&id| self.table.get(id)).collect()
    }

    fn append_children(&mut self, target: NodeRef, nodes: &[NodeRef]) -> Result<(), ApplyError> {
        for &node in nodes {
            self.document.append_child(target, node)?;
        }
        Ok(())
    }

    fn create_text_node(&mut self, id: Option<u64>, text: &str) -> Result<(), ApplyError> {
        let node = self.document.create_text(text);
        self.finish_created(node, id)
    }

    fn create_element(
        &mut self,
        id: Option<u64>,
        tag: &str,
        namespace: Option<&str>,
        declared_children: u32,
    ) -> Result<(), ApplyError> {
        let node = match namespace {
            Some(ns) => self.document.create_element_ns(tag, ns),
            None => self.document.create_element(tag),
        };
        self.finish_created(node, id)?;
        if declared_children > 0 {
            self.stack.push(node, declared_children);
        }
        Ok(())
    }

    fn create_placeholder(&mut self, id: Option<u64>) -> Result<(), ApplyError> {
        let node = self.document.create_placeholder();
        self.finish_created(node, id)
    }

    /// Shared tail of every node-creating operation: move the cursor, let
    /// the batch stack attach the node to a pending parent, store the id.
    fn finish_created(&mut self, node: NodeRef, id: Option<u64>) -> Result<(), ApplyError> {
        self.cursor = Some(node);
        self.stack.note_created(&mut self.document, node)?;
        if let Some(id) = id {
            self.table.store(id, node);
        }
        Ok(())
    }

    fn new_listener(&mut self, id: u64, event: &str, bubbles: bool) -> Result<(), ApplyError> {
        let node = self.table.get(id)?;
        self.document.element_mut(node)?.set_attribute(
            AttrKey::new(self.options.marker_attribute.clone()),
            id.to_string(),
        );
        let root = self.document.root();
        self.listeners
            .create(&mut self.document, root, node, id, event, bubbles)
    }

    fn remove_listener(
        &mut self,
        target: NodeRef,
        event: &str,
        bubbles: bool,
    ) -> Result<(), ApplyError> {
        let marker_key = AttrKey::new(self.options.marker_attribute.clone());
        let node_id = self
            .document
            .element(target)?
            .attribute(&marker_key)
            .map(|marker| {
                marker
                    .parse::<u64>()
                    .map_err(|_| ApplyError::MalformedMarker(marker.to_string()))
            })
            .transpose()?;
        self.document.element_mut(target)?.remove_attribute(&marker_key);
        let root = self.document.root();
        self.listeners
            .remove(&mut self.document, root, target, node_id, event, bubbles)
    }

    fn clone_node(&mut self, source: NodeRef, new_id: Option<u64>) -> Result<(), ApplyError> {
        let clone = self.document.clone_node(source)?;
        self.cursor = Some(clone);
        if let Some(id) = new_id {
            self.table.store(id, clone);
        }
        Ok(())
    }

    fn clone_children(&mut self, source: NodeRef) -> Result<Vec<NodeRef>, ApplyError> {
        let clone = self.document.clone_node(source)?;
        Ok(self.document.children(clone)?.to_vec())
    }

    fn nav_first_child(&mut self) -> Result<(), ApplyError> {
        self.cursor = self.document.first_child(self.current()?)?;
        Ok(())
    }

    fn nav_next_sibling(&mut self) -> Result<(), ApplyError> {
        self.cursor = self.document.next_sibling(self.current()?)?;
        Ok(())
    }

    fn nav_parent(&mut self) -> Result<(), ApplyError> {
        self.cursor = self.document.parent(self.current()?)?;
        Ok(())
    }
}

fn read_string<'a>(
    ops: &mut BatchReader<'_>,
    strings: &mut StringTable<'a>,
) -> Result<&'a str, WireError> {
    let len = ops.read_u16()? as usize;
    strings.next_str(len)
}
