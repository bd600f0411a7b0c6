use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use smol_str::SmolStr;

use crate::{
    error::TreeError,
    node::{Element, NodeKind, Text},
};

slotmap::new_key_type! {
    /// A cheap, copyable reference to a node in a [`Document`]. Generational
    /// keys make references to dropped nodes detectable instead of aliasing
    /// a newer node.
    pub struct NodeRef;
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeRef>,
    children: Vec<NodeRef>,
    listeners: FxHashSet<SmolStr>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: FxHashSet::default(),
        }
    }
}

/// An in-memory UI document: the reference implementation of the host-tree
/// collaborator the patch interpreter drives. A browser-backed tree would
/// sit behind the same surface.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: SlotMap<NodeRef, NodeData>,
    root: NodeRef,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document whose root is a `main` element, the conventional
    /// mount point.
    pub fn new() -> Self {
        Self::with_root_tag("main")
    }

    pub fn with_root_tag(tag: impl Into<SmolStr>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(NodeKind::Element(Element::new(tag))));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn create_element(&mut self, tag: impl Into<SmolStr>) -> NodeRef {
        self.nodes
            .insert(NodeData::new(NodeKind::Element(Element::new(tag))))
    }

    pub fn create_element_ns(
        &mut self,
        tag: impl Into<SmolStr>,
        namespace: impl Into<SmolStr>,
    ) -> NodeRef {
        self.nodes.insert(NodeData::new(NodeKind::Element(
            Element::with_namespace(tag, namespace),
        )))
    }

    pub fn create_text(&mut self, value: impl Into<String>) -> NodeRef {
        self.nodes
            .insert(NodeData::new(NodeKind::Text(Text::new(value))))
    }

    pub fn create_placeholder(&mut self) -> NodeRef {
        self.nodes.insert(NodeData::new(NodeKind::Placeholder))
    }

    pub fn kind(&self, node: NodeRef) -> Result<&NodeKind, TreeError> {
        self.nodes
            .get(node)
            .map(|data| &data.kind)
            .ok_or(TreeError::StaleNode)
    }

    pub fn element(&self, node: NodeRef) -> Result<&Element, TreeError> {
        match &self.data(node)?.kind {
            NodeKind::Element(element) => Ok(element),
            kind => Err(TreeError::NotAnElement(kind.name())),
        }
    }

    pub fn element_mut(&mut self, node: NodeRef) -> Result<&mut Element, TreeError> {
        let data = self.nodes.get_mut(node).ok_or(TreeError::StaleNode)?;
        match &mut data.kind {
            NodeKind::Element(element) => Ok(element),
            kind => Err(TreeError::NotAnElement(kind.name())),
        }
    }

    pub fn text(&self, node: NodeRef) -> Result<&str, TreeError> {
        match &self.data(node)?.kind {
            NodeKind::Text(text) => Ok(&text.value),
            kind => Err(TreeError::NotText(kind.name())),
        }
    }

    pub fn parent(&self, node: NodeRef) -> Result<Option<NodeRef>, TreeError> {
        Ok(self.data(node)?.parent)
    }

    pub fn children(&self, node: NodeRef) -> Result<&[NodeRef], TreeError> {
        Ok(&self.data(node)?.children)
    }

    pub fn first_child(&self, node: NodeRef) -> Result<Option<NodeRef>, TreeError> {
        Ok(self.data(node)?.children.first().copied())
    }

    pub fn next_sibling(&self, node: NodeRef) -> Result<Option<NodeRef>, TreeError> {
        let Some(parent) = self.data(node)?.parent else {
            return Ok(None);
        };
        let siblings = &self.data(parent)?.children;
        let index = siblings
            .iter()
            .position(|&sibling| sibling == node)
            .ok_or(TreeError::StaleNode)?;
        Ok(siblings.get(index + 1).copied())
    }

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeRef, child: NodeRef) -> Result<(), TreeError> {
        self.ensure_container(parent)?;
        self.detach(child)?;
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Inserts `new_nodes` immediately before `target`, preserving order.
    pub fn insert_before(
        &mut self,
        target: NodeRef,
        new_nodes: &[NodeRef],
    ) -> Result<(), TreeError> {
        self.insert_at(target, new_nodes, false)
    }

    /// Inserts `new_nodes` immediately after `target`, preserving order.
    pub fn insert_after(
        &mut self,
        target: NodeRef,
        new_nodes: &[NodeRef],
    ) -> Result<(), TreeError> {
        self.insert_at(target, new_nodes, true)
    }

    /// Replaces `target` with `new_nodes`, leaving `target` detached.
    pub fn replace_with(
        &mut self,
        target: NodeRef,
        new_nodes: &[NodeRef],
    ) -> Result<(), TreeError> {
        self.insert_at(target, new_nodes, false)?;
        self.detach(target)
    }

    /// Detaches `node` from its parent. The subtree stays alive: a producer
    /// may re-insert it later through a stored id.
    pub fn remove(&mut self, node: NodeRef) -> Result<(), TreeError> {
        self.detach(node)
    }

    /// Deep-clones `node` and its subtree. Attributes, style and properties
    /// are copied; event listener registrations are not.
    pub fn clone_node(&mut self, node: NodeRef) -> Result<NodeRef, TreeError> {
        let data = self.data(node)?;
        let kind = data.kind.clone();
        let children = data.children.clone();

        let clone = self.nodes.insert(NodeData::new(kind));
        for child in children {
            let child_clone = self.clone_node(child)?;
            self.nodes[clone].children.push(child_clone);
            self.nodes[child_clone].parent = Some(clone);
        }
        Ok(clone)
    }

    /// Replaces the node's textual content. On a text node this swaps the
    /// value; on an element it replaces all children with one text node.
    pub fn set_text(&mut self, node: NodeRef, value: impl Into<String>) -> Result<(), TreeError> {
        let data = self.nodes.get_mut(node).ok_or(TreeError::StaleNode)?;
        if let NodeKind::Text(text) = &mut data.kind {
            text.value = value.into();
            return Ok(());
        }
        match data.kind.name() {
            "element" => {
                self.clear_children(node)?;
                let text = self.create_text(value);
                self.append_child(node, text)
            }
            kind => Err(TreeError::NoChildren(kind)),
        }
    }

    /// Installs raw inner content on an element, replacing its children.
    pub fn set_raw_inner(
        &mut self,
        node: NodeRef,
        content: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.element(node)?;
        self.clear_children(node)?;
        self.element_mut(node)?.set_raw_inner(Some(content.into()));
        Ok(())
    }

    /// Clears an element's children and any raw inner content.
    pub fn clear_inner(&mut self, node: NodeRef) -> Result<(), TreeError> {
        self.element(node)?;
        self.clear_children(node)?;
        self.element_mut(node)?.set_raw_inner(None);
        Ok(())
    }

    pub fn add_listener(
        &mut self,
        node: NodeRef,
        event: impl Into<SmolStr>,
    ) -> Result<(), TreeError> {
        let data = self.nodes.get_mut(node).ok_or(TreeError::StaleNode)?;
        data.listeners.insert(event.into());
        Ok(())
    }

    /// Detaches a listener attach point, returning whether it was present.
    pub fn remove_listener(&mut self, node: NodeRef, event: &str) -> Result<bool, TreeError> {
        let data = self.nodes.get_mut(node).ok_or(TreeError::StaleNode)?;
        Ok(data.listeners.remove(event))
    }

    pub fn has_listener(&self, node: NodeRef, event: &str) -> Result<bool, TreeError> {
        Ok(self.data(node)?.listeners.contains(event))
    }

    fn data(&self, node: NodeRef) -> Result<&NodeData, TreeError> {
        self.nodes.get(node).ok_or(TreeError::StaleNode)
    }

    fn ensure_container(&self, node: NodeRef) -> Result<(), TreeError> {
        match &self.data(node)?.kind {
            NodeKind::Element(_) => Ok(()),
            kind => Err(TreeError::NoChildren(kind.name())),
        }
    }

    fn detach(&mut self, node: NodeRef) -> Result<(), TreeError> {
        if node == self.root {
            return Err(TreeError::DetachedRoot);
        }
        let Some(parent) = self.data(node)?.parent else {
            return Ok(());
        };
        self.nodes[parent].children.retain(|&child| child != node);
        self.nodes[node].parent = None;
        Ok(())
    }

    fn clear_children(&mut self, node: NodeRef) -> Result<(), TreeError> {
        let children = self.data(node)?.children.clone();
        for child in children {
            self.detach(child)?;
        }
        Ok(())
    }

    fn insert_at(
        &mut self,
        target: NodeRef,
        new_nodes: &[NodeRef],
        after: bool,
    ) -> Result<(), TreeError> {
        let parent = self.data(target)?.parent.ok_or(TreeError::NoParent)?;
        for (i, &node) in new_nodes.iter().enumerate() {
            self.detach(node)?;
            // recompute on every step: detaching may have shifted the target
            let index = self.nodes[parent]
                .children
                .iter()
                .position(|&child| child == target)
                .ok_or(TreeError::StaleNode)?;
            let at = if after { index + 1 + i } else { index };
            self.nodes[parent].children.insert(at, node);
            self.nodes[node].parent = Some(parent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn doc_with_children(count: usize) -> (Document, Vec<NodeRef>) {
        let mut doc = Document::new();
        let children = (0..count)
            .map(|i| {
                let child = doc.create_text(format!("child-{}", i));
                doc.append_child(doc.root(), child).unwrap();
                child
            })
            .collect();
        (doc, children)
    }

    #[test]
    fn test_append_child_reparents() {
        let mut doc = Document::new();
        let first = doc.create_element("div");
        let second = doc.create_element("span");
        let text = doc.create_text("hi");

        doc.append_child(first, text).unwrap();
        doc.append_child(second, text).unwrap();

        assert_eq!(doc.children(first).unwrap(), &[]);
        assert_eq!(doc.children(second).unwrap(), &[text]);
        assert_eq!(doc.parent(text).unwrap(), Some(second));
    }

    #[test]
    fn test_append_to_text_fails() {
        let mut doc = Document::new();
        let text = doc.create_text("hi");
        let child = doc.create_text("nested");

        assert_eq!(
            doc.append_child(text, child),
            Err(TreeError::NoChildren("text"))
        );
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn test_insert_before(#[case] target_index: usize) {
        let (mut doc, children) = doc_with_children(3);
        let inserted = doc.create_text("inserted");

        doc.insert_before(children[target_index], &[inserted]).unwrap();

        let siblings = doc.children(doc.root()).unwrap();
        assert_eq!(siblings[target_index], inserted);
        assert_eq!(siblings.len(), 4);
    }

    #[test]
    fn test_insert_after_preserves_order() {
        let (mut doc, children) = doc_with_children(2);
        let first = doc.create_text("a");
        let second = doc.create_text("b");

        doc.insert_after(children[0], &[first, second]).unwrap();

        assert_eq!(
            doc.children(doc.root()).unwrap(),
            &[children[0], first, second, children[1]]
        );
    }

    #[test]
    fn test_replace_with_detaches_target() {
        let (mut doc, children) = doc_with_children(3);
        let replacement = doc.create_element("p");

        doc.replace_with(children[1], &[replacement]).unwrap();

        assert_eq!(
            doc.children(doc.root()).unwrap(),
            &[children[0], replacement, children[2]]
        );
        assert_eq!(doc.parent(children[1]).unwrap(), None);
    }

    #[test]
    fn test_insert_without_parent_fails() {
        let mut doc = Document::new();
        let orphan = doc.create_element("div");
        let node = doc.create_text("x");

        assert_eq!(doc.insert_before(orphan, &[node]), Err(TreeError::NoParent));
    }

    #[test]
    fn test_remove_keeps_subtree_alive() {
        let (mut doc, children) = doc_with_children(1);

        doc.remove(children[0]).unwrap();

        assert_eq!(doc.children(doc.root()).unwrap(), &[]);
        assert_eq!(doc.text(children[0]).unwrap(), "child-0");
    }

    #[test]
    fn test_remove_root_fails() {
        let mut doc = Document::new();
        assert_eq!(doc.remove(doc.root()), Err(TreeError::DetachedRoot));
    }

    #[test]
    fn test_clone_node_is_deep() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let text = doc.create_text("hello");
        doc.append_child(div, text).unwrap();
        doc.element_mut(div)
            .unwrap()
            .set_attribute(crate::AttrKey::new("class"), "box");

        let clone = doc.clone_node(div).unwrap();

        assert_ne!(clone, div);
        assert_eq!(
            doc.element(clone).unwrap().attribute(&crate::AttrKey::new("class")),
            Some("box")
        );
        let cloned_children = doc.children(clone).unwrap();
        assert_eq!(cloned_children.len(), 1);
        assert_ne!(cloned_children[0], text);
        assert_eq!(doc.text(cloned_children[0]).unwrap(), "hello");
    }

    #[test]
    fn test_clone_node_skips_listeners() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        doc.add_listener(button, "click").unwrap();

        let clone = doc.clone_node(button).unwrap();

        assert!(!doc.has_listener(clone, "click").unwrap());
    }

    #[test]
    fn test_set_text_on_element_replaces_children() {
        let (mut doc, children) = doc_with_children(2);

        doc.set_text(doc.root(), "flattened").unwrap();

        let remaining = doc.children(doc.root()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(doc.text(remaining[0]).unwrap(), "flattened");
        assert_eq!(doc.parent(children[0]).unwrap(), None);
    }

    #[test]
    fn test_navigation() {
        let (doc, children) = doc_with_children(2);

        assert_eq!(doc.first_child(doc.root()).unwrap(), Some(children[0]));
        assert_eq!(doc.next_sibling(children[0]).unwrap(), Some(children[1]));
        assert_eq!(doc.next_sibling(children[1]).unwrap(), None);
        assert_eq!(doc.parent(children[0]).unwrap(), Some(doc.root()));
        assert_eq!(doc.parent(doc.root()).unwrap(), None);
    }

    #[test]
    fn test_set_raw_inner_clears_children() {
        let (mut doc, _) = doc_with_children(2);

        doc.set_raw_inner(doc.root(), "<b>raw</b>").unwrap();

        assert_eq!(doc.children(doc.root()).unwrap(), &[]);
        assert_eq!(doc.element(doc.root()).unwrap().raw_inner(), Some("<b>raw</b>"));

        doc.clear_inner(doc.root()).unwrap();
        assert_eq!(doc.element(doc.root()).unwrap().raw_inner(), None);
    }
}
