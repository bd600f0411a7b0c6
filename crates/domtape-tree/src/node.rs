use std::fmt::{self, Display};

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Attribute key: a name plus an optional namespace. Namespaced and plain
/// attributes with the same name are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrKey {
    pub name: SmolStr,
    pub namespace: Option<SmolStr>,
}

impl AttrKey {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn namespaced(name: impl Into<SmolStr>, namespace: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}

impl Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}:{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Live UI state modelled as node properties rather than markup, mirroring
/// how a browser keeps `value`/`checked`/`selected` off the attribute map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementProps {
    pub value: Option<String>,
    pub checked: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: SmolStr,
    pub namespace: Option<SmolStr>,
    pub props: ElementProps,
    attributes: FxHashMap<AttrKey, String>,
    style: FxHashMap<SmolStr, String>,
    raw_inner: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            namespace: None,
            props: ElementProps::default(),
            attributes: FxHashMap::default(),
            style: FxHashMap::default(),
            raw_inner: None,
        }
    }

    pub fn with_namespace(tag: impl Into<SmolStr>, namespace: impl Into<SmolStr>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::new(tag)
        }
    }

    pub fn attribute(&self, key: &AttrKey) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: AttrKey, value: impl Into<String>) {
        self.attributes.insert(key, value.into());
    }

    /// Removes an attribute, returning whether it was present.
    pub fn remove_attribute(&mut self, key: &AttrKey) -> bool {
        self.attributes.remove(key).is_some()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&AttrKey, &str)> {
        self.attributes.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style.get(name).map(String::as_str)
    }

    pub fn set_style_property(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        self.style.insert(name.into(), value.into());
    }

    pub fn remove_style_property(&mut self, name: &str) -> bool {
        self.style.remove(name).is_some()
    }

    /// Raw inner content installed through the escape hatch, if any.
    pub fn raw_inner(&self) -> Option<&str> {
        self.raw_inner.as_deref()
    }

    pub(crate) fn set_raw_inner(&mut self, content: Option<String>) {
        self.raw_inner = content;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// The closed set of node kinds the document models. Placeholders are
/// hidden, non-rendering markers that hold a position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(Text),
    Placeholder,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Element(_) => "element",
            NodeKind::Text(_) => "text",
            NodeKind::Placeholder => "placeholder",
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeKind::Element(_))
    }
}
