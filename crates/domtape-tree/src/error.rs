use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("stale node reference")]
    StaleNode,
    #[error("expected an element node, found a {0} node")]
    NotAnElement(&'static str),
    #[error("expected a text node, found a {0} node")]
    NotText(&'static str),
    #[error("a {0} node cannot contain children")]
    NoChildren(&'static str),
    #[error("node has no parent")]
    NoParent,
    #[error("the root node cannot be detached")]
    DetachedRoot,
}
