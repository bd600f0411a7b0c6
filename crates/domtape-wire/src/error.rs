use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("instruction stream ended at offset {offset}, needed {needed} more byte(s)")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("invalid id presence tag {tag:#04x} at offset {offset}")]
    InvalidPresenceTag { tag: u8, offset: usize },
    #[error("invalid id width {0}, expected 1 to 8")]
    InvalidIdWidth(u8),
    #[error("string table overrun: requested {requested} byte(s) with {remaining} remaining")]
    StringOverrun { requested: usize, remaining: usize },
    #[error("string table slice is not valid utf-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("batch header field at offset {offset} escapes the {len}-byte shared buffer")]
    HeaderOutOfBounds { offset: usize, len: usize },
    #[error("batch region {start}..{end} escapes the {len}-byte shared buffer")]
    RegionOutOfBounds { start: usize, end: usize, len: usize },
}
