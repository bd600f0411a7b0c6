use crate::error::WireError;

/// Forward-only reader over a batch's UTF-8 string blob.
///
/// Operations must request string lengths in the exact order they were
/// encoded; there is no random access. Overrunning the blob or slicing
/// through invalid UTF-8 is a hard decode fault.
#[derive(Debug)]
pub struct StringTable<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> StringTable<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Returns the next `len` bytes decoded as UTF-8, advancing the cursor.
    pub fn next_str(&mut self, len: usize) -> Result<&'a str, WireError> {
        let remaining = self.bytes.len() - self.pos;
        if remaining < len {
            return Err(WireError::StringOverrun {
                requested: len,
                remaining,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(std::str::from_utf8(slice)?)
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
