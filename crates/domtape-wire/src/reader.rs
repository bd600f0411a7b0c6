use crate::error::WireError;

/// Byte width of node identifiers on the tape: 1, 2, 4 or 8 for the native
/// fixed-width reads, any other value in `1..=8` via a byte-accumulation
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdWidth(u8);

impl IdWidth {
    pub const ONE: IdWidth = IdWidth(1);
    pub const TWO: IdWidth = IdWidth(2);
    pub const FOUR: IdWidth = IdWidth(4);
    pub const EIGHT: IdWidth = IdWidth(8);

    pub fn new(width: u8) -> Result<Self, WireError> {
        match width {
            1..=8 => Ok(Self(width)),
            _ => Err(WireError::InvalidIdWidth(width)),
        }
    }

    pub fn bytes(self) -> usize {
        self.0 as usize
    }
}

impl Default for IdWidth {
    fn default() -> Self {
        Self::ONE
    }
}

/// Forward cursor over one batch's instruction bytes.
///
/// Every read is bounds-checked; a read past the end is a hard decode
/// fault, never garbage. The only rewind is [`BatchReader::rewind`], the
/// one-byte pushback used to stop cleanly on an unknown opcode.
#[derive(Debug)]
pub struct BatchReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    id_width: IdWidth,
}

impl<'a> BatchReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            id_width: IdWidth::default(),
        }
    }

    pub fn with_id_width(mut self, id_width: IdWidth) -> Self {
        self.id_width = id_width;
        self
    }

    /// Current byte offset, for fault reporting.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn id_width(&self) -> IdWidth {
        self.id_width
    }

    pub fn set_id_width(&mut self, id_width: IdWidth) {
        self.id_width = id_width;
    }

    /// Pushes the cursor back one byte. Saturates at the start.
    pub fn rewind(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Decodes one node identifier at the configured width.
    pub fn read_id(&mut self) -> Result<u64, WireError> {
        match self.id_width {
            IdWidth::ONE => Ok(self.read_u8()? as u64),
            IdWidth::TWO => Ok(self.read_u16()? as u64),
            IdWidth::FOUR => Ok(self.read_u32()? as u64),
            IdWidth::EIGHT => self.read_u64(),
            width => {
                let bytes = self.take(width.bytes())?;
                let mut value = 0u64;
                for (i, &byte) in bytes.iter().enumerate() {
                    value |= (byte as u64) << (i * 8);
                }
                Ok(value)
            }
        }
    }

    /// Decodes a maybe-present identifier: a one-byte presence tag (`0` =
    /// absent, `1` = present) followed by the identifier itself.
    pub fn read_maybe_id(&mut self) -> Result<Option<u64>, WireError> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(None),
            1 => self.read_id().map(Some),
            tag => Err(WireError::InvalidPresenceTag { tag, offset }),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let remaining = self.bytes.len() - self.pos;
        if remaining < len {
            return Err(WireError::UnexpectedEof {
                offset: self.pos,
                needed: len - remaining,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_fixed_width_reads_are_little_endian() {
        let mut reader = BatchReader::new(&[0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff]);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0x12345678);
        assert_eq!(reader.read_u8().unwrap(), 0xff);
        assert_eq!(reader.offset(), 7);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut reader = BatchReader::new(&[0x01]);
        assert_eq!(
            reader.read_u32(),
            Err(WireError::UnexpectedEof {
                offset: 0,
                needed: 3
            })
        );
    }

    #[rstest]
    #[case(IdWidth::ONE, vec![0x12], 0x12)]
    #[case(IdWidth::TWO, vec![0x34, 0x12], 0x1234)]
    #[case(IdWidth::FOUR, vec![0x78, 0x56, 0x34, 0x12], 0x12345678)]
    #[case(
        IdWidth::EIGHT,
        vec![0xf0, 0xde, 0xbc, 0x9a, 0x78, 0x56, 0x34, 0x12],
        0x123456789abcdef0
    )]
    #[case(IdWidth(3), vec![0x56, 0x34, 0x12], 0x123456)]
    fn test_read_id(#[case] width: IdWidth, #[case] bytes: Vec<u8>, #[case] expected: u64) {
        let mut reader = BatchReader::new(&bytes).with_id_width(width);
        assert_eq!(reader.read_id().unwrap(), expected);
        assert_eq!(reader.offset(), width.bytes());
    }

    #[rstest]
    #[case(IdWidth::ONE)]
    #[case(IdWidth::TWO)]
    #[case(IdWidth::FOUR)]
    #[case(IdWidth::EIGHT)]
    fn test_read_maybe_id(#[case] width: IdWidth) {
        let mut bytes = vec![0u8, 1u8];
        bytes.extend(std::iter::repeat_n(0u8, width.bytes() - 1));
        bytes.push(0x7f);

        let mut reader = BatchReader::new(&bytes).with_id_width(width);
        assert_eq!(reader.read_maybe_id().unwrap(), None);
        assert_eq!(
            reader.read_maybe_id().unwrap(),
            Some(0x7f << (8 * (width.bytes() - 1)))
        );
    }

    #[test]
    fn test_invalid_presence_tag() {
        let mut reader = BatchReader::new(&[2]);
        assert_eq!(
            reader.read_maybe_id(),
            Err(WireError::InvalidPresenceTag { tag: 2, offset: 0 })
        );
    }

    #[rstest]
    #[case(0)]
    #[case(9)]
    fn test_invalid_id_width(#[case] width: u8) {
        assert_eq!(IdWidth::new(width), Err(WireError::InvalidIdWidth(width)));
    }

    #[test]
    fn test_rewind_saturates() {
        let mut reader = BatchReader::new(&[1, 2]);
        reader.rewind();
        assert_eq!(reader.offset(), 0);
        reader.read_u8().unwrap();
        reader.rewind();
        assert_eq!(reader.offset(), 0);
    }
}
