use crate::error::WireError;

/// One invocation's worth of patch input: the opcode stream and the string
/// blob it slices text out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub ops: &'a [u8],
    pub strings: &'a [u8],
}

impl<'a> Batch<'a> {
    pub fn new(ops: &'a [u8], strings: &'a [u8]) -> Self {
        Self { ops, strings }
    }

    /// Carves a batch out of a shared buffer using a host-supplied header:
    /// three little-endian `u32` fields giving the opcode-stream offset,
    /// the string-blob offset and the string-blob length. Every field and
    /// the regions they describe are bounds-checked before slicing.
    pub fn from_shared(mem: &'a [u8], header: &BatchHeader) -> Result<Self, WireError> {
        let op_start = read_header_u32(mem, header.op_offset_at)? as usize;
        let str_start = read_header_u32(mem, header.str_offset_at)? as usize;
        let str_len = read_header_u32(mem, header.str_len_at)? as usize;

        let ops = region(mem, op_start, mem.len())?;
        let strings = region(mem, str_start, str_start.saturating_add(str_len))?;
        Ok(Self { ops, strings })
    }
}

/// Locations of the three batch header fields within the shared buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchHeader {
    pub op_offset_at: usize,
    pub str_offset_at: usize,
    pub str_len_at: usize,
}

fn read_header_u32(mem: &[u8], offset: usize) -> Result<u32, WireError> {
    let end = offset.checked_add(4).filter(|&end| end <= mem.len());
    let Some(end) = end else {
        return Err(WireError::HeaderOutOfBounds {
            offset,
            len: mem.len(),
        });
    };
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&mem[offset..end]);
    Ok(u32::from_le_bytes(buf))
}

fn region(mem: &[u8], start: usize, end: usize) -> Result<&[u8], WireError> {
    if start > end || end > mem.len() {
        return Err(WireError::RegionOutOfBounds {
            start,
            end,
            len: mem.len(),
        });
    }
    Ok(&mem[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: BatchHeader = BatchHeader {
        op_offset_at: 0,
        str_offset_at: 4,
        str_len_at: 8,
    };

    fn shared(ops: &[u8], strings: &[u8]) -> Vec<u8> {
        let op_start = 12 + strings.len();
        let mut mem = Vec::new();
        mem.extend((op_start as u32).to_le_bytes());
        mem.extend(12u32.to_le_bytes());
        mem.extend((strings.len() as u32).to_le_bytes());
        mem.extend(strings);
        mem.extend(ops);
        mem
    }

    #[test]
    fn test_from_shared() {
        let mem = shared(&[21], b"hi");
        let batch = Batch::from_shared(&mem, &HEADER).unwrap();
        assert_eq!(batch.ops, &[21]);
        assert_eq!(batch.strings, b"hi");
    }

    #[test]
    fn test_header_field_out_of_bounds() {
        let mem = [0u8; 8];
        let header = BatchHeader {
            op_offset_at: 0,
            str_offset_at: 4,
            str_len_at: 6,
        };
        assert_eq!(
            Batch::from_shared(&mem, &header),
            Err(WireError::HeaderOutOfBounds { offset: 6, len: 8 })
        );
    }

    #[test]
    fn test_string_region_out_of_bounds() {
        let mut mem = shared(&[21], b"hi");
        // inflate the declared string length past the buffer end
        mem[8..12].copy_from_slice(&100u32.to_le_bytes());
        assert!(matches!(
            Batch::from_shared(&mem, &HEADER),
            Err(WireError::RegionOutOfBounds { .. })
        ));
    }
}
