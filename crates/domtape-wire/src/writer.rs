use crate::{batch::Batch, opcode::Opcode, reader::IdWidth};

/// Builds a batch in memory: the producer-side encoder for the tape
/// format, mirroring [`BatchReader`](crate::BatchReader)'s decode rules.
/// String operands write their length into the opcode stream and their
/// bytes into the string blob.
#[derive(Debug, Default)]
pub struct TapeWriter {
    ops: Vec<u8>,
    strings: Vec<u8>,
    id_width: IdWidth,
}

impl TapeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.ops.push(opcode.as_byte());
        self
    }

    pub fn raw_byte(&mut self, byte: u8) -> &mut Self {
        self.ops.push(byte);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.ops.extend(value.to_le_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.ops.extend(value.to_le_bytes());
        self
    }

    /// Encodes an identifier at the current width, little-endian.
    pub fn id(&mut self, id: u64) -> &mut Self {
        self.ops
            .extend(&id.to_le_bytes()[..self.id_width.bytes()]);
        self
    }

    pub fn maybe_id(&mut self, id: Option<u64>) -> &mut Self {
        match id {
            Some(id) => {
                self.ops.push(1);
                self.id(id)
            }
            None => {
                self.ops.push(0);
                self
            }
        }
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        self.u16(value.len() as u16);
        self.strings.extend(value.as_bytes());
        self
    }

    pub fn flag(&mut self, value: bool) -> &mut Self {
        self.ops.push(value as u8);
        self
    }

    /// Emits a `SetIdSize` instruction and switches the writer's own width
    /// for subsequent [`TapeWriter::id`] calls.
    pub fn set_id_width(&mut self, id_width: IdWidth) -> &mut Self {
        self.op(Opcode::SetIdSize);
        self.ops.push(id_width.bytes() as u8);
        self.id_width = id_width;
        self
    }

    /// Switches the writer's width without emitting an instruction, for
    /// batches addressed to a reader that already carries the width.
    pub fn assume_id_width(&mut self, id_width: IdWidth) -> &mut Self {
        self.id_width = id_width;
        self
    }

    pub fn batch(&self) -> Batch<'_> {
        Batch::new(&self.ops, &self.strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::BatchReader;
    use crate::strings::StringTable;

    #[test]
    fn test_writer_reader_round_trip() {
        let mut tape = TapeWriter::new();
        tape.op(Opcode::CreateTextNode)
            .maybe_id(Some(5))
            .string("world")
            .op(Opcode::Stop);

        let batch = tape.batch();
        let mut reader = BatchReader::new(batch.ops);
        let mut strings = StringTable::new(batch.strings);

        assert_eq!(reader.read_u8().unwrap(), Opcode::CreateTextNode.as_byte());
        assert_eq!(reader.read_maybe_id().unwrap(), Some(5));
        let len = reader.read_u16().unwrap() as usize;
        assert_eq!(strings.next_str(len).unwrap(), "world");
        assert_eq!(reader.read_u8().unwrap(), Opcode::Stop.as_byte());
    }

    #[test]
    fn test_set_id_width_switches_encoding() {
        let mut tape = TapeWriter::new();
        tape.set_id_width(IdWidth::TWO).id(0x1234);

        let batch = tape.batch();
        assert_eq!(
            batch.ops,
            &[Opcode::SetIdSize.as_byte(), 2, 0x34, 0x12]
        );
    }
}
