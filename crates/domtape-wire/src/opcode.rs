/// One byte on the tape selects one tree-edit or bookkeeping operation.
///
/// The discriminants are the wire encoding. Any byte outside the defined
/// range is not an error: it is the soft-stop signal, surfaced as `None`
/// from [`Opcode::from_byte`] so the interpreter can rewind and hand
/// control back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    AppendChildren = 0,
    ReplaceWith = 1,
    InsertAfter = 2,
    InsertBefore = 3,
    Remove = 4,
    CreateTextNode = 5,
    CreateElement = 6,
    CreatePlaceholder = 7,
    NewEventListener = 8,
    RemoveEventListener = 9,
    SetText = 10,
    SetAttribute = 11,
    RemoveAttribute = 12,
    CloneNode = 13,
    CloneNodeChildren = 14,
    FirstChild = 15,
    NextSibling = 16,
    ParentNode = 17,
    StoreWithId = 18,
    SetLastNode = 19,
    SetIdSize = 20,
    Stop = 21,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let op = match byte {
            0 => Opcode::AppendChildren,
            1 => Opcode::ReplaceWith,
            2 => Opcode::InsertAfter,
            3 => Opcode::InsertBefore,
            4 => Opcode::Remove,
            5 => Opcode::CreateTextNode,
            6 => Opcode::CreateElement,
            7 => Opcode::CreatePlaceholder,
            8 => Opcode::NewEventListener,
            9 => Opcode::RemoveEventListener,
            10 => Opcode::SetText,
            11 => Opcode::SetAttribute,
            12 => Opcode::RemoveAttribute,
            13 => Opcode::CloneNode,
            14 => Opcode::CloneNodeChildren,
            15 => Opcode::FirstChild,
            16 => Opcode::NextSibling,
            17 => Opcode::ParentNode,
            18 => Opcode::StoreWithId,
            19 => Opcode::SetLastNode,
            20 => Opcode::SetIdSize,
            21 => Opcode::Stop,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}
