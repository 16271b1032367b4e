#[cfg(test)]
mod tests;

use {
    crate::{object::ObjectId, utils::buffd::BufFdError},
    std::mem,
};

pub const HEADER_SIZE: u16 = 8;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Message {
    pub id: ObjectId,
    pub opcode: u16,
    /// The size field of the header, including the header itself.
    pub size: u16,
    pub payload: Vec<u8>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Phase {
    ObjectId,
    Opcode,
    Size,
    Payload,
}

/// Splits a byte stream into wire messages.
///
/// Header fields are accumulated byte by byte, so a message may be spread over any number of
/// `consume` calls. The framer does not validate the size field; a size below the header size
/// is handed on with an empty payload.
pub struct MsgFramer {
    phase: Phase,
    shift: u32,
    id: u32,
    opcode: u16,
    size: u16,
    payload: Vec<u8>,
}

impl Default for MsgFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgFramer {
    pub fn new() -> Self {
        Self {
            phase: Phase::ObjectId,
            shift: 0,
            id: 0,
            opcode: 0,
            size: 0,
            payload: vec![],
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::ObjectId;
        self.shift = 0;
        self.id = 0;
        self.opcode = 0;
        self.size = 0;
        self.payload.clear();
    }

    fn emit(&mut self, out: &mut Vec<Message>) {
        out.push(Message {
            id: ObjectId::from_raw(self.id),
            opcode: self.opcode,
            size: self.size,
            payload: mem::take(&mut self.payload),
        });
        self.reset();
    }

    pub fn consume(&mut self, bytes: &[u8]) -> Vec<Message> {
        let mut out = vec![];
        self.consume_into(bytes, &mut out);
        out
    }

    pub fn consume_into(&mut self, bytes: &[u8], out: &mut Vec<Message>) {
        let mut pos = 0;
        while pos < bytes.len() {
            match self.phase {
                Phase::ObjectId => {
                    self.id |= (bytes[pos] as u32) << self.shift;
                    self.shift += 8;
                    if self.shift == 32 {
                        self.shift = 0;
                        self.phase = Phase::Opcode;
                    }
                    pos += 1;
                }
                Phase::Opcode => {
                    self.opcode |= (bytes[pos] as u16) << self.shift;
                    self.shift += 8;
                    if self.shift == 16 {
                        self.shift = 0;
                        self.phase = Phase::Size;
                    }
                    pos += 1;
                }
                Phase::Size => {
                    self.size |= (bytes[pos] as u16) << self.shift;
                    self.shift += 8;
                    pos += 1;
                    if self.shift == 16 {
                        self.shift = 0;
                        if self.size <= HEADER_SIZE {
                            self.emit(out);
                        } else {
                            self.payload.reserve(self.payload_len());
                            self.phase = Phase::Payload;
                        }
                    }
                }
                Phase::Payload => {
                    let missing = self.payload_len() - self.payload.len();
                    let available = (bytes.len() - pos).min(missing);
                    self.payload.extend_from_slice(&bytes[pos..pos + available]);
                    pos += available;
                    if self.payload.len() == self.payload_len() {
                        self.emit(out);
                    }
                }
            }
        }
    }

    fn payload_len(&self) -> usize {
        (self.size - HEADER_SIZE) as usize
    }

    /// Appends one message to `out`. Nothing is written if the message does not fit into
    /// the size field.
    pub fn encode(
        id: ObjectId,
        opcode: u16,
        payload: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), BufFdError> {
        let size = HEADER_SIZE as usize + payload.len();
        let Ok(size16) = u16::try_from(size) else {
            return Err(BufFdError::MessageTooLarge(size));
        };
        out.extend_from_slice(&id.raw().to_le_bytes());
        out.extend_from_slice(&opcode.to_le_bytes());
        out.extend_from_slice(&size16.to_le_bytes());
        out.extend_from_slice(payload);
        Ok(())
    }
}
