use {
    crate::{
        object::ObjectId,
        utils::buffd::{BufFdOut, MsgFramer, buf_out::MsgFds},
    },
    std::{mem, sync::Arc},
    uapi::OwnedFd,
};

/// Builds one event and appends it to the outgoing buffer in `write_len`.
pub struct MsgFormatter<'a> {
    out: &'a mut BufFdOut,
    id: ObjectId,
    opcode: u16,
    payload: Vec<u8>,
    fds: Vec<Arc<OwnedFd>>,
}

impl<'a> MsgFormatter<'a> {
    pub fn new(out: &'a mut BufFdOut) -> Self {
        let payload = mem::take(&mut out.scratch);
        Self {
            out,
            id: ObjectId::from_raw(0),
            opcode: 0,
            payload,
            fds: vec![],
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        self.payload.extend_from_slice(bytes);
    }

    fn pad(&mut self) {
        let none = [0; 4];
        let n = self.payload.len().wrapping_neg() & 3;
        self.write(&none[..n]);
    }

    pub fn int(&mut self, int: i32) -> &mut Self {
        self.write(&int.to_le_bytes());
        self
    }

    pub fn uint(&mut self, int: u32) -> &mut Self {
        self.write(&int.to_le_bytes());
        self
    }

    pub fn string<S: AsRef<[u8]> + ?Sized>(&mut self, s: &S) -> &mut Self {
        let s = s.as_ref();
        self.uint(s.len() as u32 + 1);
        self.write(s);
        self.write(&[0]);
        self.pad();
        self
    }

    pub fn array(&mut self, bytes: &[u8]) -> &mut Self {
        self.uint(bytes.len() as u32);
        self.write(bytes);
        self.pad();
        self
    }

    #[cfg_attr(not(test), expect(dead_code))]
    pub fn fd(&mut self, fd: Arc<OwnedFd>) -> &mut Self {
        self.fds.push(fd);
        self
    }

    pub fn object<T: Into<ObjectId>>(&mut self, obj: T) -> &mut Self {
        self.uint(obj.into().raw())
    }

    pub fn header<T: Into<ObjectId>>(&mut self, obj: T, event: u16) -> &mut Self {
        self.id = obj.into();
        self.opcode = event;
        self
    }

    /// Frames the event. An event that does not fit into a message is dropped and the next
    /// flush fails, ending the connection.
    pub fn write_len(self) {
        let Self {
            out,
            id,
            opcode,
            mut payload,
            fds,
        } = self;
        let pos = out.out_buf.len();
        match MsgFramer::encode(id, opcode, &payload, &mut out.out_buf) {
            Ok(()) => {
                if fds.len() > 0 {
                    out.fds.push_back(MsgFds { pos, fds });
                }
            }
            Err(e) => out.fail(e),
        }
        payload.clear();
        out.scratch = payload;
    }
}
