use {
    crate::object::ObjectId,
    std::collections::VecDeque,
    thiserror::Error,
    uapi::OwnedFd,
};

#[derive(Debug, Error)]
pub enum MsgParserError {
    #[error("The message ended unexpectedly")]
    UnexpectedEof,
    #[error("The message contained a string of size 0")]
    EmptyString,
    #[error("The message contained a string without a terminating nul byte")]
    UnterminatedString,
    #[error("Message is missing a required file descriptor")]
    MissingFd,
    #[error("There is trailing data after the message")]
    TrailingData,
    #[error("String is not UTF-8")]
    NonUtf8,
    #[error("A non-nullable object argument was null")]
    NullObject,
}

/// Reads the arguments of a request from its payload.
pub struct MsgParser<'a, 'b> {
    fds: &'a mut VecDeque<OwnedFd>,
    pos: usize,
    data: &'b [u8],
}

impl<'a, 'b> MsgParser<'a, 'b> {
    pub fn new(fds: &'a mut VecDeque<OwnedFd>, data: &'b [u8]) -> Self {
        Self { fds, pos: 0, data }
    }

    pub fn int(&mut self) -> Result<i32, MsgParserError> {
        if self.data.len() - self.pos < 4 {
            return Err(MsgParserError::UnexpectedEof);
        }
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn uint(&mut self) -> Result<u32, MsgParserError> {
        self.int().map(|i| i as u32)
    }

    pub fn object<T>(&mut self) -> Result<T, MsgParserError>
    where
        ObjectId: Into<T>,
    {
        match self.uint()? {
            0 => Err(MsgParserError::NullObject),
            id => Ok(ObjectId::from_raw(id).into()),
        }
    }

    pub fn opt_object<T>(&mut self) -> Result<Option<T>, MsgParserError>
    where
        ObjectId: Into<T>,
    {
        match self.uint()? {
            0 => Ok(None),
            id => Ok(Some(ObjectId::from_raw(id).into())),
        }
    }

    pub fn str(&mut self) -> Result<&'b str, MsgParserError> {
        let len = self.uint()? as usize;
        if len == 0 {
            return Err(MsgParserError::EmptyString);
        }
        let cap = (len + 3) & !3;
        if cap > self.data.len() - self.pos {
            return Err(MsgParserError::UnexpectedEof);
        }
        let s = &self.data[self.pos..self.pos + len];
        self.pos += cap;
        let (nul, s) = match s.split_last() {
            Some(v) => v,
            None => return Err(MsgParserError::EmptyString),
        };
        if *nul != 0 {
            return Err(MsgParserError::UnterminatedString);
        }
        std::str::from_utf8(s).map_err(|_| MsgParserError::NonUtf8)
    }

    pub fn fd(&mut self) -> Result<OwnedFd, MsgParserError> {
        match self.fds.pop_front() {
            Some(fd) => Ok(fd),
            None => Err(MsgParserError::MissingFd),
        }
    }

    pub fn eof(&self) -> Result<(), MsgParserError> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(MsgParserError::TrailingData)
        }
    }
}
