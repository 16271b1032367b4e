use {
    crate::{
        object::{Interface, ObjectId},
        utils::buffd::{BufFdError, MsgParserError},
    },
    std::error::Error,
    thiserror::Error,
};

pub const INVALID_OBJECT: u32 = 0;
pub const INVALID_METHOD: u32 = 1;
pub const IMPLEMENTATION: u32 = 3;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("An error occurred reading from/writing to the client")]
    Io(#[from] BufFdError),
    #[error("Client tried to invoke a non-existent method")]
    InvalidMethod,
    #[error("Client tried to access non-existent object {0}")]
    InvalidObject(ObjectId),
    #[error("The message size is < 8")]
    MessageSizeTooSmall,
    #[error("The size of the message is not a multiple of 4")]
    UnalignedMessage,
    #[error("Cannot parse the message")]
    ParserError(#[source] Box<MsgParserError>),
    #[error("The id is already in use")]
    IdAlreadyInUse,
    #[error("The client object id is out of bounds")]
    ClientIdOutOfBounds,
    #[error(transparent)]
    LookupError(LookupError),
}
efrom!(ClientError, ParserError, MsgParserError);

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        let code = match self {
            ClientError::InvalidMethod
            | ClientError::MessageSizeTooSmall
            | ClientError::UnalignedMessage
            | ClientError::ParserError(_) => INVALID_METHOD,
            ClientError::InvalidObject(_)
            | ClientError::IdAlreadyInUse
            | ClientError::ClientIdOutOfBounds
            | ClientError::LookupError(_) => INVALID_OBJECT,
            ClientError::Io(_) => IMPLEMENTATION,
        };
        ErrorCode::Display(code)
    }
}

/// Where a protocol error is reported.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// A `wl_display` error code, reported against the display.
    Display(u32),
    /// An error code of the interface of the object the request was sent to.
    Interface(u32),
}

/// The error type of a request handler.
pub trait RequestError: Error + 'static {
    fn code(&self) -> ErrorCode;
}

#[derive(Debug, Error)]
#[error("An error occurred in a `{}`", .interface.name())]
pub struct ObjectError {
    pub id: ObjectId,
    pub interface: Interface,
    pub code: ErrorCode,
    #[source]
    pub error: Box<dyn Error + 'static>,
}

impl ObjectError {
    pub fn new<E: RequestError>(id: ObjectId, interface: Interface, error: E) -> Self {
        Self {
            id,
            interface,
            code: error.code(),
            error: Box::new(error),
        }
    }
}

#[derive(Debug, Error)]
#[error("There is no `{}` with id {}", .interface.name(), .id)]
pub struct LookupError {
    pub interface: Interface,
    pub id: ObjectId,
}
