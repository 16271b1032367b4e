use {
    crate::{
        client::{ClientError, ErrorCode, RequestError},
        utils::buffd::MsgParserError,
        wire::{WlCallbackId, wl_callback::*},
    },
    thiserror::Error,
};

pub struct WlCallback {
    pub id: WlCallbackId,
}

impl WlCallback {
    pub fn new(id: WlCallbackId) -> Self {
        Self { id }
    }
}

object_kind!(WlCallback, WlCallbackId, Callback, WlCallback);

impl WlCallbackRequestHandler for WlCallback {
    type Error = WlCallbackError;
}

#[derive(Debug, Error)]
pub enum WlCallbackError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
}
efrom!(WlCallbackError, ParserError, MsgParserError);
efrom!(WlCallbackError, ClientError);

impl RequestError for WlCallbackError {
    fn code(&self) -> ErrorCode {
        match self {
            WlCallbackError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlCallbackError::ClientError(e) => e.code(),
        }
    }
}
