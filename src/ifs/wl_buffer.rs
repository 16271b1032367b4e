use {
    crate::{
        client::{Client, ClientError, ErrorCode, IMPLEMENTATION, RequestError},
        clientmem::{ClientMem, ClientMemError},
        format::Format,
        renderer::pixmap_from_shm,
        utils::buffd::MsgParserError,
        wire::{WlBufferId, wl_buffer::*},
    },
    std::{cell::RefCell, rc::Rc},
    thiserror::Error,
    tiny_skia::Pixmap,
};

/// A window into a shm pool.
pub struct WlBuffer {
    pub id: WlBufferId,
    mem: Rc<RefCell<ClientMem>>,
    offset: usize,
    pub width: i32,
    pub height: i32,
    stride: usize,
    pub format: &'static Format,
}

impl WlBuffer {
    pub fn new(
        id: WlBufferId,
        mem: Rc<RefCell<ClientMem>>,
        offset: usize,
        width: i32,
        height: i32,
        stride: usize,
        format: &'static Format,
    ) -> Self {
        Self {
            id,
            mem,
            offset,
            width,
            height,
            stride,
            format,
        }
    }

    /// Copies the current contents of the buffer.
    pub fn to_pixmap(&self) -> Result<Pixmap, WlBufferError> {
        let mem = self.mem.borrow();
        let len = self.stride * self.height as usize;
        mem.access(|bytes| {
            let Some(bytes) = bytes.get(self.offset..self.offset + len) else {
                return Err(WlBufferError::OutOfBounds);
            };
            pixmap_from_shm(
                bytes,
                self.format,
                self.width as u32,
                self.height as u32,
                self.stride,
            )
            .ok_or(WlBufferError::CreatePixmap)
        })?
    }
}

object_kind!(WlBuffer, WlBufferId, Buffer, WlBuffer);

impl WlBufferRequestHandler for WlBuffer {
    type Error = WlBufferError;

    fn destroy(client: &mut Client, id: WlBufferId, _req: Destroy) -> Result<(), Self::Error> {
        client.remove_obj(id)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlBufferError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("Could not access the client memory")]
    ClientMemError(#[source] Box<ClientMemError>),
    #[error("The buffer lies outside of the client memory")]
    OutOfBounds,
    #[error("Could not allocate a pixmap")]
    CreatePixmap,
}
efrom!(WlBufferError, ParserError, MsgParserError);
efrom!(WlBufferError, ClientError);
efrom!(WlBufferError, ClientMemError);

impl RequestError for WlBufferError {
    fn code(&self) -> ErrorCode {
        match self {
            WlBufferError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlBufferError::ClientError(e) => e.code(),
            WlBufferError::ClientMemError(_)
            | WlBufferError::OutOfBounds
            | WlBufferError::CreatePixmap => ErrorCode::Display(IMPLEMENTATION),
        }
    }
}
