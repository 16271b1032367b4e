use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        clientmem::{ClientMem, ClientMemError},
        format::formats,
        globals::WL_SHM,
        ifs::wl_shm_pool::WlShmPool,
        object::ObjectId,
        utils::buffd::MsgParserError,
        wire::{WlShmId, wl_shm::*},
    },
    std::{cell::RefCell, rc::Rc},
    thiserror::Error,
};

pub const INVALID_FORMAT: u32 = 0;
pub const INVALID_STRIDE: u32 = 1;
pub const INVALID_FD: u32 = 2;

pub struct WlShm {
    pub id: WlShmId,
}

impl WlShm {
    pub fn bind(client: &mut Client, id: ObjectId) -> Result<(), ClientError> {
        let id = WlShmId::from(id);
        client.objects.add(WlShm { id })?;
        for format in formats() {
            client.event(Format {
                self_id: id,
                format: format.wl_id,
            });
        }
        Ok(())
    }
}

object_kind!(WlShm, WlShmId, Shm, WlShm);

impl WlShmRequestHandler for WlShm {
    type Error = WlShmError;

    fn create_pool(client: &mut Client, _id: WlShmId, req: CreatePool) -> Result<(), Self::Error> {
        if req.size <= 0 {
            return Err(WlShmError::InvalidSize(req.size));
        }
        let mem = ClientMem::new(req.fd, req.size as usize)?;
        let pool = WlShmPool::new(req.id, Rc::new(RefCell::new(mem)));
        client.objects.add(pool)?;
        Ok(())
    }

    fn release(client: &mut Client, id: WlShmId, _req: Release) -> Result<(), Self::Error> {
        client.objects.remove_bind(WL_SHM, id.into());
        client.remove_obj(id)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlShmError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("The pool size {0} is not positive")]
    InvalidSize(i32),
    #[error("Could not map the client memory")]
    ClientMemError(#[source] Box<ClientMemError>),
}
efrom!(WlShmError, ParserError, MsgParserError);
efrom!(WlShmError, ClientError);
efrom!(WlShmError, ClientMemError);

impl RequestError for WlShmError {
    fn code(&self) -> ErrorCode {
        match self {
            WlShmError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlShmError::ClientError(e) => e.code(),
            WlShmError::InvalidSize(_) => ErrorCode::Interface(INVALID_STRIDE),
            WlShmError::ClientMemError(_) => ErrorCode::Interface(INVALID_FD),
        }
    }
}
