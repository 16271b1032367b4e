use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        clientmem::{ClientMem, ClientMemError},
        format::shm_format,
        ifs::{
            wl_buffer::WlBuffer,
            wl_shm::{INVALID_FD, INVALID_FORMAT, INVALID_STRIDE},
        },
        utils::buffd::MsgParserError,
        wire::{WlShmPoolId, wl_shm_pool::*},
    },
    std::{cell::RefCell, rc::Rc},
    thiserror::Error,
};

pub struct WlShmPool {
    pub id: WlShmPoolId,
    mem: Rc<RefCell<ClientMem>>,
}

impl WlShmPool {
    pub fn new(id: WlShmPoolId, mem: Rc<RefCell<ClientMem>>) -> Self {
        Self { id, mem }
    }

    pub fn size(&self) -> usize {
        self.mem.borrow().len()
    }
}

object_kind!(WlShmPool, WlShmPoolId, ShmPool, WlShmPool);

impl WlShmPoolRequestHandler for WlShmPool {
    type Error = WlShmPoolError;

    fn create_buffer(
        client: &mut Client,
        id: WlShmPoolId,
        req: CreateBuffer,
    ) -> Result<(), Self::Error> {
        let pool = client.objects.lookup::<WlShmPool>(id)?;
        let Some(format) = shm_format(req.format) else {
            return Err(WlShmPoolError::InvalidFormat(req.format));
        };
        if req.offset < 0 || req.width <= 0 || req.height <= 0 || req.stride <= 0 {
            return Err(WlShmPoolError::InvalidGeometry);
        }
        let (offset, width, height, stride) = (
            req.offset as u64,
            req.width as u64,
            req.height as u64,
            req.stride as u64,
        );
        if stride < width * format.bpp as u64 {
            return Err(WlShmPoolError::StrideTooSmall);
        }
        if offset + stride * height > pool.size() as u64 {
            return Err(WlShmPoolError::OutOfBounds);
        }
        let buffer = WlBuffer::new(
            req.id,
            pool.mem.clone(),
            req.offset as usize,
            req.width,
            req.height,
            req.stride as usize,
            format,
        );
        client.objects.add(buffer)?;
        Ok(())
    }

    fn destroy(client: &mut Client, id: WlShmPoolId, _req: Destroy) -> Result<(), Self::Error> {
        let mem = client.objects.lookup::<WlShmPool>(id)?.mem.clone();
        client.remove_obj(id)?;
        if Rc::strong_count(&mem) == 1 {
            mem.borrow_mut().unmap();
        }
        Ok(())
    }

    fn resize(client: &mut Client, id: WlShmPoolId, req: Resize) -> Result<(), Self::Error> {
        let pool = client.objects.lookup::<WlShmPool>(id)?;
        if req.size < 0 || (req.size as usize) < pool.size() {
            return Err(WlShmPoolError::CannotShrink);
        }
        if req.size as usize > pool.size() {
            pool.mem.borrow_mut().remap(req.size as usize)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlShmPoolError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("Format {0} is not supported")]
    InvalidFormat(u32),
    #[error("offset, width, height and stride must be positive")]
    InvalidGeometry,
    #[error("The stride is too small for the width")]
    StrideTooSmall,
    #[error("The buffer does not fit into the pool")]
    OutOfBounds,
    #[error("Pools cannot be shrunk")]
    CannotShrink,
    #[error(transparent)]
    ClientMemError(Box<ClientMemError>),
}
efrom!(WlShmPoolError, ParserError, MsgParserError);
efrom!(WlShmPoolError, ClientError);
efrom!(WlShmPoolError, ClientMemError);

impl RequestError for WlShmPoolError {
    fn code(&self) -> ErrorCode {
        match self {
            WlShmPoolError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlShmPoolError::ClientError(e) => e.code(),
            WlShmPoolError::InvalidFormat(_) => ErrorCode::Interface(INVALID_FORMAT),
            WlShmPoolError::InvalidGeometry
            | WlShmPoolError::StrideTooSmall
            | WlShmPoolError::OutOfBounds
            | WlShmPoolError::CannotShrink => ErrorCode::Interface(INVALID_STRIDE),
            WlShmPoolError::ClientMemError(_) => ErrorCode::Interface(INVALID_FD),
        }
    }
}
