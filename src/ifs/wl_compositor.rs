use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        ifs::{wl_region::WlRegion, wl_surface::WlSurface},
        object::{ObjectId, Version},
        utils::buffd::MsgParserError,
        wire::{WlCompositorId, wl_compositor::*},
    },
    thiserror::Error,
};

pub struct WlCompositor {
    pub id: WlCompositorId,
    pub version: Version,
}

impl WlCompositor {
    pub fn bind(client: &mut Client, id: ObjectId, version: Version) -> Result<(), ClientError> {
        let id = WlCompositorId::from(id);
        client.objects.add(WlCompositor { id, version })
    }
}

object_kind!(WlCompositor, WlCompositorId, Compositor, WlCompositor);

impl WlCompositorRequestHandler for WlCompositor {
    type Error = WlCompositorError;

    fn create_surface(
        client: &mut Client,
        id: WlCompositorId,
        req: CreateSurface,
    ) -> Result<(), Self::Error> {
        let version = client.objects.lookup::<WlCompositor>(id)?.version;
        client.objects.add(WlSurface::new(req.id, version))?;
        Ok(())
    }

    fn create_region(
        client: &mut Client,
        _id: WlCompositorId,
        req: CreateRegion,
    ) -> Result<(), Self::Error> {
        client.objects.add(WlRegion::new(req.id))?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlCompositorError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
}
efrom!(WlCompositorError, ParserError, MsgParserError);
efrom!(WlCompositorError, ClientError);

impl RequestError for WlCompositorError {
    fn code(&self) -> ErrorCode {
        match self {
            WlCompositorError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlCompositorError::ClientError(e) => e.code(),
        }
    }
}
