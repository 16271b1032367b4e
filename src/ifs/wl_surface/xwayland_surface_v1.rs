use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        ifs::wl_surface::WlSurface,
        utils::buffd::MsgParserError,
        wire::{WlSurfaceId, XwaylandSurfaceV1Id, xwayland_surface_v1::*},
    },
    thiserror::Error,
};

const ALREADY_ASSOCIATED: u32 = 0;
const INVALID_SERIAL: u32 = 1;

pub struct XwaylandSurfaceV1 {
    pub id: XwaylandSurfaceV1Id,
    pub surface: WlSurfaceId,
    serial_set: bool,
}

impl XwaylandSurfaceV1 {
    pub fn new(id: XwaylandSurfaceV1Id, surface: WlSurfaceId) -> Self {
        Self {
            id,
            surface,
            serial_set: false,
        }
    }
}

object_kind!(XwaylandSurfaceV1, XwaylandSurfaceV1Id, XwaylandSurface, XwaylandSurfaceV1);

impl XwaylandSurfaceV1RequestHandler for XwaylandSurfaceV1 {
    type Error = XwaylandSurfaceV1Error;

    fn set_serial(
        client: &mut Client,
        id: XwaylandSurfaceV1Id,
        req: SetSerial,
    ) -> Result<(), Self::Error> {
        let serial = req.serial_lo as u64 | ((req.serial_hi as u64) << 32);
        if serial == 0 {
            return Err(XwaylandSurfaceV1Error::InvalidSerial);
        }
        let xs = client.objects.lookup_mut::<XwaylandSurfaceV1>(id)?;
        if xs.serial_set {
            return Err(XwaylandSurfaceV1Error::AlreadyAssociated);
        }
        xs.serial_set = true;
        let surface = xs.surface;
        client
            .objects
            .lookup_mut::<WlSurface>(surface)?
            .pending
            .xwayland_serial = Some(serial);
        Ok(())
    }

    fn destroy(
        client: &mut Client,
        id: XwaylandSurfaceV1Id,
        _req: Destroy,
    ) -> Result<(), Self::Error> {
        let surface = client.objects.lookup::<XwaylandSurfaceV1>(id)?.surface;
        if let Some(surface) = client.objects.get_mut::<WlSurface>(surface) {
            surface.role.clear();
        }
        client.remove_obj(id)?;
        client.objects.refresh_drawable(surface);
        client.publish_scene();
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum XwaylandSurfaceV1Error {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("The surface already has a serial")]
    AlreadyAssociated,
    #[error("Serial 0 is not valid")]
    InvalidSerial,
}
efrom!(XwaylandSurfaceV1Error, ParserError, MsgParserError);
efrom!(XwaylandSurfaceV1Error, ClientError);

impl RequestError for XwaylandSurfaceV1Error {
    fn code(&self) -> ErrorCode {
        match self {
            XwaylandSurfaceV1Error::ParserError(_) => ClientError::InvalidMethod.code(),
            XwaylandSurfaceV1Error::ClientError(e) => e.code(),
            XwaylandSurfaceV1Error::AlreadyAssociated => ErrorCode::Interface(ALREADY_ASSOCIATED),
            XwaylandSurfaceV1Error::InvalidSerial => ErrorCode::Interface(INVALID_SERIAL),
        }
    }
}
