use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        globals::XDG_WM_BASE,
        ifs::{
            wl_surface::{WlSurface, xdg_surface::XdgSurface},
            xdg_positioner::XdgPositioner,
        },
        object::ObjectId,
        utils::buffd::MsgParserError,
        wire::{XdgWmBaseId, xdg_wm_base::*},
    },
    thiserror::Error,
};

const ROLE: u32 = 0;
const DEFUNCT_SURFACES: u32 = 1;

pub struct XdgWmBase {
    pub id: XdgWmBaseId,
}

impl XdgWmBase {
    pub fn bind(client: &mut Client, id: ObjectId) -> Result<(), ClientError> {
        let id = XdgWmBaseId::from(id);
        client.objects.add(XdgWmBase { id })
    }
}

object_kind!(XdgWmBase, XdgWmBaseId, XdgWmBase, XdgWmBase);

impl XdgWmBaseRequestHandler for XdgWmBase {
    type Error = XdgWmBaseError;

    fn destroy(client: &mut Client, id: XdgWmBaseId, _req: Destroy) -> Result<(), Self::Error> {
        let live = client
            .objects
            .all::<XdgSurface>()
            .filter(|s| s.wm_base == id)
            .count();
        if live > 0 {
            return Err(XdgWmBaseError::DefunctSurfaces(live));
        }
        client.objects.remove_bind(XDG_WM_BASE, id.into());
        client.remove_obj(id)?;
        Ok(())
    }

    fn create_positioner(
        client: &mut Client,
        _id: XdgWmBaseId,
        req: CreatePositioner,
    ) -> Result<(), Self::Error> {
        client.objects.add(XdgPositioner::new(req.id))?;
        Ok(())
    }

    fn get_xdg_surface(
        client: &mut Client,
        id: XdgWmBaseId,
        req: GetXdgSurface,
    ) -> Result<(), Self::Error> {
        client.objects.check_new_id(req.id)?;
        let surface = client.objects.lookup_mut::<WlSurface>(req.surface)?;
        if let Some(xdg) = surface.xdg_surface {
            return Err(XdgWmBaseError::AlreadyXdgSurface(xdg.into()));
        }
        if surface.role.has_payload() {
            return Err(XdgWmBaseError::HasRole);
        }
        surface.xdg_surface = Some(req.id);
        client.objects.add(XdgSurface::new(req.id, req.surface, id))?;
        client.objects.set_role_surface(req.id, req.surface);
        Ok(())
    }

    fn pong(_client: &mut Client, _id: XdgWmBaseId, _req: Pong) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum XdgWmBaseError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("The surface already has the xdg_surface {0}")]
    AlreadyXdgSurface(ObjectId),
    #[error("The surface already has a role object")]
    HasRole,
    #[error("Cannot destroy the xdg_wm_base while {0} xdg_surfaces are alive")]
    DefunctSurfaces(usize),
}
efrom!(XdgWmBaseError, ParserError, MsgParserError);
efrom!(XdgWmBaseError, ClientError);

impl RequestError for XdgWmBaseError {
    fn code(&self) -> ErrorCode {
        match self {
            XdgWmBaseError::ParserError(_) => ClientError::InvalidMethod.code(),
            XdgWmBaseError::ClientError(e) => e.code(),
            XdgWmBaseError::AlreadyXdgSurface(_) | XdgWmBaseError::HasRole => {
                ErrorCode::Interface(ROLE)
            }
            XdgWmBaseError::DefunctSurfaces(_) => ErrorCode::Interface(DEFUNCT_SURFACES),
        }
    }
}
