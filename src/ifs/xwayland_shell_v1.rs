use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        globals::XWAYLAND_SHELL_V1,
        ifs::wl_surface::{
            WlSurface,
            role::{RoleError, SurfaceRole, XwaylandRole},
            xwayland_surface_v1::XwaylandSurfaceV1,
        },
        object::ObjectId,
        utils::buffd::MsgParserError,
        wire::{XwaylandShellV1Id, xwayland_shell_v1::*},
    },
    thiserror::Error,
};

const ROLE: u32 = 0;

pub struct XwaylandShellV1 {
    pub id: XwaylandShellV1Id,
}

impl XwaylandShellV1 {
    pub fn bind(client: &mut Client, id: ObjectId) -> Result<(), ClientError> {
        let id = XwaylandShellV1Id::from(id);
        client.objects.add(XwaylandShellV1 { id })
    }
}

object_kind!(XwaylandShellV1, XwaylandShellV1Id, XwaylandShell, XwaylandShellV1);

impl XwaylandShellV1RequestHandler for XwaylandShellV1 {
    type Error = XwaylandShellV1Error;

    fn destroy(
        client: &mut Client,
        id: XwaylandShellV1Id,
        _req: Destroy,
    ) -> Result<(), Self::Error> {
        client.objects.remove_bind(XWAYLAND_SHELL_V1, id.into());
        client.remove_obj(id)?;
        Ok(())
    }

    fn get_xwayland_surface(
        client: &mut Client,
        _id: XwaylandShellV1Id,
        req: GetXwaylandSurface,
    ) -> Result<(), Self::Error> {
        client.objects.check_new_id(req.id)?;
        client
            .objects
            .lookup_mut::<WlSurface>(req.surface)?
            .set_role(SurfaceRole::XwaylandSurface(Some(XwaylandRole {
                xwayland_surface: req.id,
                serial: None,
            })))?;
        client.objects.add(XwaylandSurfaceV1::new(req.id, req.surface))?;
        client.objects.set_role_surface(req.id, req.surface);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum XwaylandShellV1Error {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error(transparent)]
    RoleError(#[from] RoleError),
}
efrom!(XwaylandShellV1Error, ParserError, MsgParserError);
efrom!(XwaylandShellV1Error, ClientError);

impl RequestError for XwaylandShellV1Error {
    fn code(&self) -> ErrorCode {
        match self {
            XwaylandShellV1Error::ParserError(_) => ClientError::InvalidMethod.code(),
            XwaylandShellV1Error::ClientError(e) => e.code(),
            XwaylandShellV1Error::RoleError(_) => ErrorCode::Interface(ROLE),
        }
    }
}
