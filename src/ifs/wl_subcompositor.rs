use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        globals::WL_SUBCOMPOSITOR,
        ifs::wl_surface::{
            WlSurface,
            role::{RoleError, SubsurfaceRole, SurfaceRole},
            wl_subsurface::WlSubsurface,
        },
        object::ObjectId,
        utils::buffd::MsgParserError,
        wire::{WlSubcompositorId, WlSurfaceId, wl_subcompositor::*},
    },
    thiserror::Error,
};

const BAD_SURFACE: u32 = 0;
const BAD_PARENT: u32 = 1;

pub struct WlSubcompositor {
    pub id: WlSubcompositorId,
}

impl WlSubcompositor {
    pub fn bind(client: &mut Client, id: ObjectId) -> Result<(), ClientError> {
        let id = WlSubcompositorId::from(id);
        client.objects.add(WlSubcompositor { id })
    }
}

object_kind!(WlSubcompositor, WlSubcompositorId, Subcompositor, WlSubcompositor);

/// Returns whether `ancestor` is `surface` or one of its subsurface parents.
fn is_ancestor(client: &Client, surface: WlSurfaceId, ancestor: WlSurfaceId) -> bool {
    let mut cur = Some(surface);
    while let Some(id) = cur {
        if id == ancestor {
            return true;
        }
        cur = client
            .objects
            .get::<WlSurface>(id)
            .and_then(|s| s.role.subsurface())
            .map(|s| s.parent);
    }
    false
}

impl WlSubcompositorRequestHandler for WlSubcompositor {
    type Error = WlSubcompositorError;

    fn destroy(
        client: &mut Client,
        id: WlSubcompositorId,
        _req: Destroy,
    ) -> Result<(), Self::Error> {
        client.objects.remove_bind(WL_SUBCOMPOSITOR, id.into());
        client.remove_obj(id)?;
        Ok(())
    }

    fn get_subsurface(
        client: &mut Client,
        _id: WlSubcompositorId,
        req: GetSubsurface,
    ) -> Result<(), Self::Error> {
        client.objects.lookup::<WlSurface>(req.parent)?;
        client.objects.lookup::<WlSurface>(req.surface)?;
        client.objects.check_new_id(req.id)?;
        if is_ancestor(client, req.parent, req.surface) {
            return Err(WlSubcompositorError::BadParent);
        }
        let surface = client.objects.lookup_mut::<WlSurface>(req.surface)?;
        surface.set_role(SurfaceRole::Subsurface(Some(SubsurfaceRole {
            subsurface: req.id,
            parent: req.parent,
            sync: true,
            x: 0,
            y: 0,
        })))?;
        client
            .objects
            .add(WlSubsurface::new(req.id, req.surface, req.parent))?;
        client.objects.set_role_surface(req.id, req.surface);
        client
            .objects
            .lookup_mut::<WlSurface>(req.parent)?
            .pending
            .subsurfaces
            .push(req.surface);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlSubcompositorError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("The parent is the surface itself or one of its descendants")]
    BadParent,
    #[error(transparent)]
    RoleError(#[from] RoleError),
}
efrom!(WlSubcompositorError, ParserError, MsgParserError);
efrom!(WlSubcompositorError, ClientError);

impl RequestError for WlSubcompositorError {
    fn code(&self) -> ErrorCode {
        match self {
            WlSubcompositorError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlSubcompositorError::ClientError(e) => e.code(),
            WlSubcompositorError::BadParent => ErrorCode::Interface(BAD_PARENT),
            WlSubcompositorError::RoleError(_) => ErrorCode::Interface(BAD_SURFACE),
        }
    }
}
