use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        ifs::wl_surface::{WlSurface, ZMove},
        utils::buffd::MsgParserError,
        wire::{WlSubsurfaceId, WlSurfaceId, wl_subsurface::*},
    },
    thiserror::Error,
};

const BAD_SURFACE: u32 = 0;

pub struct WlSubsurface {
    pub id: WlSubsurfaceId,
    pub surface: WlSurfaceId,
    pub parent: WlSurfaceId,
}

impl WlSubsurface {
    pub fn new(id: WlSubsurfaceId, surface: WlSurfaceId, parent: WlSurfaceId) -> Self {
        Self {
            id,
            surface,
            parent,
        }
    }
}

object_kind!(WlSubsurface, WlSubsurfaceId, Subsurface, WlSubsurface);

fn place(
    client: &mut Client,
    id: WlSubsurfaceId,
    sibling: WlSurfaceId,
    above: bool,
) -> Result<(), WlSubsurfaceError> {
    let ss = client.objects.lookup::<WlSubsurface>(id)?;
    let (surface, parent) = (ss.surface, ss.parent);
    let relative_to = if sibling == parent {
        None
    } else {
        let is_sibling = client
            .objects
            .get::<WlSurface>(sibling)
            .and_then(|s| s.role.subsurface())
            .is_some_and(|s| s.parent == parent);
        if !is_sibling || sibling == surface {
            return Err(WlSubsurfaceError::NotASibling(sibling));
        }
        Some(sibling)
    };
    if let Some(parent) = client.objects.get_mut::<WlSurface>(parent) {
        parent.pending.z_moves.push(ZMove {
            child: surface,
            relative_to,
            above,
        });
    }
    Ok(())
}

fn set_sync(client: &mut Client, id: WlSubsurfaceId, sync: bool) -> Result<(), WlSubsurfaceError> {
    let surface = client.objects.lookup::<WlSubsurface>(id)?.surface;
    let surface = client.objects.lookup_mut::<WlSurface>(surface)?;
    if let Some(role) = surface.role.subsurface_mut() {
        role.sync = sync;
    }
    Ok(())
}

impl WlSubsurfaceRequestHandler for WlSubsurface {
    type Error = WlSubsurfaceError;

    fn destroy(client: &mut Client, id: WlSubsurfaceId, _req: Destroy) -> Result<(), Self::Error> {
        let ss = client.objects.lookup::<WlSubsurface>(id)?;
        let (surface, parent) = (ss.surface, ss.parent);
        if let Some(s) = client.objects.get_mut::<WlSurface>(surface) {
            s.role.clear();
        }
        if let Some(p) = client.objects.get_mut::<WlSurface>(parent) {
            p.children.retain(|c| *c != surface);
            p.pending.subsurfaces.retain(|c| *c != surface);
            p.pending.child_positions.retain(|(c, _, _)| *c != surface);
            p.pending.z_moves.retain(|m| m.child != surface);
        }
        client.remove_obj(id)?;
        client.objects.refresh_drawable(surface);
        client.publish_scene();
        Ok(())
    }

    fn set_position(
        client: &mut Client,
        id: WlSubsurfaceId,
        req: SetPosition,
    ) -> Result<(), Self::Error> {
        let ss = client.objects.lookup::<WlSubsurface>(id)?;
        let (surface, parent) = (ss.surface, ss.parent);
        if let Some(parent) = client.objects.get_mut::<WlSurface>(parent) {
            parent
                .pending
                .child_positions
                .push((surface, req.x, req.y));
        }
        Ok(())
    }

    fn place_above(
        client: &mut Client,
        id: WlSubsurfaceId,
        req: PlaceAbove,
    ) -> Result<(), Self::Error> {
        place(client, id, req.sibling, true)
    }

    fn place_below(
        client: &mut Client,
        id: WlSubsurfaceId,
        req: PlaceBelow,
    ) -> Result<(), Self::Error> {
        place(client, id, req.sibling, false)
    }

    fn set_sync(client: &mut Client, id: WlSubsurfaceId, _req: SetSync) -> Result<(), Self::Error> {
        set_sync(client, id, true)
    }

    fn set_desync(
        client: &mut Client,
        id: WlSubsurfaceId,
        _req: SetDesync,
    ) -> Result<(), Self::Error> {
        set_sync(client, id, false)
    }
}

#[derive(Debug, Error)]
pub enum WlSubsurfaceError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("Surface {0} is neither the parent nor a sibling")]
    NotASibling(WlSurfaceId),
}
efrom!(WlSubsurfaceError, ParserError, MsgParserError);
efrom!(WlSubsurfaceError, ClientError);

impl RequestError for WlSubsurfaceError {
    fn code(&self) -> ErrorCode {
        match self {
            WlSubsurfaceError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlSubsurfaceError::ClientError(e) => e.code(),
            WlSubsurfaceError::NotASibling(_) => ErrorCode::Interface(BAD_SURFACE),
        }
    }
}
