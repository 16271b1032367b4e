use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        ifs::wl_surface::{
            WlSurface,
            xdg_surface::{XdgSurfaceError, configure_popup},
        },
        utils::buffd::MsgParserError,
        wire::{WlSurfaceId, XdgPopupId, XdgSurfaceId, xdg_popup::*},
    },
    thiserror::Error,
};

pub struct XdgPopup {
    pub id: XdgPopupId,
    pub xdg_surface: XdgSurfaceId,
    pub surface: WlSurfaceId,
    /// The surface the popup is drawn above. Without a parent the popup is drawn as a root.
    pub parent_surface: Option<WlSurfaceId>,
}

impl XdgPopup {
    pub fn new(
        id: XdgPopupId,
        xdg_surface: XdgSurfaceId,
        surface: WlSurfaceId,
        parent_surface: Option<WlSurfaceId>,
    ) -> Self {
        Self {
            id,
            xdg_surface,
            surface,
            parent_surface,
        }
    }
}

object_kind!(XdgPopup, XdgPopupId, XdgPopup, XdgPopup);

impl XdgPopupRequestHandler for XdgPopup {
    type Error = XdgPopupError;

    fn destroy(client: &mut Client, id: XdgPopupId, _req: Destroy) -> Result<(), Self::Error> {
        let surface = client.objects.lookup::<XdgPopup>(id)?.surface;
        if let Some(surface) = client.objects.get_mut::<WlSurface>(surface) {
            surface.role.clear();
        }
        client.remove_obj(id)?;
        client.objects.refresh_drawable(surface);
        client.publish_scene();
        Ok(())
    }

    fn grab(client: &mut Client, id: XdgPopupId, _req: Grab) -> Result<(), Self::Error> {
        client.objects.lookup::<XdgPopup>(id)?;
        Ok(())
    }

    fn reposition(client: &mut Client, id: XdgPopupId, req: Reposition) -> Result<(), Self::Error> {
        client.objects.lookup::<XdgPopup>(id)?;
        client.event(Repositioned {
            self_id: id,
            token: req.token,
        });
        configure_popup(client, id, req.positioner)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum XdgPopupError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error(transparent)]
    XdgSurfaceError(Box<XdgSurfaceError>),
}
efrom!(XdgPopupError, ParserError, MsgParserError);
efrom!(XdgPopupError, ClientError);
efrom!(XdgPopupError, XdgSurfaceError);

impl RequestError for XdgPopupError {
    fn code(&self) -> ErrorCode {
        match self {
            XdgPopupError::ParserError(_) => ClientError::InvalidMethod.code(),
            XdgPopupError::ClientError(e) => e.code(),
            XdgPopupError::XdgSurfaceError(e) => e.code(),
        }
    }
}
