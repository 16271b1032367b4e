use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        ifs::{
            wl_surface::{
                WlSurface,
                role::{PopupRole, RoleError, SurfaceRole, ToplevelRole},
                xdg_popup::XdgPopup,
                xdg_toplevel::XdgToplevel,
            },
            xdg_positioner::XdgPositioner,
        },
        rect::Rect,
        utils::buffd::MsgParserError,
        wire::{
            WlSurfaceId, XdgPopupId, XdgPositionerId, XdgSurfaceId, XdgWmBaseId, xdg_popup,
            xdg_surface::*,
        },
    },
    thiserror::Error,
};

const ALREADY_CONSTRUCTED: u32 = 2;
const INVALID_SERIAL: u32 = 4;
const INVALID_SIZE: u32 = 5;
const DEFUNCT_ROLE_OBJECT: u32 = 6;

pub struct XdgSurface {
    pub id: XdgSurfaceId,
    pub surface: WlSurfaceId,
    pub wm_base: XdgWmBaseId,
    /// The window geometry as of the last commit.
    pub geometry: Option<Rect>,
    last_serial: u32,
    pub acked_serial: Option<u32>,
}

impl XdgSurface {
    pub fn new(id: XdgSurfaceId, surface: WlSurfaceId, wm_base: XdgWmBaseId) -> Self {
        Self {
            id,
            surface,
            wm_base,
            geometry: None,
            last_serial: 0,
            acked_serial: None,
        }
    }

    /// Ends a configure sequence.
    pub fn send_configure(client: &mut Client, id: XdgSurfaceId) {
        let serial = client.next_serial();
        if let Some(xdg) = client.objects.get_mut::<XdgSurface>(id) {
            xdg.last_serial = serial;
        }
        client.event(Configure {
            self_id: id,
            serial,
        });
    }
}

object_kind!(XdgSurface, XdgSurfaceId, XdgSurface, XdgSurface);

/// Places a popup according to its positioner and announces the result.
pub fn configure_popup(
    client: &mut Client,
    popup: XdgPopupId,
    positioner: XdgPositionerId,
) -> Result<(), XdgSurfaceError> {
    let positioning = client
        .objects
        .lookup::<XdgPositioner>(positioner)?
        .positioning;
    if !positioning.is_complete() {
        return Err(XdgSurfaceError::IncompletePositioner);
    }
    let geometry = positioning.geometry();
    let popup = client.objects.lookup::<XdgPopup>(popup)?;
    let (popup_id, xdg_surface, surface) = (popup.id, popup.xdg_surface, popup.surface);
    if let Some(surface) = client.objects.get_mut::<WlSurface>(surface) {
        surface.x = geometry.x1();
        surface.y = geometry.y1();
    }
    client.event(xdg_popup::Configure {
        self_id: popup_id,
        x: geometry.x1(),
        y: geometry.y1(),
        width: geometry.width(),
        height: geometry.height(),
    });
    XdgSurface::send_configure(client, xdg_surface);
    Ok(())
}

impl XdgSurfaceRequestHandler for XdgSurface {
    type Error = XdgSurfaceError;

    fn destroy(client: &mut Client, id: XdgSurfaceId, _req: Destroy) -> Result<(), Self::Error> {
        let surface = client.objects.lookup::<XdgSurface>(id)?.surface;
        if let Some(surface) = client.objects.get_mut::<WlSurface>(surface) {
            let role_alive = surface.role.toplevel().is_some() || surface.role.popup().is_some();
            if role_alive {
                return Err(XdgSurfaceError::DefunctRoleObject);
            }
            surface.xdg_surface = None;
        }
        client.remove_obj(id)?;
        Ok(())
    }

    fn get_toplevel(
        client: &mut Client,
        id: XdgSurfaceId,
        req: GetToplevel,
    ) -> Result<(), Self::Error> {
        client.objects.check_new_id(req.id)?;
        let surface = client.objects.lookup::<XdgSurface>(id)?.surface;
        client
            .objects
            .lookup_mut::<WlSurface>(surface)?
            .set_role(SurfaceRole::XdgToplevel(Some(ToplevelRole {
                toplevel: req.id,
                xdg_surface: id,
            })))?;
        client.objects.add(XdgToplevel::new(req.id, id, surface))?;
        client.objects.set_role_surface(req.id, surface);
        client.objects.add_toplevel(req.id);
        XdgToplevel::send_configure(client, req.id);
        XdgSurface::send_configure(client, id);
        Ok(())
    }

    fn get_popup(client: &mut Client, id: XdgSurfaceId, req: GetPopup) -> Result<(), Self::Error> {
        client.objects.check_new_id(req.id)?;
        client.objects.lookup::<XdgPositioner>(req.positioner)?;
        let parent_surface = match req.parent {
            Some(parent) => Some(client.objects.lookup::<XdgSurface>(parent)?.surface),
            None => None,
        };
        let surface = client.objects.lookup::<XdgSurface>(id)?.surface;
        client
            .objects
            .lookup_mut::<WlSurface>(surface)?
            .set_role(SurfaceRole::XdgPopup(Some(PopupRole {
                popup: req.id,
                xdg_surface: id,
            })))?;
        client.objects.add(XdgPopup::new(req.id, id, surface, parent_surface))?;
        client.objects.set_role_surface(req.id, surface);
        configure_popup(client, req.id, req.positioner)
    }

    fn set_window_geometry(
        client: &mut Client,
        id: XdgSurfaceId,
        req: SetWindowGeometry,
    ) -> Result<(), Self::Error> {
        if req.width <= 0 || req.height <= 0 {
            return Err(XdgSurfaceError::NonPositiveSize);
        }
        let geometry = Rect::new_sized_saturating(req.x, req.y, req.width, req.height);
        let surface = client.objects.lookup::<XdgSurface>(id)?.surface;
        client
            .objects
            .lookup_mut::<WlSurface>(surface)?
            .pending
            .window_geometry = Some(geometry);
        Ok(())
    }

    fn ack_configure(
        client: &mut Client,
        id: XdgSurfaceId,
        req: AckConfigure,
    ) -> Result<(), Self::Error> {
        let xdg = client.objects.lookup_mut::<XdgSurface>(id)?;
        if req.serial == 0 || req.serial > xdg.last_serial {
            return Err(XdgSurfaceError::InvalidSerial(req.serial));
        }
        xdg.acked_serial = Some(req.serial);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum XdgSurfaceError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error(transparent)]
    RoleError(#[from] RoleError),
    #[error("The role object must be destroyed before the xdg_surface")]
    DefunctRoleObject,
    #[error("Serial {0} was never sent")]
    InvalidSerial(u32),
    #[error("Cannot set a non-positive window geometry")]
    NonPositiveSize,
    #[error("The positioner lacks a size or an anchor rect")]
    IncompletePositioner,
}
efrom!(XdgSurfaceError, ParserError, MsgParserError);
efrom!(XdgSurfaceError, ClientError);

impl RequestError for XdgSurfaceError {
    fn code(&self) -> ErrorCode {
        match self {
            XdgSurfaceError::ParserError(_) => ClientError::InvalidMethod.code(),
            XdgSurfaceError::ClientError(e) => e.code(),
            XdgSurfaceError::RoleError(_) => ErrorCode::Interface(ALREADY_CONSTRUCTED),
            XdgSurfaceError::DefunctRoleObject => ErrorCode::Interface(DEFUNCT_ROLE_OBJECT),
            XdgSurfaceError::InvalidSerial(_) => ErrorCode::Interface(INVALID_SERIAL),
            XdgSurfaceError::NonPositiveSize | XdgSurfaceError::IncompletePositioner => {
                ErrorCode::Interface(INVALID_SIZE)
            }
        }
    }
}
