use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        ifs::wl_surface::WlSurface,
        utils::buffd::MsgParserError,
        wire::{WlSurfaceId, XdgSurfaceId, XdgToplevelId, xdg_toplevel::*},
    },
    thiserror::Error,
};

const INVALID_PARENT: u32 = 1;
const INVALID_SIZE: u32 = 2;

pub struct XdgToplevel {
    pub id: XdgToplevelId,
    pub xdg_surface: XdgSurfaceId,
    pub surface: WlSurfaceId,
    pub parent: Option<XdgToplevelId>,
    pub title: String,
    pub app_id: String,
    /// `(0, 0)` means unconstrained.
    pub min_size: (i32, i32),
    pub max_size: (i32, i32),
}

impl XdgToplevel {
    pub fn new(id: XdgToplevelId, xdg_surface: XdgSurfaceId, surface: WlSurfaceId) -> Self {
        Self {
            id,
            xdg_surface,
            surface,
            parent: None,
            title: String::new(),
            app_id: String::new(),
            min_size: (0, 0),
            max_size: (0, 0),
        }
    }

    /// Lets the client choose its own size.
    pub fn send_configure(client: &mut Client, id: XdgToplevelId) {
        client.event(Configure {
            self_id: id,
            width: 0,
            height: 0,
            states: vec![],
        });
    }
}

object_kind!(XdgToplevel, XdgToplevelId, XdgToplevel, XdgToplevel);

fn surface_of(client: &Client, id: XdgToplevelId) -> Result<WlSurfaceId, XdgToplevelError> {
    match client.objects.role_surface(id) {
        Some(surface) => Ok(surface),
        None => Err(ClientError::InvalidObject(id.into()).into()),
    }
}

fn check_size(width: i32, height: i32) -> Result<(i32, i32), XdgToplevelError> {
    if width < 0 || height < 0 {
        return Err(XdgToplevelError::NegativeSize(width, height));
    }
    Ok((width, height))
}

impl XdgToplevelRequestHandler for XdgToplevel {
    type Error = XdgToplevelError;

    fn destroy(client: &mut Client, id: XdgToplevelId, _req: Destroy) -> Result<(), Self::Error> {
        let surface = surface_of(client, id)?;
        if let Some(surface) = client.objects.get_mut::<WlSurface>(surface) {
            surface.role.clear();
        }
        client.objects.remove_toplevel(id);
        client.remove_obj(id)?;
        client.objects.refresh_drawable(surface);
        client.publish_scene();
        Ok(())
    }

    fn set_parent(client: &mut Client, id: XdgToplevelId, req: SetParent) -> Result<(), Self::Error> {
        if let Some(parent) = req.parent {
            client.objects.lookup::<XdgToplevel>(parent)?;
            let mut cur = Some(parent);
            while let Some(p) = cur {
                if p == id {
                    return Err(XdgToplevelError::ParentLoop);
                }
                cur = client.objects.get::<XdgToplevel>(p).and_then(|t| t.parent);
            }
        }
        client.objects.lookup_mut::<XdgToplevel>(id)?.parent = req.parent;
        Ok(())
    }

    fn set_title(client: &mut Client, id: XdgToplevelId, req: SetTitle) -> Result<(), Self::Error> {
        log::debug!("Client {}: toplevel {} is titled {:?}", client.id, id, req.title);
        client.objects.lookup_mut::<XdgToplevel>(id)?.title = req.title;
        Ok(())
    }

    fn set_app_id(client: &mut Client, id: XdgToplevelId, req: SetAppId) -> Result<(), Self::Error> {
        client.objects.lookup_mut::<XdgToplevel>(id)?.app_id = req.app_id;
        Ok(())
    }

    fn show_window_menu(
        _client: &mut Client,
        _id: XdgToplevelId,
        _req: ShowWindowMenu,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn move_(_client: &mut Client, _id: XdgToplevelId, _req: Move) -> Result<(), Self::Error> {
        Ok(())
    }

    fn resize(_client: &mut Client, _id: XdgToplevelId, _req: Resize) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_max_size(
        client: &mut Client,
        id: XdgToplevelId,
        req: SetMaxSize,
    ) -> Result<(), Self::Error> {
        let size = check_size(req.width, req.height)?;
        let surface = surface_of(client, id)?;
        client.objects.lookup_mut::<WlSurface>(surface)?.pending.max_size = Some(size);
        Ok(())
    }

    fn set_min_size(
        client: &mut Client,
        id: XdgToplevelId,
        req: SetMinSize,
    ) -> Result<(), Self::Error> {
        let size = check_size(req.width, req.height)?;
        let surface = surface_of(client, id)?;
        client.objects.lookup_mut::<WlSurface>(surface)?.pending.min_size = Some(size);
        Ok(())
    }

    fn set_maximized(
        client: &mut Client,
        id: XdgToplevelId,
        _req: SetMaximized,
    ) -> Result<(), Self::Error> {
        surface_of(client, id)?;
        Ok(())
    }

    fn unset_maximized(
        client: &mut Client,
        id: XdgToplevelId,
        _req: UnsetMaximized,
    ) -> Result<(), Self::Error> {
        surface_of(client, id)?;
        Ok(())
    }

    fn set_fullscreen(
        client: &mut Client,
        id: XdgToplevelId,
        _req: SetFullscreen,
    ) -> Result<(), Self::Error> {
        surface_of(client, id)?;
        Ok(())
    }

    fn unset_fullscreen(
        client: &mut Client,
        id: XdgToplevelId,
        _req: UnsetFullscreen,
    ) -> Result<(), Self::Error> {
        surface_of(client, id)?;
        Ok(())
    }

    fn set_minimized(
        client: &mut Client,
        id: XdgToplevelId,
        _req: SetMinimized,
    ) -> Result<(), Self::Error> {
        surface_of(client, id)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum XdgToplevelError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("Size {0}x{1} is negative")]
    NegativeSize(i32, i32),
    #[error("The parent would create a loop")]
    ParentLoop,
}
efrom!(XdgToplevelError, ParserError, MsgParserError);
efrom!(XdgToplevelError, ClientError);

impl RequestError for XdgToplevelError {
    fn code(&self) -> ErrorCode {
        match self {
            XdgToplevelError::ParserError(_) => ClientError::InvalidMethod.code(),
            XdgToplevelError::ClientError(e) => e.code(),
            XdgToplevelError::NegativeSize(..) => ErrorCode::Interface(INVALID_SIZE),
            XdgToplevelError::ParentLoop => ErrorCode::Interface(INVALID_PARENT),
        }
    }
}
