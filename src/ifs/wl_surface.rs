pub mod commit;
pub mod role;
pub mod wl_subsurface;
pub mod xdg_popup;
pub mod xdg_surface;
pub mod xdg_toplevel;
pub mod xwayland_surface_v1;

use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        ifs::{
            wl_buffer::WlBuffer,
            wl_callback::WlCallback,
            wl_region::WlRegion,
            wl_surface::{
                commit::{BufferSwap, commit},
                role::{RoleError, SurfaceRole},
            },
        },
        object::Version,
        rect::{Rect, Region},
        utils::{buffd::MsgParserError, errorfmt::ErrorFmt},
        wire::{
            WlBufferId, WlCallbackId, WlSurfaceId, XdgSurfaceId, wl_buffer::Release,
            wl_surface::*,
        },
    },
    std::{rc::Rc, sync::Arc},
    thiserror::Error,
    tiny_skia::Pixmap,
};

const INVALID_SCALE: u32 = 0;
const INVALID_TRANSFORM: u32 = 1;
const INVALID_OFFSET: u32 = 3;
const DEFUNCT_ROLE_OBJECT: u32 = 4;

const OFFSET_SINCE: Version = Version(5);

/// A z-order change of a child surface staged on its parent.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ZMove {
    pub child: WlSurfaceId,
    /// `None` means relative to the parent itself.
    pub relative_to: Option<WlSurfaceId>,
    pub above: bool,
}

/// State staged since the last commit.
#[derive(Default)]
pub struct PendingUpdate {
    pub buffer: Option<Option<WlBufferId>>,
    pub offset: Option<(i32, i32)>,
    pub damage: Vec<Rect>,
    pub damage_buffer: Vec<Rect>,
    pub scale: Option<i32>,
    pub transform: Option<i32>,
    pub input_region: Option<Option<Rc<Region>>>,
    pub opaque_region: Option<Option<Rc<Region>>>,
    pub subsurfaces: Vec<WlSurfaceId>,
    pub child_positions: Vec<(WlSurfaceId, i32, i32)>,
    pub z_moves: Vec<ZMove>,
    pub window_geometry: Option<Rect>,
    pub min_size: Option<(i32, i32)>,
    pub max_size: Option<(i32, i32)>,
    pub xwayland_serial: Option<u64>,
    pub frame_callbacks: Vec<WlCallbackId>,
}

pub struct WlSurface {
    pub id: WlSurfaceId,
    pub version: Version,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Accumulated attach offsets.
    pub offset: (i32, i32),
    pub scale: i32,
    pub transform: i32,
    pub buffer: Option<WlBufferId>,
    pub texture: Option<Arc<Pixmap>>,
    pub has_committed_buffer: bool,
    pub input_region: Option<Rc<Region>>,
    pub opaque_region: Option<Rc<Region>>,
    /// Draw order of the subsurfaces. Later entries are drawn on top.
    pub children: Vec<WlSurfaceId>,
    pub role: SurfaceRole,
    pub damaged: bool,
    pub xdg_surface: Option<XdgSurfaceId>,
    pub pending: PendingUpdate,
}

impl WlSurface {
    pub fn new(id: WlSurfaceId, version: Version) -> Self {
        Self {
            id,
            version,
            x: 0,
            y: 0,
            z: 0,
            offset: (0, 0),
            scale: 1,
            transform: 0,
            buffer: None,
            texture: None,
            has_committed_buffer: false,
            input_region: None,
            opaque_region: None,
            children: vec![],
            role: SurfaceRole::Unassigned,
            damaged: false,
            xdg_surface: None,
            pending: Default::default(),
        }
    }

    pub fn set_role(&mut self, role: SurfaceRole) -> Result<(), RoleError> {
        self.role.assign(role)
    }
}

object_kind!(WlSurface, WlSurfaceId, Surface, WlSurface);

fn surface_mut(client: &mut Client, id: WlSurfaceId) -> Result<&mut WlSurface, ClientError> {
    client.objects.lookup_mut::<WlSurface>(id)
}

fn region_snapshot(
    client: &mut Client,
    region: Option<crate::wire::WlRegionId>,
) -> Result<Option<Rc<Region>>, ClientError> {
    match region {
        Some(id) => Ok(Some(client.objects.lookup_mut::<WlRegion>(id)?.region())),
        None => Ok(None),
    }
}

impl WlSurfaceRequestHandler for WlSurface {
    type Error = WlSurfaceError;

    fn destroy(client: &mut Client, id: WlSurfaceId, _req: Destroy) -> Result<(), Self::Error> {
        let children = {
            let surface = surface_mut(client, id)?;
            surface.role.check_teardown()?;
            surface.children.clone()
        };
        client.remove_obj(id)?;
        for child in children {
            client.objects.refresh_drawable(child);
        }
        client.publish_scene();
        Ok(())
    }

    fn attach(client: &mut Client, id: WlSurfaceId, req: Attach) -> Result<(), Self::Error> {
        if let Some(buffer) = req.buffer {
            client.objects.lookup::<WlBuffer>(buffer)?;
        }
        let surface = surface_mut(client, id)?;
        if req.x != 0 || req.y != 0 {
            if surface.version >= OFFSET_SINCE {
                return Err(WlSurfaceError::OffsetInAttach);
            }
            surface.pending.offset = Some((req.x, req.y));
        }
        surface.pending.buffer = Some(req.buffer);
        Ok(())
    }

    fn damage(client: &mut Client, id: WlSurfaceId, req: Damage) -> Result<(), Self::Error> {
        let rect = Rect::new_sized_saturating(req.x, req.y, req.width, req.height);
        surface_mut(client, id)?.pending.damage.push(rect);
        Ok(())
    }

    fn frame(client: &mut Client, id: WlSurfaceId, req: Frame) -> Result<(), Self::Error> {
        surface_mut(client, id)?;
        client.objects.add(WlCallback::new(req.callback))?;
        surface_mut(client, id)?
            .pending
            .frame_callbacks
            .push(req.callback);
        Ok(())
    }

    fn set_opaque_region(
        client: &mut Client,
        id: WlSurfaceId,
        req: SetOpaqueRegion,
    ) -> Result<(), Self::Error> {
        let region = region_snapshot(client, req.region)?;
        surface_mut(client, id)?.pending.opaque_region = Some(region);
        Ok(())
    }

    fn set_input_region(
        client: &mut Client,
        id: WlSurfaceId,
        req: SetInputRegion,
    ) -> Result<(), Self::Error> {
        let region = region_snapshot(client, req.region)?;
        surface_mut(client, id)?.pending.input_region = Some(region);
        Ok(())
    }

    fn commit(client: &mut Client, id: WlSurfaceId, _req: Commit) -> Result<(), Self::Error> {
        let z = {
            let surface = surface_mut(client, id)?;
            if surface.role.is_sync_subsurface() {
                return Ok(());
            }
            surface.z
        };
        let swaps = commit(&mut client.objects, id, false, z);
        apply_buffer_swaps(client, swaps);
        client.objects.refresh_drawable(id);
        client.publish_scene();
        Ok(())
    }

    fn set_buffer_transform(
        client: &mut Client,
        id: WlSurfaceId,
        req: SetBufferTransform,
    ) -> Result<(), Self::Error> {
        if !(0..=7).contains(&req.transform) {
            return Err(WlSurfaceError::InvalidTransform(req.transform));
        }
        surface_mut(client, id)?.pending.transform = Some(req.transform);
        Ok(())
    }

    fn set_buffer_scale(
        client: &mut Client,
        id: WlSurfaceId,
        req: SetBufferScale,
    ) -> Result<(), Self::Error> {
        if req.scale < 1 {
            return Err(WlSurfaceError::InvalidScale(req.scale));
        }
        surface_mut(client, id)?.pending.scale = Some(req.scale);
        Ok(())
    }

    fn damage_buffer(
        client: &mut Client,
        id: WlSurfaceId,
        req: DamageBuffer,
    ) -> Result<(), Self::Error> {
        let rect = Rect::new_sized_saturating(req.x, req.y, req.width, req.height);
        surface_mut(client, id)?.pending.damage_buffer.push(rect);
        Ok(())
    }

    fn offset(client: &mut Client, id: WlSurfaceId, req: Offset) -> Result<(), Self::Error> {
        surface_mut(client, id)?.pending.offset = Some((req.x, req.y));
        Ok(())
    }
}

/// Makes the buffers recorded during a commit visible.
///
/// The pixels are copied out of the shared memory so the buffer is released right away.
pub fn apply_buffer_swaps(client: &mut Client, swaps: Vec<BufferSwap>) {
    for swap in swaps {
        let texture = match swap.buffer {
            Some(buffer) => match client.objects.get::<WlBuffer>(buffer) {
                Some(buffer) => match buffer.to_pixmap() {
                    Ok(pixmap) => Some(Arc::new(pixmap)),
                    Err(e) => {
                        log::warn!(
                            "Client {}: Could not read buffer {}: {}",
                            client.id,
                            buffer.id,
                            ErrorFmt(e)
                        );
                        None
                    }
                },
                None => None,
            },
            None => None,
        };
        if let Some(surface) = client.objects.get_mut::<WlSurface>(swap.surface) {
            surface.buffer = swap.buffer;
            surface.texture = texture;
            surface.z = swap.z;
            if swap.buffer.is_some() {
                surface.has_committed_buffer = true;
            }
        }
        if let Some(buffer) = swap.buffer {
            if client.objects.get::<WlBuffer>(buffer).is_some() {
                client.event(Release { self_id: buffer });
            }
        }
        client.objects.refresh_drawable(swap.surface);
    }
}

#[derive(Debug, Error)]
pub enum WlSurfaceError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("Buffer scale {0} is not positive")]
    InvalidScale(i32),
    #[error("Buffer transform {0} is not a valid transform")]
    InvalidTransform(i32),
    #[error("Attach with a non-zero offset is not allowed since version 5")]
    OffsetInAttach,
    #[error(transparent)]
    RoleError(#[from] RoleError),
}
efrom!(WlSurfaceError, ParserError, MsgParserError);
efrom!(WlSurfaceError, ClientError);

impl RequestError for WlSurfaceError {
    fn code(&self) -> ErrorCode {
        match self {
            WlSurfaceError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlSurfaceError::ClientError(e) => e.code(),
            WlSurfaceError::InvalidScale(_) => ErrorCode::Interface(INVALID_SCALE),
            WlSurfaceError::InvalidTransform(_) => ErrorCode::Interface(INVALID_TRANSFORM),
            WlSurfaceError::OffsetInAttach => ErrorCode::Interface(INVALID_OFFSET),
            WlSurfaceError::RoleError(_) => ErrorCode::Interface(DEFUNCT_ROLE_OBJECT),
        }
    }
}
