pub mod wl_buffer;
pub mod wl_callback;
pub mod wl_compositor;
pub mod wl_display;
pub mod wl_output;
pub mod wl_region;
pub mod wl_registry;
pub mod wl_shm;
pub mod wl_shm_pool;
pub mod wl_subcompositor;
pub mod wl_surface;
pub mod xdg_positioner;
pub mod xdg_wm_base;
pub mod xwayland_shell_v1;

use {
    crate::{
        client::{Client, ObjectError},
        object::{Interface, ObjectId},
        utils::buffd::MsgParser,
        wire::{
            wl_buffer::WlBufferRequestHandler, wl_callback::WlCallbackRequestHandler,
            wl_compositor::WlCompositorRequestHandler, wl_display::WlDisplayRequestHandler,
            wl_output::WlOutputRequestHandler, wl_region::WlRegionRequestHandler,
            wl_registry::WlRegistryRequestHandler, wl_shm::WlShmRequestHandler,
            wl_shm_pool::WlShmPoolRequestHandler,
            wl_subcompositor::WlSubcompositorRequestHandler,
            wl_subsurface::WlSubsurfaceRequestHandler, wl_surface::WlSurfaceRequestHandler,
            xdg_popup::XdgPopupRequestHandler, xdg_positioner::XdgPositionerRequestHandler,
            xdg_surface::XdgSurfaceRequestHandler, xdg_toplevel::XdgToplevelRequestHandler,
            xdg_wm_base::XdgWmBaseRequestHandler,
            xwayland_shell_v1::XwaylandShellV1RequestHandler,
            xwayland_surface_v1::XwaylandSurfaceV1RequestHandler,
        },
    },
    wl_surface::{
        WlSurface, wl_subsurface::WlSubsurface, xdg_popup::XdgPopup, xdg_surface::XdgSurface,
        xdg_toplevel::XdgToplevel, xwayland_surface_v1::XwaylandSurfaceV1,
    },
};

/// Routes a request to the handler of the interface of the target object.
pub fn handle_request(
    client: &mut Client,
    interface: Interface,
    id: ObjectId,
    opcode: u16,
    parser: MsgParser<'_, '_>,
) -> Result<(), ObjectError> {
    macro_rules! handle {
        ($ty:ty, $handler:ident) => {
            <$ty as $handler>::handle_request(client, id.into(), opcode, parser)
                .map_err(|e| ObjectError::new(id, interface, e))
        };
    }
    match interface {
        Interface::WlDisplay => handle!(wl_display::WlDisplay, WlDisplayRequestHandler),
        Interface::WlRegistry => handle!(wl_registry::WlRegistry, WlRegistryRequestHandler),
        Interface::WlCallback => handle!(wl_callback::WlCallback, WlCallbackRequestHandler),
        Interface::WlCompositor => {
            handle!(wl_compositor::WlCompositor, WlCompositorRequestHandler)
        }
        Interface::WlSurface => handle!(WlSurface, WlSurfaceRequestHandler),
        Interface::WlRegion => handle!(wl_region::WlRegion, WlRegionRequestHandler),
        Interface::WlSubcompositor => {
            handle!(wl_subcompositor::WlSubcompositor, WlSubcompositorRequestHandler)
        }
        Interface::WlSubsurface => handle!(WlSubsurface, WlSubsurfaceRequestHandler),
        Interface::WlShm => handle!(wl_shm::WlShm, WlShmRequestHandler),
        Interface::WlShmPool => handle!(wl_shm_pool::WlShmPool, WlShmPoolRequestHandler),
        Interface::WlBuffer => handle!(wl_buffer::WlBuffer, WlBufferRequestHandler),
        Interface::WlOutput => handle!(wl_output::WlOutput, WlOutputRequestHandler),
        Interface::XdgWmBase => handle!(xdg_wm_base::XdgWmBase, XdgWmBaseRequestHandler),
        Interface::XdgPositioner => {
            handle!(xdg_positioner::XdgPositioner, XdgPositionerRequestHandler)
        }
        Interface::XdgSurface => handle!(XdgSurface, XdgSurfaceRequestHandler),
        Interface::XdgToplevel => handle!(XdgToplevel, XdgToplevelRequestHandler),
        Interface::XdgPopup => handle!(XdgPopup, XdgPopupRequestHandler),
        Interface::XwaylandShellV1 => {
            handle!(xwayland_shell_v1::XwaylandShellV1, XwaylandShellV1RequestHandler)
        }
        Interface::XwaylandSurfaceV1 => {
            handle!(XwaylandSurfaceV1, XwaylandSurfaceV1RequestHandler)
        }
    }
}
