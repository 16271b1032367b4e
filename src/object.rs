use {
    crate::{
        ifs::{
            wl_buffer::WlBuffer,
            wl_callback::WlCallback,
            wl_compositor::WlCompositor,
            wl_display::WlDisplay,
            wl_output::WlOutput,
            wl_region::WlRegion,
            wl_registry::WlRegistry,
            wl_shm::WlShm,
            wl_shm_pool::WlShmPool,
            wl_subcompositor::WlSubcompositor,
            wl_surface::{
                WlSurface, wl_subsurface::WlSubsurface, xdg_popup::XdgPopup,
                xdg_surface::XdgSurface, xdg_toplevel::XdgToplevel,
                xwayland_surface_v1::XwaylandSurfaceV1,
            },
            xdg_positioner::XdgPositioner,
            xdg_wm_base::XdgWmBase,
            xwayland_shell_v1::XwaylandShellV1,
        },
        wire::WlDisplayId,
    },
    std::fmt::{Display, Formatter},
};

pub const WL_DISPLAY_ID: WlDisplayId = WlDisplayId::from_raw(1);

#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct ObjectId(u32);

impl ObjectId {
    #[allow(dead_code)]
    pub const NONE: Self = ObjectId(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Version(pub u32);

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Interface {
    WlDisplay,
    WlRegistry,
    WlCallback,
    WlCompositor,
    WlSurface,
    WlRegion,
    WlSubcompositor,
    WlSubsurface,
    WlShm,
    WlShmPool,
    WlBuffer,
    WlOutput,
    XdgWmBase,
    XdgPositioner,
    XdgSurface,
    XdgToplevel,
    XdgPopup,
    XwaylandShellV1,
    XwaylandSurfaceV1,
}

impl Interface {
    pub fn name(self) -> &'static str {
        match self {
            Interface::WlDisplay => "wl_display",
            Interface::WlRegistry => "wl_registry",
            Interface::WlCallback => "wl_callback",
            Interface::WlCompositor => "wl_compositor",
            Interface::WlSurface => "wl_surface",
            Interface::WlRegion => "wl_region",
            Interface::WlSubcompositor => "wl_subcompositor",
            Interface::WlSubsurface => "wl_subsurface",
            Interface::WlShm => "wl_shm",
            Interface::WlShmPool => "wl_shm_pool",
            Interface::WlBuffer => "wl_buffer",
            Interface::WlOutput => "wl_output",
            Interface::XdgWmBase => "xdg_wm_base",
            Interface::XdgPositioner => "xdg_positioner",
            Interface::XdgSurface => "xdg_surface",
            Interface::XdgToplevel => "xdg_toplevel",
            Interface::XdgPopup => "xdg_popup",
            Interface::XwaylandShellV1 => "xwayland_shell_v1",
            Interface::XwaylandSurfaceV1 => "xwayland_surface_v1",
        }
    }
}

impl Display for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A protocol object owned by a client.
pub enum Object {
    Display(Box<WlDisplay>),
    Registry(Box<WlRegistry>),
    Callback(Box<WlCallback>),
    Compositor(Box<WlCompositor>),
    Surface(Box<WlSurface>),
    Region(Box<WlRegion>),
    Subcompositor(Box<WlSubcompositor>),
    Subsurface(Box<WlSubsurface>),
    Shm(Box<WlShm>),
    ShmPool(Box<WlShmPool>),
    Buffer(Box<WlBuffer>),
    Output(Box<WlOutput>),
    XdgWmBase(Box<XdgWmBase>),
    XdgPositioner(Box<XdgPositioner>),
    XdgSurface(Box<XdgSurface>),
    XdgToplevel(Box<XdgToplevel>),
    XdgPopup(Box<XdgPopup>),
    XwaylandShell(Box<XwaylandShellV1>),
    XwaylandSurface(Box<XwaylandSurfaceV1>),
}

impl Object {
    pub fn interface(&self) -> Interface {
        match self {
            Object::Display(_) => Interface::WlDisplay,
            Object::Registry(_) => Interface::WlRegistry,
            Object::Callback(_) => Interface::WlCallback,
            Object::Compositor(_) => Interface::WlCompositor,
            Object::Surface(_) => Interface::WlSurface,
            Object::Region(_) => Interface::WlRegion,
            Object::Subcompositor(_) => Interface::WlSubcompositor,
            Object::Subsurface(_) => Interface::WlSubsurface,
            Object::Shm(_) => Interface::WlShm,
            Object::ShmPool(_) => Interface::WlShmPool,
            Object::Buffer(_) => Interface::WlBuffer,
            Object::Output(_) => Interface::WlOutput,
            Object::XdgWmBase(_) => Interface::XdgWmBase,
            Object::XdgPositioner(_) => Interface::XdgPositioner,
            Object::XdgSurface(_) => Interface::XdgSurface,
            Object::XdgToplevel(_) => Interface::XdgToplevel,
            Object::XdgPopup(_) => Interface::XdgPopup,
            Object::XwaylandShell(_) => Interface::XwaylandShellV1,
            Object::XwaylandSurface(_) => Interface::XwaylandSurfaceV1,
        }
    }
}

pub trait ObjectKind: Sized + 'static {
    type Id: Copy + Into<ObjectId>;
    const INTERFACE: Interface;

    fn id(&self) -> Self::Id;
    fn wrap(self) -> Object;
    fn unwrap_ref(obj: &Object) -> Option<&Self>;
    fn unwrap_mut(obj: &mut Object) -> Option<&mut Self>;
}
