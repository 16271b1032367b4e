use {
    crate::{
        object::ObjectId,
        utils::buffd::{MsgFormatter, MsgParser, MsgParserError},
    },
    uapi::OwnedFd,
};

/// A request argument that can be read from a message payload.
pub trait RequestArg: Sized {
    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError>;
}

/// An event argument that can be appended to an outgoing message.
pub trait EventArg {
    fn format(self, fmt: &mut MsgFormatter<'_>);
}

impl RequestArg for i32 {
    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
        parser.int()
    }
}

impl RequestArg for u32 {
    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
        parser.uint()
    }
}

impl RequestArg for String {
    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
        parser.str().map(|s| s.to_owned())
    }
}

impl RequestArg for OwnedFd {
    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
        parser.fd()
    }
}

impl EventArg for i32 {
    fn format(self, fmt: &mut MsgFormatter<'_>) {
        fmt.int(self);
    }
}

impl EventArg for u32 {
    fn format(self, fmt: &mut MsgFormatter<'_>) {
        fmt.uint(self);
    }
}

impl EventArg for String {
    fn format(self, fmt: &mut MsgFormatter<'_>) {
        fmt.string(&self);
    }
}

impl EventArg for Vec<u8> {
    fn format(self, fmt: &mut MsgFormatter<'_>) {
        fmt.array(&self);
    }
}

macro_rules! wire_ids {
    ($($name:ident,)*) => {
        $(
            id!($name);

            impl RequestArg for $name {
                fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
                    parser.object()
                }
            }

            impl RequestArg for Option<$name> {
                fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
                    parser.opt_object()
                }
            }

            impl EventArg for $name {
                fn format(self, fmt: &mut MsgFormatter<'_>) {
                    fmt.object(self);
                }
            }
        )*
    };
}

wire_ids! {
    WlDisplayId,
    WlRegistryId,
    WlCallbackId,
    WlCompositorId,
    WlSurfaceId,
    WlRegionId,
    WlSubcompositorId,
    WlSubsurfaceId,
    WlShmId,
    WlShmPoolId,
    WlBufferId,
    WlOutputId,
    XdgWmBaseId,
    XdgPositionerId,
    XdgSurfaceId,
    XdgToplevelId,
    XdgPopupId,
    XwaylandShellV1Id,
    XwaylandSurfaceV1Id,
}

impl RequestArg for ObjectId {
    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
        parser.object()
    }
}

impl EventArg for ObjectId {
    fn format(self, fmt: &mut MsgFormatter<'_>) {
        fmt.object(self);
    }
}

/// Declares the messages of one interface.
///
/// Every request becomes a struct that implements `RequestParser` and a method of the
/// generated request handler trait. Every event becomes a struct that implements
/// `EventFormatter`.
macro_rules! interface {
    (
        $module:ident, $iface:ident, $id:ident, $handler:ident;
        requests {
            $($rname:ident = $ropcode:literal => $rstruct:ident { $($rfield:ident: $rty:ty),* $(,)? })*
        }
        events {
            $($estruct:ident = $eopcode:literal { $($efield:ident: $ety:ty),* $(,)? })*
        }
    ) => {
        pub mod $module {
            #[allow(unused_imports)]
            use {
                super::*,
                crate::{
                    client::{Client, ClientError, EventFormatter, RequestParser},
                    object::Interface,
                },
            };

            $(
                #[allow(dead_code)]
                #[derive(Debug)]
                pub struct $rstruct {
                    $(pub $rfield: $rty,)*
                }

                impl RequestParser for $rstruct {
                    #[allow(unused_variables)]
                    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError> {
                        Ok(Self {
                            $($rfield: <$rty as RequestArg>::parse(parser)?,)*
                        })
                    }
                }
            )*

            $(
                #[derive(Debug)]
                pub struct $estruct {
                    pub self_id: $id,
                    $(pub $efield: $ety,)*
                }

                impl EventFormatter for $estruct {
                    fn format(self, fmt: &mut MsgFormatter<'_>) {
                        fmt.header(self.self_id, $eopcode);
                        $(EventArg::format(self.$efield, fmt);)*
                    }

                    fn id(&self) -> ObjectId {
                        self.self_id.into()
                    }

                    fn interface(&self) -> Interface {
                        Interface::$iface
                    }
                }
            )*

            pub trait $handler {
                type Error: From<MsgParserError> + From<ClientError>;

                $(
                    fn $rname(client: &mut Client, id: $id, req: $rstruct) -> Result<(), Self::Error>;
                )*

                #[allow(unused_variables)]
                fn handle_request(
                    client: &mut Client,
                    id: $id,
                    opcode: u16,
                    parser: MsgParser<'_, '_>,
                ) -> Result<(), Self::Error> {
                    match opcode {
                        $(
                            $ropcode => {
                                let req = client.parse::<$rstruct>(id, parser)?;
                                Self::$rname(client, id, req)
                            }
                        )*
                        _ => Err(ClientError::InvalidMethod.into()),
                    }
                }
            }
        }
    };
}

interface! {
    wl_display, WlDisplay, WlDisplayId, WlDisplayRequestHandler;
    requests {
        sync = 0 => Sync { callback: WlCallbackId }
        get_registry = 1 => GetRegistry { registry: WlRegistryId }
    }
    events {
        Error = 0 { object_id: ObjectId, code: u32, message: String }
        DeleteId = 1 { id: u32 }
    }
}

interface! {
    wl_registry, WlRegistry, WlRegistryId, WlRegistryRequestHandler;
    requests {
        bind = 0 => Bind { name: u32, interface: String, version: u32, id: ObjectId }
    }
    events {
        Global = 0 { name: u32, interface: String, version: u32 }
    }
}

interface! {
    wl_callback, WlCallback, WlCallbackId, WlCallbackRequestHandler;
    requests {
    }
    events {
        Done = 0 { callback_data: u32 }
    }
}

interface! {
    wl_compositor, WlCompositor, WlCompositorId, WlCompositorRequestHandler;
    requests {
        create_surface = 0 => CreateSurface { id: WlSurfaceId }
        create_region = 1 => CreateRegion { id: WlRegionId }
    }
    events {
    }
}

interface! {
    wl_surface, WlSurface, WlSurfaceId, WlSurfaceRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        attach = 1 => Attach { buffer: Option<WlBufferId>, x: i32, y: i32 }
        damage = 2 => Damage { x: i32, y: i32, width: i32, height: i32 }
        frame = 3 => Frame { callback: WlCallbackId }
        set_opaque_region = 4 => SetOpaqueRegion { region: Option<WlRegionId> }
        set_input_region = 5 => SetInputRegion { region: Option<WlRegionId> }
        commit = 6 => Commit { }
        set_buffer_transform = 7 => SetBufferTransform { transform: i32 }
        set_buffer_scale = 8 => SetBufferScale { scale: i32 }
        damage_buffer = 9 => DamageBuffer { x: i32, y: i32, width: i32, height: i32 }
        offset = 10 => Offset { x: i32, y: i32 }
    }
    events {
    }
}

interface! {
    wl_region, WlRegion, WlRegionId, WlRegionRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        add = 1 => Add { x: i32, y: i32, width: i32, height: i32 }
        subtract = 2 => Subtract { x: i32, y: i32, width: i32, height: i32 }
    }
    events {
    }
}

interface! {
    wl_subcompositor, WlSubcompositor, WlSubcompositorId, WlSubcompositorRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        get_subsurface = 1 => GetSubsurface { id: WlSubsurfaceId, surface: WlSurfaceId, parent: WlSurfaceId }
    }
    events {
    }
}

interface! {
    wl_subsurface, WlSubsurface, WlSubsurfaceId, WlSubsurfaceRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        set_position = 1 => SetPosition { x: i32, y: i32 }
        place_above = 2 => PlaceAbove { sibling: WlSurfaceId }
        place_below = 3 => PlaceBelow { sibling: WlSurfaceId }
        set_sync = 4 => SetSync { }
        set_desync = 5 => SetDesync { }
    }
    events {
    }
}

interface! {
    wl_shm, WlShm, WlShmId, WlShmRequestHandler;
    requests {
        create_pool = 0 => CreatePool { id: WlShmPoolId, fd: OwnedFd, size: i32 }
        release = 1 => Release { }
    }
    events {
        Format = 0 { format: u32 }
    }
}

interface! {
    wl_shm_pool, WlShmPool, WlShmPoolId, WlShmPoolRequestHandler;
    requests {
        create_buffer = 0 => CreateBuffer {
            id: WlBufferId,
            offset: i32,
            width: i32,
            height: i32,
            stride: i32,
            format: u32,
        }
        destroy = 1 => Destroy { }
        resize = 2 => Resize { size: i32 }
    }
    events {
    }
}

interface! {
    wl_buffer, WlBuffer, WlBufferId, WlBufferRequestHandler;
    requests {
        destroy = 0 => Destroy { }
    }
    events {
        Release = 0 { }
    }
}

interface! {
    wl_output, WlOutput, WlOutputId, WlOutputRequestHandler;
    requests {
        release = 0 => Release { }
    }
    events {
        Geometry = 0 {
            x: i32,
            y: i32,
            physical_width: i32,
            physical_height: i32,
            subpixel: i32,
            make: String,
            model: String,
            transform: i32,
        }
        Mode = 1 { flags: u32, width: i32, height: i32, refresh: i32 }
        Done = 2 { }
        Scale = 3 { factor: i32 }
        Name = 4 { name: String }
        Description = 5 { description: String }
    }
}

interface! {
    xdg_wm_base, XdgWmBase, XdgWmBaseId, XdgWmBaseRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        create_positioner = 1 => CreatePositioner { id: XdgPositionerId }
        get_xdg_surface = 2 => GetXdgSurface { id: XdgSurfaceId, surface: WlSurfaceId }
        pong = 3 => Pong { serial: u32 }
    }
    events {
    }
}

interface! {
    xdg_positioner, XdgPositioner, XdgPositionerId, XdgPositionerRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        set_size = 1 => SetSize { width: i32, height: i32 }
        set_anchor_rect = 2 => SetAnchorRect { x: i32, y: i32, width: i32, height: i32 }
        set_anchor = 3 => SetAnchor { anchor: u32 }
        set_gravity = 4 => SetGravity { gravity: u32 }
        set_constraint_adjustment = 5 => SetConstraintAdjustment { constraint_adjustment: u32 }
        set_offset = 6 => SetOffset { x: i32, y: i32 }
        set_reactive = 7 => SetReactive { }
        set_parent_size = 8 => SetParentSize { parent_width: i32, parent_height: i32 }
        set_parent_configure = 9 => SetParentConfigure { serial: u32 }
    }
    events {
    }
}

interface! {
    xdg_surface, XdgSurface, XdgSurfaceId, XdgSurfaceRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        get_toplevel = 1 => GetToplevel { id: XdgToplevelId }
        get_popup = 2 => GetPopup {
            id: XdgPopupId,
            parent: Option<XdgSurfaceId>,
            positioner: XdgPositionerId,
        }
        set_window_geometry = 3 => SetWindowGeometry { x: i32, y: i32, width: i32, height: i32 }
        ack_configure = 4 => AckConfigure { serial: u32 }
    }
    events {
        Configure = 0 { serial: u32 }
    }
}

interface! {
    xdg_toplevel, XdgToplevel, XdgToplevelId, XdgToplevelRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        set_parent = 1 => SetParent { parent: Option<XdgToplevelId> }
        set_title = 2 => SetTitle { title: String }
        set_app_id = 3 => SetAppId { app_id: String }
        show_window_menu = 4 => ShowWindowMenu { seat: ObjectId, serial: u32, x: i32, y: i32 }
        move_ = 5 => Move { seat: ObjectId, serial: u32 }
        resize = 6 => Resize { seat: ObjectId, serial: u32, edges: u32 }
        set_max_size = 7 => SetMaxSize { width: i32, height: i32 }
        set_min_size = 8 => SetMinSize { width: i32, height: i32 }
        set_maximized = 9 => SetMaximized { }
        unset_maximized = 10 => UnsetMaximized { }
        set_fullscreen = 11 => SetFullscreen { output: Option<WlOutputId> }
        unset_fullscreen = 12 => UnsetFullscreen { }
        set_minimized = 13 => SetMinimized { }
    }
    events {
        Configure = 0 { width: i32, height: i32, states: Vec<u8> }
    }
}

interface! {
    xdg_popup, XdgPopup, XdgPopupId, XdgPopupRequestHandler;
    requests {
        destroy = 0 => Destroy { }
        grab = 1 => Grab { seat: ObjectId, serial: u32 }
        reposition = 2 => Reposition { positioner: XdgPositionerId, token: u32 }
    }
    events {
        Configure = 0 { x: i32, y: i32, width: i32, height: i32 }
        Repositioned = 2 { token: u32 }
    }
}

interface! {
    xwayland_shell_v1, XwaylandShellV1, XwaylandShellV1Id, XwaylandShellV1RequestHandler;
    requests {
        destroy = 0 => Destroy { }
        get_xwayland_surface = 1 => GetXwaylandSurface { id: XwaylandSurfaceV1Id, surface: WlSurfaceId }
    }
    events {
    }
}

interface! {
    xwayland_surface_v1, XwaylandSurfaceV1, XwaylandSurfaceV1Id, XwaylandSurfaceV1RequestHandler;
    requests {
        set_serial = 0 => SetSerial { serial_lo: u32, serial_hi: u32 }
        destroy = 1 => Destroy { }
    }
    events {
    }
}
