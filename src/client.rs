mod error;
mod objects;
mod tasks;
#[cfg(test)]
mod tests;

pub use {
    error::{
        ClientError, ErrorCode, IMPLEMENTATION, INVALID_METHOD, INVALID_OBJECT, LookupError,
        ObjectError, RequestError,
    },
    objects::Objects,
    tasks::run_client,
};
use {
    crate::{
        acceptor::Connection,
        config::Config,
        globals::GLOBALS,
        ifs::{
            self,
            wl_display::WlDisplay,
            wl_surface::{WlSurface, xdg_popup::XdgPopup},
        },
        object::{Interface, ObjectId, WL_DISPLAY_ID},
        scene::{ClientScene, SceneSurface},
        utils::{
            buffd::{BufFdError, BufFdOut, Message, MsgFormatter, MsgFramer, MsgParser, MsgParserError},
            errorfmt::ErrorFmt,
        },
        wire::{WlCallbackId, WlSurfaceId, wl_callback, wl_display},
    },
    ahash::AHashMap,
    std::{collections::VecDeque, fmt::Debug, mem, sync::Arc},
    uapi::OwnedFd,
};

linear_ids!(ClientIds, ClientId);

/// Error messages sent to clients are cut to this many bytes.
const MAX_ERROR_MESSAGE_LEN: usize = 4096;

pub trait EventFormatter: Debug {
    fn format(self, fmt: &mut MsgFormatter<'_>);
    fn id(&self) -> ObjectId;
    fn interface(&self) -> Interface;
}

pub trait RequestParser: Debug + Sized {
    fn parse(parser: &mut MsgParser<'_, '_>) -> Result<Self, MsgParserError>;
}

/// The state of one connected client.
///
/// A client is owned by the thread that serves its connection. The only state it shares is
/// the scene it publishes for the compositor.
pub struct Client {
    pub id: ClientId,
    pub config: Arc<Config>,
    pub objects: Objects,
    conn: Arc<Connection>,
    out: BufFdOut,
    fds: VecDeque<OwnedFd>,
    framer: MsgFramer,
    serial: u32,
}

impl Client {
    pub fn new(conn: Arc<Connection>, config: Arc<Config>) -> Self {
        let mut objects = Objects::new();
        objects.insert_display(WlDisplay::new(WL_DISPLAY_ID));
        Self {
            id: conn.id,
            out: BufFdOut::new(conn.fd.clone(), config.write_timeout_ms),
            config,
            objects,
            conn,
            fds: Default::default(),
            framer: MsgFramer::new(),
            serial: 0,
        }
    }

    /// Feeds received bytes and file descriptors into the client.
    ///
    /// Protocol errors are reported to the client and do not end the connection.
    pub fn handle_data(&mut self, bytes: &[u8], fds: Vec<OwnedFd>) {
        self.fds.extend(fds);
        for msg in self.framer.consume(bytes) {
            self.dispatch(&msg);
        }
    }

    fn dispatch(&mut self, msg: &Message) {
        log::trace!(
            "Client {}: object = {}, opcode = {}, size = {}",
            self.id,
            msg.id,
            msg.opcode,
            msg.size
        );
        let res = if msg.size < 8 {
            Err(ClientError::MessageSizeTooSmall)
        } else if msg.size % 4 != 0 {
            Err(ClientError::UnalignedMessage)
        } else {
            Ok(())
        };
        if let Err(e) = res {
            self.protocol_error(WL_DISPLAY_ID.into(), INVALID_METHOD, &e);
            return;
        }
        let Some(interface) = self.objects.interface(msg.id) else {
            let e = ClientError::InvalidObject(msg.id);
            self.protocol_error(WL_DISPLAY_ID.into(), INVALID_OBJECT, &e);
            return;
        };
        let mut fds = mem::take(&mut self.fds);
        let parser = MsgParser::new(&mut fds, &msg.payload);
        let res = ifs::handle_request(self, interface, msg.id, msg.opcode, parser);
        fds.extend(mem::take(&mut self.fds));
        self.fds = fds;
        if let Err(e) = res {
            let (id, code) = match e.code {
                ErrorCode::Display(code) => (WL_DISPLAY_ID.into(), code),
                ErrorCode::Interface(code) => (e.id, code),
            };
            self.protocol_error(id, code, &e);
        }
    }

    pub fn parse<R: RequestParser>(
        &self,
        id: impl Into<ObjectId>,
        mut parser: MsgParser<'_, '_>,
    ) -> Result<R, MsgParserError> {
        let res = R::parse(&mut parser)?;
        parser.eof()?;
        log::trace!("Client {} -> {}: {:?}", self.id, id.into(), res);
        Ok(res)
    }

    pub fn protocol_error(&mut self, id: ObjectId, code: u32, error: &dyn std::error::Error) {
        let mut message = ErrorFmt(error).to_string();
        truncate_message(&mut message, MAX_ERROR_MESSAGE_LEN);
        log::warn!(
            "Client {}: Protocol error on object {}: {}",
            self.id,
            id,
            message
        );
        self.event(wl_display::Error {
            self_id: WL_DISPLAY_ID,
            object_id: id,
            code,
            message,
        });
    }

    pub fn event<T: EventFormatter>(&mut self, event: T) {
        log::trace!(
            "Client {} <= {}@{}: {:?}",
            self.id,
            event.interface().name(),
            event.id(),
            event
        );
        let mut fmt = MsgFormatter::new(&mut self.out);
        event.format(&mut fmt);
        fmt.write_len();
    }

    /// Removes a client object and tells the client that the id can be reused.
    pub fn remove_obj(&mut self, id: impl Into<ObjectId>) -> Result<(), ClientError> {
        let id = id.into();
        if self.objects.remove(id).is_none() {
            return Err(ClientError::InvalidObject(id));
        }
        self.event(wl_display::DeleteId {
            self_id: WL_DISPLAY_ID,
            id: id.raw(),
        });
        Ok(())
    }

    pub fn next_serial(&mut self) -> u32 {
        self.serial = self.serial.wrapping_add(1);
        self.serial
    }

    pub fn fire_frame_callbacks(&mut self, time_ms: u32) {
        for callback in self.objects.take_frame_callbacks() {
            self.fire_callback(callback, time_ms);
        }
    }

    pub fn fire_callback(&mut self, callback: WlCallbackId, data: u32) {
        if self.objects.contains(callback.into()) {
            self.event(wl_callback::Done {
                self_id: callback,
                callback_data: data,
            });
            let _ = self.remove_obj(callback);
        }
    }

    pub fn flush(&mut self) -> Result<(), BufFdError> {
        if self.out.is_empty() {
            return Ok(());
        }
        self.out.flush()
    }

    /// Publishes the drawable surfaces for the compositor.
    pub fn publish_scene(&self) {
        let mut popups: AHashMap<WlSurfaceId, Vec<WlSurfaceId>> = AHashMap::new();
        for surface in self.objects.drawable() {
            let parent = surface
                .role
                .popup()
                .and_then(|p| self.objects.get::<XdgPopup>(p.popup))
                .and_then(|p| p.parent_surface);
            if let Some(parent) = parent {
                if self.objects.is_drawable(parent) {
                    popups.entry(parent).or_default().push(surface.id);
                }
            }
        }
        let surfaces = self
            .objects
            .drawable()
            .map(|s: &WlSurface| {
                let mut children = s.children.clone();
                if let Some(popups) = popups.get(&s.id) {
                    children.extend(popups.iter().copied());
                }
                SceneSurface {
                    id: s.id,
                    x: s.x,
                    y: s.y,
                    z: s.z,
                    children,
                    texture: s.texture.clone(),
                }
            })
            .collect();
        self.conn.publish(ClientScene {
            client: Some(self.id),
            surfaces,
        });
    }

    pub fn destroy(&mut self) {
        let binds: usize = GLOBALS
            .iter()
            .map(|g| self.objects.binds(g.name).count())
            .sum();
        log::debug!(
            "Client {}: dropping {} toplevels and {} globals",
            self.id,
            self.objects.toplevels().count(),
            binds
        );
        self.objects.destroy();
        self.fds.clear();
        self.conn.publish(ClientScene::default());
    }
}

fn truncate_message(message: &mut String, max: usize) {
    if message.len() > max {
        let mut end = max;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
}
