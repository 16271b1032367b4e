use {
    crate::{
        acceptor::Connection,
        client::{Client, ClientIds, INVALID_METHOD, INVALID_OBJECT, truncate_message},
        config::Config,
        globals::GLOBALS,
        object::ObjectId,
        utils::buffd::{BufFdIn, Message, MsgFramer, MsgParser, Received},
    },
    std::{collections::VecDeque, sync::Arc},
    uapi::{OwnedFd, c},
};

const DISPLAY: u32 = 1;

#[derive(Default)]
struct Args(Vec<u8>);

impl Args {
    fn uint(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_ne_bytes());
        self
    }

    fn int(self, v: i32) -> Self {
        self.uint(v as u32)
    }

    fn string(mut self, s: &str) -> Self {
        self = self.uint(s.len() as u32 + 1);
        self.0.extend_from_slice(s.as_bytes());
        self.0.push(0);
        while self.0.len() % 4 != 0 {
            self.0.push(0);
        }
        self
    }
}

struct Harness {
    client: Client,
    conn: Arc<Connection>,
    peer: BufFdIn,
    framer: MsgFramer,
}

impl Harness {
    fn new() -> Self {
        let (a, b) = uapi::socketpair(c::AF_UNIX, c::SOCK_STREAM | c::SOCK_CLOEXEC, 0).unwrap();
        let conn = Arc::new(Connection::new(ClientIds::default().next(), a));
        let config = Arc::new(Config::for_tests("/nonexistent", "wayland-test"));
        Self {
            client: Client::new(conn.clone(), config),
            conn,
            peer: BufFdIn::new(Arc::new(b)),
            framer: MsgFramer::new(),
        }
    }

    fn send(&mut self, id: u32, opcode: u16, args: Args) {
        self.send_fds(id, opcode, args, vec![]);
    }

    fn send_fds(&mut self, id: u32, opcode: u16, args: Args, fds: Vec<OwnedFd>) {
        let mut bytes = vec![];
        MsgFramer::encode(ObjectId::from_raw(id), opcode, &args.0, &mut bytes).unwrap();
        self.client.handle_data(&bytes, fds);
    }

    fn events(&mut self) -> Vec<Message> {
        self.client.flush().unwrap();
        let mut msgs = vec![];
        while let Received::Data { bytes, .. } = self.peer.read(10).unwrap() {
            msgs.extend(self.framer.consume(bytes));
        }
        msgs
    }

    /// Binds the globals the shell tests need: compositor 3, shm 4, wm_base 5.
    fn bind_basics(&mut self) {
        self.send(DISPLAY, 1, Args::default().uint(2));
        self.send(2, 0, bind_args(1, "wl_compositor", 6, 3));
        self.send(2, 0, bind_args(3, "wl_shm", 1, 4));
        self.send(2, 0, bind_args(5, "xdg_wm_base", 5, 5));
        self.events();
    }
}

fn bind_args(name: u32, interface: &str, version: u32, id: u32) -> Args {
    Args::default()
        .uint(name)
        .string(interface)
        .uint(version)
        .uint(id)
}

fn uints(msg: &Message) -> Vec<u32> {
    msg.payload
        .chunks_exact(4)
        .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn assert_error(msg: &Message, object: u32, code: u32) {
    assert_eq!(msg.id, ObjectId::from_raw(DISPLAY));
    assert_eq!(msg.opcode, 0);
    let args = uints(msg);
    assert_eq!((args[0], args[1]), (object, code));
}

fn red_memfd(width: usize, height: usize) -> OwnedFd {
    let fd = uapi::memfd_create("virtwl-test", c::MFD_CLOEXEC).unwrap();
    let pixels: Vec<u8> = (0..width * height)
        .flat_map(|_| [0x00, 0x00, 0xff, 0xff])
        .collect();
    uapi::ftruncate(fd.raw(), pixels.len() as _).unwrap();
    uapi::write(fd.raw(), &pixels[..]).unwrap();
    fd
}

#[test]
fn sync_is_answered_immediately() {
    let mut h = Harness::new();
    h.send(DISPLAY, 0, Args::default().uint(2));
    let events = h.events();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].id, events[0].opcode), (ObjectId::from_raw(2), 0));
    assert_eq!((events[1].id, events[1].opcode), (ObjectId::from_raw(DISPLAY), 1));
    assert_eq!(uints(&events[1]), [2]);
    assert!(!h.client.objects.contains(ObjectId::from_raw(2)));
}

#[test]
fn registry_advertises_every_global() {
    let mut h = Harness::new();
    h.send(DISPLAY, 1, Args::default().uint(2));
    let events = h.events();
    assert_eq!(events.len(), GLOBALS.len());
    let mut fds = VecDeque::new();
    for (event, global) in events.iter().zip(GLOBALS) {
        assert_eq!((event.id, event.opcode), (ObjectId::from_raw(2), 0));
        let mut parser = MsgParser::new(&mut fds, &event.payload);
        assert_eq!(parser.uint().unwrap(), global.name.raw());
        assert_eq!(parser.str().unwrap(), global.interface.name());
        assert_eq!(parser.uint().unwrap(), global.version);
        parser.eof().unwrap();
    }
}

#[test]
fn unknown_objects_are_reported_without_disconnecting() {
    let mut h = Harness::new();
    h.send(99, 0, Args::default());
    let events = h.events();
    assert_eq!(events.len(), 1);
    assert_error(&events[0], DISPLAY, INVALID_OBJECT);

    h.send(DISPLAY, 0, Args::default().uint(2));
    assert_eq!(h.events().len(), 2);
}

#[test]
fn unknown_opcodes_are_invalid_methods() {
    let mut h = Harness::new();
    h.send(DISPLAY, 9, Args::default());
    let events = h.events();
    assert_eq!(events.len(), 1);
    assert_error(&events[0], DISPLAY, INVALID_METHOD);
}

#[test]
fn binding_a_wrong_interface_fails() {
    let mut h = Harness::new();
    h.send(DISPLAY, 1, Args::default().uint(2));
    h.events();
    h.send(2, 0, bind_args(1, "wl_shm", 1, 3));
    let events = h.events();
    assert_eq!(events.len(), 1);
    assert_error(&events[0], DISPLAY, INVALID_OBJECT);
    assert!(!h.client.objects.contains(ObjectId::from_raw(3)));
}

#[test]
fn overlong_interface_names_do_not_break_the_connection() {
    let mut h = Harness::new();
    h.send(DISPLAY, 1, Args::default().uint(2));
    h.events();
    let name = "x".repeat(65490);
    h.send(2, 0, bind_args(1, &name, 1, 3));
    let events = h.events();
    assert_eq!(events.len(), 1);
    assert_error(&events[0], DISPLAY, INVALID_OBJECT);
    let mut fds = VecDeque::new();
    let mut parser = MsgParser::new(&mut fds, &events[0].payload);
    parser.uint().unwrap();
    parser.uint().unwrap();
    let message = parser.str().unwrap();
    assert!(message.len() <= 4096);
    assert!(message.contains("xxxx"));

    h.send(DISPLAY, 0, Args::default().uint(3));
    assert_eq!(h.events().len(), 2);
}

#[test]
fn error_messages_are_cut_on_char_boundaries() {
    let mut message = "aé".repeat(10);
    truncate_message(&mut message, 4);
    assert_eq!(message, "aéa");
    let mut message = "short".to_string();
    truncate_message(&mut message, 4096);
    assert_eq!(message, "short");
}

#[test]
fn shm_bind_lists_formats() {
    let mut h = Harness::new();
    h.send(DISPLAY, 1, Args::default().uint(2));
    h.events();
    h.send(2, 0, bind_args(3, "wl_shm", 1, 3));
    let formats: Vec<_> = h.events().iter().map(|e| uints(e)[0]).collect();
    assert_eq!(formats, [0, 1]);
}

#[test]
fn toplevel_commit_publishes_a_scene() {
    let mut h = Harness::new();
    h.bind_basics();
    // compositor.create_surface
    h.send(3, 0, Args::default().uint(6));
    // shm.create_pool
    h.send_fds(4, 0, Args::default().uint(7).int(64), vec![red_memfd(4, 4)]);
    // pool.create_buffer
    let buffer = Args::default().uint(8).int(0).int(4).int(4).int(16).uint(0);
    h.send(7, 0, buffer);
    // wm_base.get_xdg_surface, xdg_surface.get_toplevel
    h.send(5, 2, Args::default().uint(9).uint(6));
    h.send(9, 1, Args::default().uint(10));
    let events = h.events();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].id, events[0].opcode), (ObjectId::from_raw(10), 0));
    assert_eq!((events[1].id, events[1].opcode), (ObjectId::from_raw(9), 0));
    let serial = uints(&events[1])[0];
    h.send(9, 4, Args::default().uint(serial));
    assert!(h.events().is_empty());

    assert!(h.conn.scene().surfaces.is_empty());
    // attach, frame, commit
    h.send(6, 1, Args::default().uint(8).int(0).int(0));
    h.send(6, 3, Args::default().uint(11));
    h.send(6, 6, Args::default());
    let events = h.events();
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].id, events[0].opcode), (ObjectId::from_raw(8), 0));

    let scene = h.conn.scene();
    assert_eq!(scene.client, Some(h.client.id));
    assert_eq!(scene.surfaces.len(), 1);
    let texture = scene.surfaces[0].texture.as_ref().unwrap();
    assert_eq!((texture.width(), texture.height()), (4, 4));
    let pixel = texture.pixel(3, 3).unwrap();
    assert_eq!((pixel.red(), pixel.green(), pixel.alpha()), (255, 0, 255));

    h.client.fire_frame_callbacks(42);
    let events = h.events();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].id, events[0].opcode), (ObjectId::from_raw(11), 0));
    assert_eq!(uints(&events[0]), [42]);
    assert_eq!(uints(&events[1]), [11]);

    h.client.destroy();
    assert!(h.conn.scene().surfaces.is_empty());
}

#[test]
fn surface_errors_target_the_surface() {
    let mut h = Harness::new();
    h.bind_basics();
    h.send(3, 0, Args::default().uint(6));
    // set_buffer_scale(0)
    h.send(6, 8, Args::default().int(0));
    let events = h.events();
    assert_eq!(events.len(), 1);
    assert_error(&events[0], 6, 0);
}

#[test]
fn surfaces_without_a_role_are_not_drawn() {
    let mut h = Harness::new();
    h.bind_basics();
    h.send(3, 0, Args::default().uint(6));
    h.send_fds(4, 0, Args::default().uint(7).int(64), vec![red_memfd(4, 4)]);
    h.send(7, 0, Args::default().uint(8).int(0).int(4).int(4).int(16).uint(1));
    h.send(6, 1, Args::default().uint(8).int(0).int(0));
    h.send(6, 6, Args::default());
    h.events();
    assert!(h.conn.scene().surfaces.is_empty());
}
