use {
    crate::{
        object::ObjectId,
        utils::buffd::{
            BufFdError, BufFdIn, BufFdOut, MsgFormatter, MsgFramer, MsgParser, Received,
        },
    },
    std::{collections::VecDeque, sync::Arc},
    uapi::{OwnedFd, c},
};

fn pair() -> (Arc<OwnedFd>, Arc<OwnedFd>) {
    let (a, b) = uapi::socketpair(c::AF_UNIX, c::SOCK_STREAM | c::SOCK_CLOEXEC, 0).unwrap();
    (Arc::new(a), Arc::new(b))
}

#[test]
fn fds_travel_with_their_message() {
    let (a, b) = pair();
    let (read, write) = uapi::pipe2(c::O_CLOEXEC).unwrap();
    let mut out = BufFdOut::new(a, 1000);
    let mut fmt = MsgFormatter::new(&mut out);
    fmt.header(ObjectId::from_raw(5), 2)
        .uint(77)
        .string("hello")
        .fd(Arc::new(write));
    fmt.write_len();
    out.flush().unwrap();
    assert!(out.is_empty());

    let mut input = BufFdIn::new(b);
    let (bytes, fds) = match input.read(1000).unwrap() {
        Received::Data { bytes, fds } => (bytes.to_vec(), fds),
        r => panic!("unexpected {:?}", r),
    };
    assert_eq!(fds.len(), 1);
    let msgs = MsgFramer::new().consume(&bytes);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].id, ObjectId::from_raw(5));
    assert_eq!(msgs[0].opcode, 2);
    assert_eq!(msgs[0].size as usize, bytes.len());

    let mut fds: VecDeque<_> = fds.into();
    let mut parser = MsgParser::new(&mut fds, &msgs[0].payload);
    assert_eq!(parser.uint().unwrap(), 77);
    assert_eq!(parser.str().unwrap(), "hello");
    let fd = parser.fd().unwrap();
    parser.eof().unwrap();

    uapi::write(fd.raw(), b"ping").unwrap();
    let mut buf = [0; 4];
    let got = uapi::read(read.raw(), &mut buf[..]).unwrap();
    assert_eq!(&got[..], b"ping");
}

#[test]
fn read_times_out_without_data() {
    let (_a, b) = pair();
    let mut input = BufFdIn::new(b);
    assert!(matches!(input.read(10).unwrap(), Received::Timeout));
}

#[test]
fn read_reports_eof() {
    let (a, b) = pair();
    drop(a);
    let mut input = BufFdIn::new(b);
    assert!(matches!(input.read(100).unwrap(), Received::Eof));
}

#[test]
fn write_to_closed_peer_fails() {
    let (a, b) = pair();
    drop(b);
    let mut out = BufFdOut::new(a, 100);
    let mut fmt = MsgFormatter::new(&mut out);
    fmt.header(ObjectId::from_raw(1), 0).uint(1);
    fmt.write_len();
    assert!(matches!(out.flush(), Err(BufFdError::Closed)));
}

#[test]
fn parser_rejects_malformed_payloads() {
    let mut fds = VecDeque::new();
    let data = [1, 0, 0];
    let mut parser = MsgParser::new(&mut fds, &data);
    assert!(parser.uint().is_err());

    let data = [0, 0, 0, 0];
    let mut parser = MsgParser::new(&mut fds, &data);
    assert!(parser.object::<ObjectId>().is_err());
    let mut parser = MsgParser::new(&mut fds, &data);
    assert_eq!(parser.opt_object::<ObjectId>().unwrap(), None);
    assert!(parser.fd().is_err());

    let data = [1, 0, 0, 0, 9, 9, 9, 9, 3, 0, 0, 0];
    let mut parser = MsgParser::new(&mut fds, &data);
    parser.uint().unwrap();
    assert!(parser.eof().is_err());
}

#[test]
fn oversized_events_fail_the_next_flush() {
    let (a, b) = pair();
    let mut out = BufFdOut::new(a, 1000);
    let mut fmt = MsgFormatter::new(&mut out);
    fmt.header(ObjectId::from_raw(1), 0)
        .array(&vec![0; u16::MAX as usize]);
    fmt.write_len();
    assert!(!out.is_empty());
    assert!(matches!(out.flush(), Err(BufFdError::MessageTooLarge(_))));

    let mut fmt = MsgFormatter::new(&mut out);
    fmt.header(ObjectId::from_raw(1), 1).uint(5);
    fmt.write_len();
    out.flush().unwrap();

    let mut input = BufFdIn::new(b);
    let msgs = match input.read(1000).unwrap() {
        Received::Data { bytes, .. } => MsgFramer::new().consume(bytes),
        r => panic!("unexpected {:?}", r),
    };
    assert_eq!(msgs.len(), 1);
    assert_eq!((msgs[0].opcode, msgs[0].size), (1, 12));
}
