use {
    crate::{
        acceptor::Acceptor,
        config::Config,
        scene::ClientScene,
        utils::shutdown::ShutdownToken,
    },
    std::{fs, path::Path, sync::Arc, thread, time::Duration},
    uapi::{OwnedFd, c},
};

fn temp_dir(name: &str) -> String {
    let dir = std::env::temp_dir().join(format!("virtwl-acceptor-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir.to_str().unwrap().to_string()
}

fn connect(path: &str) -> OwnedFd {
    let fd = uapi::socket(c::AF_UNIX, c::SOCK_STREAM | c::SOCK_CLOEXEC, 0).unwrap();
    let mut addr: c::sockaddr_un = uapi::pod_zeroed();
    addr.sun_family = c::AF_UNIX as _;
    let sun_path = uapi::as_bytes_mut(&mut addr.sun_path[..]);
    sun_path[..path.len()].copy_from_slice(path.as_bytes());
    uapi::connect(fd.raw(), &addr).unwrap();
    fd
}

#[test]
fn accepts_and_closes() {
    let dir = temp_dir("accept");
    let config = Config::for_tests(&dir, "wayland-test");
    let acceptor = Acceptor::install(&config, &ShutdownToken::default()).unwrap();
    assert!(Path::new(&config.socket_path()).exists());
    assert!(acceptor.accept().unwrap().is_none());
    let _client = connect(acceptor.socket_path());
    let conn = acceptor.accept().unwrap().unwrap();
    assert_eq!(acceptor.num_connections(), 1);
    conn.publish(ClientScene {
        client: Some(conn.id),
        surfaces: vec![],
    });
    assert_eq!(acceptor.scenes()[0].client, Some(conn.id));
    acceptor.close();
    acceptor.close();
    assert_eq!(acceptor.num_connections(), 0);
    assert!(!Path::new(&config.socket_path()).exists());
    assert!(acceptor.accept().unwrap().is_none());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn stale_socket_is_replaced() {
    let dir = temp_dir("stale");
    let config = Config::for_tests(&dir, "wayland-stale");
    fs::write(config.socket_path(), b"").unwrap();
    let acceptor = Acceptor::install(&config, &ShutdownToken::default()).unwrap();
    let _client = connect(acceptor.socket_path());
    assert!(acceptor.accept().unwrap().is_some());
    acceptor.close();
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn closer_forgets_connections() {
    let dir = temp_dir("closer");
    let config = Config::for_tests(&dir, "wayland-closer");
    let acceptor = Acceptor::install(&config, &ShutdownToken::default()).unwrap();
    let closer = {
        let acceptor = acceptor.clone();
        thread::spawn(move || acceptor.close_loop())
    };
    let client = connect(acceptor.socket_path());
    let conn = acceptor.accept().unwrap().unwrap();
    acceptor.request_close(conn.id);
    for _ in 0..100 {
        if acceptor.num_connections() == 0 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(acceptor.num_connections(), 0);
    let mut buf = [0u8; 1];
    assert_eq!(uapi::read(client.raw(), &mut buf[..]).unwrap().len(), 0);
    acceptor.close();
    closer.join().unwrap();
    drop(Arc::try_unwrap(acceptor).ok());
    fs::remove_dir_all(&dir).unwrap();
}
