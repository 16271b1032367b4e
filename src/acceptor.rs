#[cfg(test)]
mod tests;

use {
    crate::{
        client::{ClientId, ClientIds},
        config::Config,
        scene::ClientScene,
        utils::{
            oserror::OsError, shutdown::ShutdownToken, syncqueue::SyncQueue,
            unlink_on_drop::UnlinkOnDrop,
        },
    },
    ahash::AHashMap,
    parking_lot::Mutex,
    std::{slice, sync::Arc, time::Duration},
    thiserror::Error,
    uapi::{Errno, OwnedFd, c},
};

const CLOSE_QUEUE_SIZE: usize = 64;
const CLOSE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum AcceptorError {
    #[error("The socket path {0} is too long to form a unix socket address")]
    PathTooLong(String),
    #[error("Could not remove the stale socket {0}")]
    RemoveStale(String, #[source] OsError),
    #[error("Could not create a wayland socket")]
    SocketFailed(#[source] OsError),
    #[error("Could not bind the socket to {0}")]
    BindFailed(String, #[source] OsError),
    #[error("Could not start listening for incoming connections")]
    ListenFailed(#[source] OsError),
    #[error("Could not accept new connections")]
    AcceptFailed(#[source] OsError),
}

/// One accepted client connection.
pub struct Connection {
    pub id: ClientId,
    pub fd: Arc<OwnedFd>,
    scene: Mutex<Arc<ClientScene>>,
}

impl Connection {
    pub fn new(id: ClientId, fd: OwnedFd) -> Self {
        Self {
            id,
            fd: Arc::new(fd),
            scene: Default::default(),
        }
    }

    pub fn publish(&self, scene: ClientScene) {
        *self.scene.lock() = Arc::new(scene);
    }

    pub fn scene(&self) -> Arc<ClientScene> {
        self.scene.lock().clone()
    }

    /// Wakes up everybody blocked on the socket. The descriptor stays open until the last
    /// reference is dropped.
    pub fn shutdown(&self) {
        let _ = uapi::shutdown(self.fd.raw(), c::SHUT_RDWR);
    }
}

/// The listening socket and the set of live connections.
pub struct Acceptor {
    fd: OwnedFd,
    socket_path: String,
    unlinker: Mutex<Option<UnlinkOnDrop>>,
    ids: ClientIds,
    connections: Mutex<AHashMap<ClientId, Arc<Connection>>>,
    close_requests: SyncQueue<ClientId>,
    shutdown: ShutdownToken,
    closed: ShutdownToken,
    accept_timeout_ms: i32,
}

fn bind_socket(fd: &OwnedFd, path: &str) -> Result<(), AcceptorError> {
    let mut addr: c::sockaddr_un = uapi::pod_zeroed();
    addr.sun_family = c::AF_UNIX as _;
    if path.len() + 1 > addr.sun_path.len() {
        return Err(AcceptorError::PathTooLong(path.to_string()));
    }
    let sun_path = uapi::as_bytes_mut(&mut addr.sun_path[..]);
    sun_path[..path.len()].copy_from_slice(path.as_bytes());
    sun_path[path.len()] = 0;
    match uapi::unlink(path) {
        Ok(()) => log::warn!("Removed stale socket {}", path),
        Err(Errno(c::ENOENT)) => {}
        Err(e) => return Err(AcceptorError::RemoveStale(path.to_string(), e.into())),
    }
    if let Err(e) = uapi::bind(fd.raw(), &addr) {
        return Err(AcceptorError::BindFailed(path.to_string(), e.into()));
    }
    Ok(())
}

impl Acceptor {
    pub fn install(config: &Config, shutdown: &ShutdownToken) -> Result<Arc<Self>, AcceptorError> {
        let fd = match uapi::socket(c::AF_UNIX, c::SOCK_STREAM | c::SOCK_CLOEXEC, 0) {
            Ok(f) => f,
            Err(e) => return Err(AcceptorError::SocketFailed(e.into())),
        };
        let socket_path = config.socket_path();
        bind_socket(&fd, &socket_path)?;
        let unlinker = UnlinkOnDrop(socket_path.clone());
        if let Err(e) = uapi::listen(fd.raw(), 4096) {
            return Err(AcceptorError::ListenFailed(e.into()));
        }
        log::info!("bound to socket {}", socket_path);
        Ok(Arc::new(Self {
            fd,
            socket_path,
            unlinker: Mutex::new(Some(unlinker)),
            ids: Default::default(),
            connections: Default::default(),
            close_requests: SyncQueue::new(CLOSE_QUEUE_SIZE),
            shutdown: shutdown.clone(),
            closed: Default::default(),
            accept_timeout_ms: config.accept_timeout_ms,
        }))
    }

    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Waits at most the accept timeout for one connection.
    ///
    /// Returns `Ok(None)` if no client connected in time or if the acceptor was closed.
    pub fn accept(&self) -> Result<Option<Arc<Connection>>, AcceptorError> {
        if self.closed.is_triggered() {
            return Ok(None);
        }
        let mut pollfd = c::pollfd {
            fd: self.fd.raw(),
            events: c::POLLIN,
            revents: 0,
        };
        match uapi::poll(slice::from_mut(&mut pollfd), self.accept_timeout_ms) {
            Ok(0) | Err(Errno(c::EINTR)) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(AcceptorError::AcceptFailed(e.into())),
        }
        if self.closed.is_triggered() {
            return Ok(None);
        }
        let fd = match uapi::accept4(self.fd.raw(), uapi::sockaddr_none_mut(), c::SOCK_CLOEXEC) {
            Ok((fd, _)) => fd,
            Err(Errno(c::EAGAIN | c::EINTR | c::ECONNABORTED)) => return Ok(None),
            Err(Errno(c::EINVAL)) if self.closed.is_triggered() => return Ok(None),
            Err(e) => return Err(AcceptorError::AcceptFailed(e.into())),
        };
        let conn = Arc::new(Connection::new(self.ids.next(), fd));
        self.connections.lock().insert(conn.id, conn.clone());
        log::info!("Client {} connected", conn.id);
        Ok(Some(conn))
    }

    /// Accepts clients until the server shuts down.
    pub fn accept_loop(&self, mut on_connect: impl FnMut(Arc<Connection>)) {
        while !self.shutdown.is_triggered() && !self.closed.is_triggered() {
            match self.accept() {
                Ok(Some(conn)) => on_connect(conn),
                Ok(None) => {}
                Err(e) => {
                    log::error!("{}", crate::utils::errorfmt::ErrorFmt(e));
                    self.shutdown.trigger();
                }
            }
        }
    }

    /// Asks the closer to shut down and forget a connection.
    pub fn request_close(&self, id: ClientId) {
        let mut id = id;
        loop {
            match self.close_requests.push(id, CLOSE_POLL) {
                Ok(()) => return,
                Err(i) if !self.closed.is_triggered() => id = i,
                Err(i) => {
                    self.close_connection(i);
                    return;
                }
            }
        }
    }

    fn close_connection(&self, id: ClientId) {
        if let Some(conn) = self.connections.lock().remove(&id) {
            conn.shutdown();
            log::info!("Client {} disconnected", id);
        }
    }

    /// Drains close requests until the acceptor is closed.
    pub fn close_loop(&self) {
        while !self.closed.is_triggered() {
            if let Some(id) = self.close_requests.pop(CLOSE_POLL) {
                self.close_connection(id);
            }
        }
        while let Some(id) = self.close_requests.try_pop() {
            self.close_connection(id);
        }
    }

    /// The scenes of all live connections in connection order.
    pub fn scenes(&self) -> Vec<Arc<ClientScene>> {
        let mut conns: Vec<_> = self.connections.lock().values().cloned().collect();
        conns.sort_by_key(|c| c.id);
        conns.iter().map(|c| c.scene()).collect()
    }

    pub fn num_connections(&self) -> usize {
        self.connections.lock().len()
    }

    /// Stops accepting, closes every connection and removes the socket file.
    ///
    /// Only the first call has an effect.
    pub fn close(&self) {
        if !self.closed.trigger() {
            return;
        }
        let _ = uapi::shutdown(self.fd.raw(), c::SHUT_RDWR);
        let conns: Vec<_> = self.connections.lock().drain().map(|(_, c)| c).collect();
        for conn in conns {
            conn.shutdown();
        }
        self.unlinker.lock().take();
        log::info!("Closed socket {}", self.socket_path);
    }
}
