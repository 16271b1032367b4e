use {
    crate::utils::oserror::OsError,
    std::{mem, slice},
    thiserror::Error,
    uapi::{Errno, OwnedFd, c},
};

const SIGINFO_SIZE: usize = mem::size_of::<c::signalfd_siginfo>();

#[derive(Debug, Error)]
pub enum SighandError {
    #[error("Could not build the signal set")]
    SigsetFailed(#[source] OsError),
    #[error("Could not block the signalfd signals")]
    BlockFailed(#[source] OsError),
    #[error("Could not create a signalfd")]
    CreateFailed(#[source] OsError),
    #[error("Could not poll the signalfd")]
    PollFailed(#[source] OsError),
    #[error("Could not read from the signalfd")]
    ReadFailed(#[source] OsError),
}

/// Turns SIGINT and SIGTERM into readable events.
///
/// Must be installed before any thread is spawned so that every thread inherits the mask.
pub struct SignalWatcher {
    fd: OwnedFd,
}

impl SignalWatcher {
    pub fn install() -> Result<Self, SighandError> {
        let mut set: c::sigset_t = uapi::pod_zeroed();
        for sig in [c::SIGINT, c::SIGTERM, c::SIGPIPE] {
            if let Err(e) = uapi::sigaddset(&mut set, sig) {
                return Err(SighandError::SigsetFailed(e.into()));
            }
        }
        if let Err(e) = uapi::pthread_sigmask(c::SIG_BLOCK, Some(&set), None) {
            return Err(SighandError::BlockFailed(e.into()));
        }
        match uapi::signalfd_new(&set, c::SFD_CLOEXEC | c::SFD_NONBLOCK) {
            Ok(fd) => Ok(Self { fd }),
            Err(e) => Err(SighandError::CreateFailed(e.into())),
        }
    }

    /// Waits at most `timeout_ms` for a signal. Returns `true` if the process should exit.
    pub fn wait(&self, timeout_ms: i32) -> Result<bool, SighandError> {
        let mut pollfd = c::pollfd {
            fd: self.fd.raw(),
            events: c::POLLIN,
            revents: 0,
        };
        match uapi::poll(slice::from_mut(&mut pollfd), timeout_ms) {
            Ok(0) | Err(Errno(c::EINTR)) => return Ok(false),
            Ok(_) => {}
            Err(e) => return Err(SighandError::PollFailed(e.into())),
        }
        let mut buf = [0u8; SIGINFO_SIZE];
        match uapi::read(self.fd.raw(), &mut buf[..]) {
            Ok(_) => {}
            Err(Errno(c::EAGAIN)) => return Ok(false),
            Err(e) => return Err(SighandError::ReadFailed(e.into())),
        }
        // ssi_signo is the first field.
        let sig = u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]) as c::c_int;
        log::info!("Received signal {}", sig);
        Ok(matches!(sig, c::SIGINT | c::SIGTERM))
    }
}
