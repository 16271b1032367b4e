use {
    crate::utils::buffd::{BUF_SIZE, BufFdError},
    std::{collections::VecDeque, mem, ptr, slice, sync::Arc},
    uapi::{Errno, OwnedFd, c},
};

pub(super) struct MsgFds {
    pub(super) pos: usize,
    pub(super) fds: Vec<Arc<OwnedFd>>,
}

/// Buffered outgoing side of a connection.
///
/// Events are appended to `out_buf`. File descriptors are attached to the byte position of
/// the message that carries them and are sent with the first byte of that message.
pub struct BufFdOut {
    fd: Arc<OwnedFd>,
    timeout_ms: i32,
    pub(super) out_buf: Vec<u8>,
    pub(super) fds: VecDeque<MsgFds>,
    pub(super) scratch: Vec<u8>,
    error: Option<BufFdError>,
    fd_ids: Vec<c::c_int>,
    cmsg_buf: Vec<u64>,
}

impl BufFdOut {
    pub fn new(fd: Arc<OwnedFd>, timeout_ms: i32) -> Self {
        Self {
            fd,
            timeout_ms,
            out_buf: Vec::with_capacity(BUF_SIZE),
            fds: Default::default(),
            scratch: vec![],
            error: None,
            fd_ids: vec![],
            cmsg_buf: vec![],
        }
    }

    /// Returns whether a flush has nothing to do.
    pub fn is_empty(&self) -> bool {
        self.out_buf.is_empty() && self.error.is_none()
    }

    /// Records an error that is reported by the next flush.
    pub(super) fn fail(&mut self, e: BufFdError) {
        if self.error.is_none() {
            self.error = Some(e);
        }
    }

    pub fn flush(&mut self) -> Result<(), BufFdError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        let mut pos = 0;
        let res = self.flush_from(&mut pos);
        self.out_buf.drain(..pos);
        for fds in &mut self.fds {
            fds.pos -= pos;
        }
        res
    }

    fn flush_from(&mut self, pos: &mut usize) -> Result<(), BufFdError> {
        while *pos < self.out_buf.len() {
            let mut end = self.out_buf.len();
            let mut fds = None;
            if let Some(f) = self.fds.front() {
                if f.pos == *pos {
                    fds = self.fds.pop_front();
                }
            }
            if let Some(next) = self.fds.front() {
                end = end.min(next.pos);
            }
            let fd_ids = match &fds {
                Some(f) => {
                    self.fd_ids.clear();
                    self.fd_ids.extend(f.fds.iter().map(|f| f.raw()));
                    &self.fd_ids[..]
                }
                None => &[][..],
            };
            let sent = send_with_fds(
                &self.fd,
                &self.out_buf[*pos..end],
                fd_ids,
                &mut self.cmsg_buf,
                self.timeout_ms,
            );
            match sent {
                Ok(n) => *pos += n,
                Err(e) => {
                    if let Some(fds) = fds {
                        self.fds.push_front(fds);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

/// Sends `bytes` and passes `fds` alongside the first chunk.
///
/// Short payload writes are retried. The descriptors can only travel with the first chunk;
/// if that chunk cannot be sent the transfer is a hard error.
pub fn send_with_fds(
    fd: &OwnedFd,
    bytes: &[u8],
    fds: &[c::c_int],
    cmsg_buf: &mut Vec<u64>,
    timeout_ms: i32,
) -> Result<usize, BufFdError> {
    let mut offset = 0;
    let mut fds = fds;
    while offset < bytes.len() {
        wait_writable(fd, timeout_ms)?;
        let buf = &bytes[offset..];
        let mut iov = c::iovec {
            iov_base: buf.as_ptr() as *mut _,
            iov_len: buf.len(),
        };
        let mut hdr: c::msghdr = unsafe { mem::zeroed() };
        hdr.msg_name = ptr::null_mut();
        hdr.msg_namelen = 0;
        hdr.msg_iov = &mut iov;
        hdr.msg_iovlen = 1 as _;
        if fds.len() > 0 {
            let data_len = mem::size_of_val(fds);
            let space = uapi::cmsg_space(data_len);
            cmsg_buf.clear();
            cmsg_buf.resize(space / 8 + 1, 0);
            unsafe {
                let cmsg = cmsg_buf.as_mut_ptr().cast::<c::cmsghdr>();
                (*cmsg).cmsg_len = c::CMSG_LEN(data_len as _) as _;
                (*cmsg).cmsg_level = c::SOL_SOCKET;
                (*cmsg).cmsg_type = c::SCM_RIGHTS;
                ptr::copy_nonoverlapping(
                    fds.as_ptr().cast::<u8>(),
                    c::CMSG_DATA(cmsg),
                    data_len,
                );
            }
            hdr.msg_control = cmsg_buf.as_mut_ptr().cast();
            hdr.msg_controllen = space as _;
        }
        let res = unsafe {
            c::sendmsg(
                fd.raw(),
                &hdr,
                c::MSG_DONTWAIT | c::MSG_NOSIGNAL,
            )
        };
        match res {
            -1 => match Errno::default() {
                Errno(c::EAGAIN | c::EINTR) => continue,
                Errno(c::ECONNRESET | c::EPIPE) => return Err(BufFdError::Closed),
                Errno(c::ETOOMANYREFS) if fds.len() > 0 => return Err(BufFdError::ShortFdWrite),
                e => return Err(BufFdError::Io(e.into())),
            },
            0 if fds.len() > 0 => return Err(BufFdError::ShortFdWrite),
            n => {
                offset += n as usize;
                fds = &[];
            }
        }
    }
    Ok(offset)
}

fn wait_writable(fd: &OwnedFd, timeout_ms: i32) -> Result<(), BufFdError> {
    let mut pollfd = c::pollfd {
        fd: fd.raw(),
        events: c::POLLOUT,
        revents: 0,
    };
    loop {
        match uapi::poll(slice::from_mut(&mut pollfd), timeout_ms) {
            Ok(0) => return Err(BufFdError::Timeout),
            Ok(_) if pollfd.revents & (c::POLLERR | c::POLLHUP) != 0 => {
                return Err(BufFdError::Closed);
            }
            Ok(_) => return Ok(()),
            Err(Errno(c::EINTR)) => {}
            Err(e) => return Err(BufFdError::Io(e.into())),
        }
    }
}
