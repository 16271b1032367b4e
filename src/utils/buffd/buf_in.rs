use {
    crate::utils::buffd::{BUF_SIZE, BufFdError, MAX_IN_FD},
    std::{mem, ptr, slice, sync::Arc},
    uapi::{Errno, OwnedFd, c},
};

const CMSG_BUF_SIZE: usize = cmsg_space(MAX_IN_FD * mem::size_of::<c::c_int>());

const fn cmsg_space(len: usize) -> usize {
    let align = mem::size_of::<usize>();
    let hdr = (mem::size_of::<c::cmsghdr>() + align - 1) & !(align - 1);
    hdr + ((len + align - 1) & !(align - 1))
}

#[derive(Debug)]
pub enum Received<'a> {
    /// Nothing arrived within the timeout.
    Timeout,
    Data {
        bytes: &'a [u8],
        fds: Vec<OwnedFd>,
    },
    /// The peer closed the connection.
    Eof,
}

pub struct BufFdIn {
    fd: Arc<OwnedFd>,
    in_buf: Box<[u8; BUF_SIZE]>,
    in_cmsg_buf: Box<[u64; CMSG_BUF_SIZE / 8 + 1]>,
}

impl BufFdIn {
    pub fn new(fd: Arc<OwnedFd>) -> Self {
        Self {
            fd,
            in_buf: Box::new([0; BUF_SIZE]),
            in_cmsg_buf: Box::new([0; CMSG_BUF_SIZE / 8 + 1]),
        }
    }

    /// Receives one chunk of payload together with the file descriptors that accompany it.
    ///
    /// Waits at most `timeout_ms` for the socket to become readable.
    pub fn read(&mut self, timeout_ms: i32) -> Result<Received<'_>, BufFdError> {
        let mut pollfd = c::pollfd {
            fd: self.fd.raw(),
            events: c::POLLIN,
            revents: 0,
        };
        match uapi::poll(slice::from_mut(&mut pollfd), timeout_ms) {
            Ok(0) => return Ok(Received::Timeout),
            Ok(_) => {}
            Err(Errno(c::EINTR)) => return Ok(Received::Timeout),
            Err(e) => return Err(BufFdError::Io(e.into())),
        }
        let mut iov = c::iovec {
            iov_base: self.in_buf.as_mut_ptr().cast(),
            iov_len: BUF_SIZE,
        };
        let mut hdr: c::msghdr = unsafe { mem::zeroed() };
        hdr.msg_name = ptr::null_mut();
        hdr.msg_namelen = 0;
        hdr.msg_iov = &mut iov;
        hdr.msg_iovlen = 1 as _;
        hdr.msg_control = self.in_cmsg_buf.as_mut_ptr().cast();
        hdr.msg_controllen = CMSG_BUF_SIZE as _;
        let res = unsafe {
            c::recvmsg(
                self.fd.raw(),
                &mut hdr,
                c::MSG_DONTWAIT | c::MSG_CMSG_CLOEXEC,
            )
        };
        let res = match res {
            -1 => Err(Errno::default()),
            n => Ok(n as usize),
        };
        let len = match res {
            Ok(0) => return Ok(Received::Eof),
            Ok(n) => n,
            Err(Errno(c::EAGAIN | c::EINTR)) => return Ok(Received::Timeout),
            Err(Errno(c::ECONNRESET)) => return Ok(Received::Eof),
            Err(e) => return Err(BufFdError::Io(e.into())),
        };
        let fds = self.collect_fds(&hdr)?;
        if hdr.msg_flags & c::MSG_TRUNC != 0 {
            return Err(BufFdError::PayloadTruncated);
        }
        if hdr.msg_flags & c::MSG_CTRUNC != 0 {
            return Err(BufFdError::ControlTruncated);
        }
        Ok(Received::Data {
            bytes: &self.in_buf[..len],
            fds,
        })
    }

    fn collect_fds(&self, hdr: &c::msghdr) -> Result<Vec<OwnedFd>, BufFdError> {
        let mut fds = vec![];
        let control_len = hdr.msg_controllen as usize;
        if control_len == 0 {
            return Ok(fds);
        }
        let control = unsafe {
            slice::from_raw_parts(self.in_cmsg_buf.as_ptr().cast::<u8>(), control_len)
        };
        let mut cmsg = control;
        while cmsg.len() > 0 {
            let (_, chdr, data) = match uapi::cmsg_read(&mut cmsg) {
                Ok(m) => m,
                Err(e) => return Err(BufFdError::Io(e.into())),
            };
            if (chdr.cmsg_level, chdr.cmsg_type) == (c::SOL_SOCKET, c::SCM_RIGHTS) {
                for raw in data.chunks_exact(mem::size_of::<c::c_int>()) {
                    let mut bytes = [0; mem::size_of::<c::c_int>()];
                    bytes.copy_from_slice(raw);
                    fds.push(OwnedFd::new(c::c_int::from_ne_bytes(bytes)));
                }
            }
        }
        if fds.len() > MAX_IN_FD {
            return Err(BufFdError::TooManyFds);
        }
        Ok(fds)
    }
}
