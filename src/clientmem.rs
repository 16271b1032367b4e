
use {
    crate::utils::oserror::OsError,
    std::{
        cell::Cell,
        mem, ptr, slice,
        sync::atomic::{Ordering, compiler_fence},
    },
    thiserror::Error,
    uapi::{OwnedFd, c},
};

#[derive(Debug, Error)]
pub enum ClientMemError {
    #[error("Could not install the sigbus handler")]
    SigactionFailed(#[source] OsError),
    #[error("A SIGBUS occurred while accessing mapped memory")]
    Sigbus,
    #[error("mmap failed")]
    MmapFailed(#[source] OsError),
    #[error("mremap failed")]
    RemapFailed(#[source] OsError),
    #[error("Could not stat the file descriptor")]
    Fstat(#[source] OsError),
    #[error("Cannot map a region of size 0")]
    Empty,
    #[error("The file has size {0} but the client requested a mapping of size {1}")]
    FileTooSmall(u64, usize),
    #[error("The mapping is unusable after a failed remap")]
    Unusable,
    #[error("The mapping has been released")]
    Unmapped,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum MemState {
    Mapped,
    Unusable,
    Unmapped,
}

/// A shared memory region supplied by a client.
///
/// Remap and unmap must not race each other; the owning client thread is the only mutator.
pub struct ClientMem {
    fd: OwnedFd,
    data: *mut c::c_void,
    len: usize,
    state: MemState,
    failed: Cell<bool>,
    sigbus_impossible: bool,
}

unsafe impl Send for ClientMem {}

impl ClientMem {
    pub fn new(fd: OwnedFd, len: usize) -> Result<Self, ClientMemError> {
        if len == 0 {
            return Err(ClientMemError::Empty);
        }
        check_size(&fd, len)?;
        let data = unsafe {
            c::mmap64(
                ptr::null_mut(),
                len,
                c::PROT_READ,
                c::MAP_SHARED,
                fd.raw(),
                0,
            )
        };
        if data == c::MAP_FAILED {
            return Err(ClientMemError::MmapFailed(uapi::Errno::default().into()));
        }
        let sigbus_impossible = cannot_shrink_below(&fd, len);
        Ok(Self {
            fd,
            data,
            len,
            state: MemState::Mapped,
            failed: Cell::new(false),
            sigbus_impossible,
        })
    }

    pub fn len(&self) -> usize {
        match self.state {
            MemState::Mapped => self.len,
            _ => 0,
        }
    }

    /// Changes the length of the mapping. The common prefix keeps its contents.
    ///
    /// A failure leaves the region permanently unusable.
    pub fn remap(&mut self, len: usize) -> Result<(), ClientMemError> {
        match self.state {
            MemState::Mapped => {}
            MemState::Unusable => return Err(ClientMemError::Unusable),
            MemState::Unmapped => return Err(ClientMemError::Unmapped),
        }
        if let Err(e) = self.try_remap(len) {
            self.release();
            self.state = MemState::Unusable;
            return Err(e);
        }
        Ok(())
    }

    fn try_remap(&mut self, len: usize) -> Result<(), ClientMemError> {
        if len == 0 {
            return Err(ClientMemError::Empty);
        }
        check_size(&self.fd, len)?;
        let data = unsafe { c::mremap(self.data, self.len, len, c::MREMAP_MAYMOVE) };
        if data == c::MAP_FAILED {
            return Err(ClientMemError::RemapFailed(uapi::Errno::default().into()));
        }
        self.data = data;
        self.len = len;
        self.sigbus_impossible = cannot_shrink_below(&self.fd, len);
        Ok(())
    }

    /// Releases the mapping. Calling this more than once has no effect.
    pub fn unmap(&mut self) {
        if self.state == MemState::Mapped {
            self.release();
            self.state = MemState::Unmapped;
        }
    }

    fn release(&mut self) {
        if self.state == MemState::Mapped {
            unsafe {
                c::munmap(self.data, self.len);
            }
            self.data = ptr::null_mut();
            self.len = 0;
        }
    }

    /// Runs `f` on the mapped bytes.
    ///
    /// The client can shrink the file at any time. A read past the end of the file raises
    /// SIGBUS, which the handler installed by `init` turns into `ClientMemError::Sigbus`.
    /// Once that has happened the region keeps failing.
    pub fn access<T, F: FnOnce(&[u8]) -> T>(&self, f: F) -> Result<T, ClientMemError> {
        match self.state {
            MemState::Mapped => {}
            MemState::Unusable => return Err(ClientMemError::Unusable),
            MemState::Unmapped => return Err(ClientMemError::Unmapped),
        }
        if self.failed.get() {
            return Err(ClientMemError::Sigbus);
        }
        let bytes = unsafe { slice::from_raw_parts(self.data as *const u8, self.len) };
        if self.sigbus_impossible {
            return Ok(f(bytes));
        }
        check_size(&self.fd, self.len)?;
        let mref = MemRef {
            mem: self,
            outer: MEM.get(),
        };
        MEM.set(&mref);
        compiler_fence(Ordering::SeqCst);
        let res = f(bytes);
        compiler_fence(Ordering::SeqCst);
        MEM.set(mref.outer);
        match self.failed.get() {
            true => Err(ClientMemError::Sigbus),
            false => Ok(res),
        }
    }
}

impl Drop for ClientMem {
    fn drop(&mut self) {
        self.unmap();
    }
}

fn check_size(fd: &OwnedFd, len: usize) -> Result<(), ClientMemError> {
    let stat = match uapi::fstat(fd.raw()) {
        Ok(s) => s,
        Err(e) => return Err(ClientMemError::Fstat(e.into())),
    };
    if (stat.st_size as u64) < len as u64 {
        return Err(ClientMemError::FileTooSmall(stat.st_size as u64, len));
    }
    Ok(())
}

/// Returns whether the file is sealed against shrinking and covers `len` bytes.
fn cannot_shrink_below(fd: &OwnedFd, len: usize) -> bool {
    match uapi::fcntl_get_seals(fd.raw()) {
        Ok(seals) if seals & c::F_SEAL_SHRINK != 0 => {
            matches!(uapi::fstat(fd.raw()), Ok(s) if s.st_size as u64 >= len as u64)
        }
        _ => false,
    }
}

struct MemRef {
    mem: *const ClientMem,
    outer: *const MemRef,
}

thread_local! {
    static MEM: Cell<*const MemRef> = const { Cell::new(ptr::null()) };
}

unsafe fn kill() {
    unsafe {
        c::signal(c::SIGBUS, c::SIG_DFL);
        c::raise(c::SIGBUS);
    }
}

unsafe extern "C" fn sigbus(sig: i32, info: &c::siginfo_t, _ucontext: *mut c::c_void) {
    if sig != c::SIGBUS {
        return;
    }
    let fault_addr = unsafe { info.si_addr() } as usize;
    let mut memr_ptr = MEM.get();
    while !memr_ptr.is_null() {
        let memr = unsafe { &*memr_ptr };
        let mem = unsafe { &*memr.mem };
        let lo = mem.data as usize;
        let hi = lo + mem.len;
        if fault_addr < lo || fault_addr >= hi {
            memr_ptr = memr.outer;
            continue;
        }
        let res = unsafe {
            c::mmap64(
                mem.data,
                mem.len,
                c::PROT_READ,
                c::MAP_ANONYMOUS | c::MAP_PRIVATE | c::MAP_FIXED,
                -1,
                0,
            )
        };
        if res == c::MAP_FAILED {
            unsafe { kill() };
            return;
        }
        mem.failed.set(true);
        return;
    }
    unsafe { kill() };
}

/// Installs the SIGBUS handler used by `ClientMem::access`.
pub fn init() -> Result<(), ClientMemError> {
    unsafe {
        let mut action: c::sigaction = mem::zeroed();
        action.sa_sigaction =
            sigbus as unsafe extern "C" fn(i32, &c::siginfo_t, *mut c::c_void) as _;
        action.sa_flags = c::SA_NODEFER | c::SA_SIGINFO;
        let res = c::sigaction(c::SIGBUS, &action, ptr::null_mut());
        match uapi::map_err!(res) {
            Ok(_) => Ok(()),
            Err(e) => Err(ClientMemError::SigactionFailed(e.into())),
        }
    }
}
