use {
    std::{
        error::Error,
        fmt::{Display, Formatter},
    },
    uapi::{Errno, c},
};

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct OsError(pub c::c_int);

impl From<Errno> for OsError {
    fn from(e: Errno) -> Self {
        Self(e.0)
    }
}

impl From<std::io::Error> for OsError {
    fn from(v: std::io::Error) -> Self {
        match v.raw_os_error() {
            Some(v) => Self(v),
            None => Self(c::EINVAL),
        }
    }
}

impl Default for OsError {
    fn default() -> Self {
        Errno::default().into()
    }
}

impl Error for OsError {}

impl Display for OsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = std::io::Error::from_raw_os_error(self.0);
        write!(f, "{}", msg)
    }
}
