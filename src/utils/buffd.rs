use {crate::utils::oserror::OsError, thiserror::Error};
pub use {
    buf_in::{BufFdIn, Received},
    buf_out::BufFdOut,
    formatter::MsgFormatter,
    framer::{Message, MsgFramer},
    parser::{MsgParser, MsgParserError},
};

mod buf_in;
mod buf_out;
mod formatter;
mod framer;
mod parser;
#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum BufFdError {
    #[error("An IO error occurred")]
    Io(#[source] OsError),
    #[error("The payload was truncated")]
    PayloadTruncated,
    #[error("The control data was truncated")]
    ControlTruncated,
    #[error("The file descriptors could not be transferred together with the payload")]
    ShortFdWrite,
    #[error("The peer sent too many file descriptors")]
    TooManyFds,
    #[error("The peer closed the connection")]
    Closed,
    #[error("The connection timed out")]
    Timeout,
    #[error("A message of {0} bytes does not fit into the size field")]
    MessageTooLarge(usize),
}

pub const BUF_SIZE: usize = 4096;
pub const MAX_IN_FD: usize = 255;
