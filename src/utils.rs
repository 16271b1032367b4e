pub mod buffd;
pub mod errorfmt;
pub mod oserror;
pub mod shutdown;
pub mod syncqueue;
pub mod unlink_on_drop;
pub mod xrd;
