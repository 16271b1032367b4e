use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering::Relaxed},
};

/// A cancellation flag shared by every long running loop.
///
/// Loops block with bounded timeouts and check the token after each wakeup, so the latency
/// of a shutdown is bounded by the longest of those timeouts.
#[derive(Clone, Default)]
pub struct ShutdownToken {
    triggered: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// Returns `true` if this call triggered the shutdown.
    pub fn trigger(&self) -> bool {
        !self.triggered.swap(true, Relaxed)
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Relaxed)
    }
}
