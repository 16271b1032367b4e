use {
    crate::{client::ClientId, wire::WlSurfaceId},
    std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering::Relaxed},
        },
        time::Instant,
    },
    tiny_skia::Pixmap,
};

/// A drawable surface as seen by the compositor.
#[derive(Clone)]
pub struct SceneSurface {
    pub id: WlSurfaceId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub children: Vec<WlSurfaceId>,
    pub texture: Option<Arc<Pixmap>>,
}

/// The drawable surfaces of one client as of its last commit.
#[derive(Clone, Default)]
pub struct ClientScene {
    pub client: Option<ClientId>,
    pub surfaces: Vec<SceneSurface>,
}

/// Counts composited frames.
///
/// Clients compare the sequence number with the last one they saw to decide when to fire
/// their frame callbacks.
pub struct FrameClock {
    seq: AtomicU64,
    epoch: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            seq: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }
}

impl FrameClock {
    pub fn tick(&self) -> u64 {
        self.seq.fetch_add(1, Relaxed) + 1
    }

    pub fn seq(&self) -> u64 {
        self.seq.load(Relaxed)
    }

    /// Milliseconds since the clock was created, truncated as in frame callback timestamps.
    pub fn now_ms(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }
}
