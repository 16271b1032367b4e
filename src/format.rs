use std::fmt::{Debug, Formatter};

/// A pixel format that clients can use for shm buffers.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Format {
    pub name: &'static str,
    /// The value used in `wl_shm.format`.
    pub wl_id: u32,
    pub drm: u32,
    pub bpp: u32,
    pub has_alpha: bool,
}

impl Debug for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

const fn fourcc_code(a: char, b: char, c: char, d: char) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

pub static ARGB8888: &Format = &Format {
    name: "argb8888",
    wl_id: 0,
    drm: fourcc_code('A', 'R', '2', '4'),
    bpp: 4,
    has_alpha: true,
};

pub static XRGB8888: &Format = &Format {
    name: "xrgb8888",
    wl_id: 1,
    drm: fourcc_code('X', 'R', '2', '4'),
    bpp: 4,
    has_alpha: false,
};

static FORMATS: &[&Format] = &[ARGB8888, XRGB8888];

pub fn formats() -> &'static [&'static Format] {
    FORMATS
}

/// Looks up a format by its `wl_shm.format` value.
///
/// Clients may also name the two mandatory formats by their fourcc.
pub fn shm_format(id: u32) -> Option<&'static Format> {
    FORMATS.iter().copied().find(|f| f.wl_id == id || f.drm == id)
}
