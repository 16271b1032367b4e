
use {
    crate::{
        client::ClientId,
        config::Config,
        format::Format,
        icons::{IconsError, placeholder_icon},
        scene::ClientScene,
        utils::oserror::OsError,
        wire::WlSurfaceId,
    },
    ahash::AHashMap,
    png::{BitDepth, ColorType, Encoder, SrgbRenderingIntent},
    std::{
        sync::Arc,
        time::{Duration, Instant},
    },
    thiserror::Error,
    tiny_skia::{Pixmap, PixmapPaint, Transform},
};

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Could not allocate a {0}x{1} framebuffer")]
    CreateFramebuffer(u32, u32),
    #[error("Could not create the placeholder icon")]
    Icon(#[source] IconsError),
    #[error("Could not encode the frame")]
    Encode(#[source] png::EncodingError),
    #[error("Could not write {0}")]
    Write(String, #[source] OsError),
}

/// Surfaces are unique per client, not globally.
type SurfaceKey = (Option<ClientId>, WlSurfaceId);

/// A surface with its position resolved against all of its ancestors.
pub struct Placement {
    pub client: Option<ClientId>,
    pub id: WlSurfaceId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub texture: Arc<Pixmap>,
}

struct Node {
    x: i32,
    y: i32,
    parent: Option<SurfaceKey>,
}

/// Flattens the scenes into paint order.
///
/// Surfaces without a texture are not drawn and neither are their children linked. The
/// result is sorted by z, then surface id, then client.
pub fn layout(scenes: &[Arc<ClientScene>]) -> Vec<Placement> {
    let mut nodes = AHashMap::<SurfaceKey, Node>::new();
    let mut parents = AHashMap::<SurfaceKey, SurfaceKey>::new();
    for scene in scenes {
        for surface in &scene.surfaces {
            if surface.texture.is_none() {
                continue;
            }
            let key = (scene.client, surface.id);
            for &child in &surface.children {
                parents.insert((scene.client, child), key);
            }
            nodes.insert(
                key,
                Node {
                    x: surface.x,
                    y: surface.y,
                    parent: None,
                },
            );
        }
    }
    for (child, parent) in parents {
        if let Some(node) = nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
    }
    let mut placements = vec![];
    for scene in scenes {
        for surface in &scene.surfaces {
            let Some(texture) = &surface.texture else {
                continue;
            };
            let (x, y) = absolute_position(&nodes, (scene.client, surface.id));
            placements.push(Placement {
                client: scene.client,
                id: surface.id,
                x,
                y,
                z: surface.z,
                texture: texture.clone(),
            });
        }
    }
    placements.sort_by_key(|p| (p.z, p.id, p.client));
    placements
}

fn absolute_position(nodes: &AHashMap<SurfaceKey, Node>, key: SurfaceKey) -> (i32, i32) {
    let (mut x, mut y) = (0i32, 0i32);
    let mut cur = Some(key);
    // A parent chain can never be longer than the number of surfaces.
    let mut budget = nodes.len();
    while let Some(key) = cur {
        let Some(node) = nodes.get(&key) else {
            break;
        };
        x = x.saturating_add(node.x);
        y = y.saturating_add(node.y);
        if budget == 0 {
            log::warn!("Surface {} is part of a parent cycle", key.1);
            break;
        }
        budget -= 1;
        cur = node.parent;
    }
    (x, y)
}

/// Composites client scenes into the virtual monitor.
pub struct Renderer {
    frame: Pixmap,
    icon: Pixmap,
    started: Instant,
    startup_grace: Duration,
}

impl Renderer {
    pub fn new(config: &Config) -> Result<Self, RendererError> {
        let frame = Pixmap::new(config.width, config.height)
            .ok_or(RendererError::CreateFramebuffer(config.width, config.height))?;
        let icon_size = (config.width.min(config.height) / 4).max(16);
        let icon = placeholder_icon(icon_size).map_err(RendererError::Icon)?;
        Ok(Self {
            frame,
            icon,
            started: Instant::now(),
            startup_grace: config.startup_grace,
        })
    }

    /// Paints one frame and returns the number of surfaces drawn.
    pub fn render(&mut self, scenes: &[Arc<ClientScene>]) -> usize {
        self.frame.fill(tiny_skia::Color::TRANSPARENT);
        let placements = layout(scenes);
        if placements.is_empty() {
            if self.started.elapsed() >= self.startup_grace {
                self.frame.draw_pixmap(
                    0,
                    0,
                    self.icon.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            return 0;
        }
        for p in &placements {
            self.frame.draw_pixmap(
                p.x,
                p.y,
                Pixmap::as_ref(&p.texture),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        placements.len()
    }

    /// Encodes the current frame as a non-premultiplied RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RendererError> {
        let mut data = Vec::with_capacity(self.frame.data().len());
        for pixel in self.frame.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let mut out = vec![];
        {
            let mut encoder = Encoder::new(&mut out, self.frame.width(), self.frame.height());
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            encoder.set_source_srgb(SrgbRenderingIntent::Perceptual);
            let mut writer = encoder.write_header().map_err(RendererError::Encode)?;
            writer
                .write_image_data(&data)
                .map_err(RendererError::Encode)?;
            writer.finish().map_err(RendererError::Encode)?;
        }
        Ok(out)
    }

    pub fn dump_png(&self, path: &str) -> Result<(), RendererError> {
        let png = self.encode_png()?;
        std::fs::write(path, png).map_err(|e| RendererError::Write(path.to_string(), e.into()))
    }
}

/// Converts shared memory pixels into a premultiplied texture.
///
/// The wire formats are little endian, so each pixel is stored as B, G, R, A. Formats
/// without alpha are opaque. Color channels larger than alpha are clamped so that the
/// result is a valid premultiplied color.
pub fn pixmap_from_shm(
    bytes: &[u8],
    format: &Format,
    width: u32,
    height: u32,
    stride: usize,
) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    let row_len = width as usize * 4;
    if stride < row_len || bytes.len() < stride * (height as usize - 1) + row_len {
        return None;
    }
    let rows = bytes.chunks(stride);
    for (src, dst) in rows.zip(pixmap.data_mut().chunks_exact_mut(row_len)) {
        for (s, d) in src[..row_len].chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
            let a = match format.has_alpha {
                true => s[3],
                false => 255,
            };
            d[0] = s[2].min(a);
            d[1] = s[1].min(a);
            d[2] = s[0].min(a);
            d[3] = a;
        }
    }
    Some(pixmap)
}
