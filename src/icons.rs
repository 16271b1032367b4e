#[cfg(test)]
mod tests;

use {
    thiserror::Error,
    tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Transform},
};

/// The icon is designed on a 100x100 grid and scaled to the requested size.
const GRID: f32 = 100.0;

#[derive(Debug, Error)]
pub enum IconsError {
    #[error("Could not create a pixmap")]
    CreatePixmap,
    #[error("Could not build the icon path")]
    BuildPath,
}

/// A window frame with a title bar and three buttons cut out of it.
fn window_path() -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.push_rect(Rect::from_xywh(10.0, 15.0, 80.0, 70.0)?);
    pb.push_rect(Rect::from_xywh(16.0, 31.0, 68.0, 48.0)?);
    for x in [22.0, 32.0, 42.0] {
        pb.push_circle(x, 23.0, 3.0);
    }
    pb.finish()
}

/// A prompt chevron inside the window.
fn prompt_path() -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(26.0, 42.0);
    pb.line_to(40.0, 52.0);
    pb.line_to(26.0, 62.0);
    pb.line_to(26.0, 56.0);
    pb.line_to(32.0, 52.0);
    pb.line_to(26.0, 48.0);
    pb.close();
    pb.push_rect(Rect::from_xywh(44.0, 58.0, 18.0, 5.0)?);
    pb.finish()
}

/// Draws the icon shown while no client has anything on screen.
pub fn placeholder_icon(size: u32) -> Result<Pixmap, IconsError> {
    let mut pixmap = Pixmap::new(size, size).ok_or(IconsError::CreatePixmap)?;
    let window = window_path().ok_or(IconsError::BuildPath)?;
    let prompt = prompt_path().ok_or(IconsError::BuildPath)?;
    let s = size as f32 / GRID;
    let transform = Transform::from_scale(s, s);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(Color::from_rgba8(0xcc, 0xcc, 0xcc, 0xff));
    pixmap.fill_path(&window, &paint, FillRule::EvenOdd, transform, None);
    paint.set_color(Color::from_rgba8(0x55, 0xaa, 0x55, 0xff));
    pixmap.fill_path(&prompt, &paint, FillRule::Winding, transform, None);
    Ok(pixmap)
}
