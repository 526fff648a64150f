use std::path::Path;

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Straight-alpha copy of a premultiplied frame.
pub fn unpremultiply(frame: &FrameRGBA) -> Vec<u8> {
    let mut out = frame.data.clone();
    for px in out.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

/// Write a frame as a PNG file, creating parent directories as needed.
pub fn frame_to_png(frame: &FrameRGBA, path: &Path) -> ReelResult<()> {
    if frame.data.len() != (frame.width as usize) * (frame.height as usize) * 4 {
        return Err(ReelError::encode("frame.data size mismatch with width*height*4"));
    }
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &unpremultiply(frame),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
