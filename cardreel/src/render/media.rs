use std::path::Path;

use anyhow::Context as _;
use resvg::tiny_skia;

use crate::foundation::core::Affine;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::model::project::{MediaFit, Project, ScriptCard};

/// Media box size in preview units: explicit size, else full preview width at 16:9.
pub fn media_box(project: &Project, owner: &ScriptCard) -> (f64, f64) {
    let sw = project.render_metadata.source_width;
    let w = owner.media.width.unwrap_or(sw);
    let h = owner.media.height.unwrap_or(w * 9.0 / 16.0);
    (w, h)
}

/// Map source pixel space `(sw, sh)` into a `(bw, bh)` box according to `fit`.
pub fn fit_transform(fit: MediaFit, src: (f64, f64), dst: (f64, f64)) -> Affine {
    let (sw, sh) = (src.0.max(1.0), src.1.max(1.0));
    let (bw, bh) = dst;
    match fit {
        MediaFit::Fill => Affine::scale_non_uniform(bw / sw, bh / sh),
        MediaFit::Contain | MediaFit::Cover => {
            let s = if fit == MediaFit::Contain {
                (bw / sw).min(bh / sh)
            } else {
                (bw / sw).max(bh / sh)
            };
            let dx = (bw - sw * s) / 2.0;
            let dy = (bh - sh * s) / 2.0;
            Affine::translate((dx, dy)) * Affine::scale(s)
        }
    }
}

/// Convert a kurbo affine to a tiny-skia transform.
pub fn to_skia(a: Affine) -> tiny_skia::Transform {
    let [sx, ky, kx, sy, tx, ty] = a.as_coeffs();
    tiny_skia::Transform::from_row(
        sx as f32, ky as f32, kx as f32, sy as f32, tx as f32, ty as f32,
    )
}

/// Wrap straight RGBA8 bytes into a premultiplied pixmap.
pub fn pixmap_from_straight_rgba(
    mut data: Vec<u8>,
    width: u32,
    height: u32,
) -> ReelResult<tiny_skia::Pixmap> {
    if data.len() != (width as usize) * (height as usize) * 4 {
        return Err(ReelError::render(format!(
            "rgba buffer size mismatch for {width}x{height}: {} bytes",
            data.len()
        )));
    }
    premultiply_rgba8_in_place(&mut data);
    let size = tiny_skia::IntSize::from_wh(width, height)
        .ok_or_else(|| ReelError::render("image has zero width or height"))?;
    tiny_skia::Pixmap::from_vec(data, size)
        .ok_or_else(|| ReelError::render("failed to wrap image pixels"))
}

/// Decode a raster image file into a premultiplied pixmap.
pub fn decode_image(path: &Path) -> ReelResult<tiny_skia::Pixmap> {
    let img = image::ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniff image format of '{}'", path.display()))?
        .decode()
        .map_err(|e| ReelError::asset(format!("decode image '{}': {e}", path.display())))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    pixmap_from_straight_rgba(img.into_raw(), w, h)
}

/// Draw `src` into a new transparent `(bw, bh)` pixmap using `fit`. Overflow is clipped.
pub fn fit_into_box(
    src: &tiny_skia::Pixmap,
    fit: MediaFit,
    bw: u32,
    bh: u32,
) -> ReelResult<tiny_skia::Pixmap> {
    let mut out = tiny_skia::Pixmap::new(bw.max(1), bh.max(1))
        .ok_or_else(|| ReelError::render("failed to allocate media box"))?;
    let xf = fit_transform(
        fit,
        (f64::from(src.width()), f64::from(src.height())),
        (f64::from(bw), f64::from(bh)),
    );
    let paint = tiny_skia::PixmapPaint {
        quality: tiny_skia::FilterQuality::Bicubic,
        ..Default::default()
    };
    out.draw_pixmap(0, 0, src.as_ref(), &paint, to_skia(xf), None);
    Ok(out)
}

/// ffmpeg `-vf` fragment scaling a video stream into a `(bw, bh)` box.
pub fn video_fit_filter(fit: MediaFit, bw: u32, bh: u32) -> String {
    match fit {
        MediaFit::Contain => format!(
            "format=rgba,scale={bw}:{bh}:force_original_aspect_ratio=decrease,\
             pad={bw}:{bh}:(ow-iw)/2:(oh-ih)/2:color=black@0,setsar=1"
        ),
        MediaFit::Cover => format!(
            "format=rgba,scale={bw}:{bh}:force_original_aspect_ratio=increase,\
             crop={bw}:{bh},setsar=1"
        ),
        MediaFit::Fill => format!("format=rgba,scale={bw}:{bh},setsar=1"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/media.rs"]
mod tests;
