use resvg::tiny_skia;

use crate::animation::motion::Motion;
use crate::eval::evaluator::FrameState;
use crate::foundation::core::{Affine, FrameIndex, Vec2};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::Placement;
use crate::render::frame::FrameRGBA;
use crate::render::media::to_skia;
use crate::render::prepare::{MediaLayer, PreparedProject};

/// Render one frame.
///
/// Video media is decoded on demand, one frame per call; [`crate::encode::pipeline`] batches
/// video decoding per card instead.
pub fn render_frame(prepared: &PreparedProject, frame: FrameIndex) -> ReelResult<FrameRGBA> {
    let state = prepared.evaluator().eval_frame(frame)?;
    let video = match (video_source_for(prepared, &state), state.media) {
        (Some(src), Some(media)) => src
            .decode_frames(media.source_time, prepared.fps(), 1)?
            .into_iter()
            .next(),
        _ => None,
    };
    compose(prepared, &state, video.as_ref())
}

pub(crate) fn video_source_for<'a>(
    prepared: &'a PreparedProject,
    state: &FrameState,
) -> Option<&'a crate::render::video::VideoSource> {
    let media = state.media.as_ref()?;
    match prepared.media_layer(media.owner)? {
        MediaLayer::Video(v) => Some(v),
        MediaLayer::Image(_) => None,
    }
}

/// Draw `state` onto a fresh canvas. `video` is the decoded frame for video media, if any.
pub(crate) fn compose(
    prepared: &PreparedProject,
    state: &FrameState,
    video: Option<&tiny_skia::Pixmap>,
) -> ReelResult<FrameRGBA> {
    let canvas = prepared.canvas();
    let mut pixmap = tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| ReelError::render("failed to allocate frame"))?;

    let bg = prepared.background();
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

    let project = prepared.project();
    let scale = project.scale();
    let origin = Vec2::new(0.0, prepared.content_top_px());

    if let Some(media) = &state.media {
        let layer = match prepared.media_layer(media.owner) {
            Some(MediaLayer::Image(p)) => Some(p.as_ref()),
            Some(MediaLayer::Video(_)) => video,
            None => None,
        };
        if let Some(layer) = layer {
            let placement = &project.script_cards[media.owner].layout.media;
            draw_block(&mut pixmap, layer, placement, &media.motion, origin, scale);
        }
    }

    if let Some(layer) = prepared.text_layer(state.card, state.text.step) {
        let placement = &project.script_cards[state.card].layout.text;
        draw_block(&mut pixmap, layer, placement, &state.text.motion, origin, scale);
    }

    pixmap.draw_pixmap(
        0,
        0,
        prepared.chrome().as_ref(),
        &tiny_skia::PixmapPaint::default(),
        tiny_skia::Transform::identity(),
        None,
    );

    Ok(FrameRGBA::from_pixmap(pixmap))
}

/// Placement and motion of a block whose top-left sits at `origin + (x, y)·scale`.
///
/// Rotation and scale pivot on the block center; the motion offset is applied after rotation.
pub fn block_transform(
    size: (f64, f64),
    placement: &Placement,
    motion: &Motion,
    origin: Vec2,
    scale: f64,
) -> Affine {
    let center = Vec2::new(size.0 / 2.0, size.1 / 2.0);
    let at = origin + Vec2::new(placement.x, placement.y) * scale + center;
    Affine::translate(at + Vec2::new(0.0, motion.translate_y))
        * Affine::rotate(placement.angle.to_radians())
        * Affine::scale(placement.effective_scale() * motion.scale)
        * Affine::translate(-center)
}

fn draw_block(
    dst: &mut tiny_skia::Pixmap,
    layer: &tiny_skia::Pixmap,
    placement: &Placement,
    motion: &Motion,
    origin: Vec2,
    scale: f64,
) {
    let opacity = motion.opacity.clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return;
    }
    let xf = block_transform(
        (f64::from(layer.width()), f64::from(layer.height())),
        placement,
        motion,
        origin,
        scale,
    );
    let quality = if is_pixel_aligned(xf) {
        tiny_skia::FilterQuality::Nearest
    } else {
        tiny_skia::FilterQuality::Bilinear
    };
    let paint = tiny_skia::PixmapPaint {
        opacity,
        quality,
        ..Default::default()
    };
    dst.draw_pixmap(0, 0, layer.as_ref(), &paint, to_skia(xf), None);
}

fn is_pixel_aligned(a: Affine) -> bool {
    let [sx, ky, kx, sy, tx, ty] = a.as_coeffs();
    sx == 1.0 && sy == 1.0 && ky == 0.0 && kx == 0.0 && tx.fract() == 0.0 && ty.fract() == 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
