use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use resvg::tiny_skia;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::eval::evaluator::FrameState;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::compose::{compose, video_source_for};
use crate::render::frame::FrameRGBA;
use crate::render::prepare::PreparedProject;

#[derive(Clone, Debug)]
/// Chunking, threading and output controls for [`render_to_sink`].
pub struct RenderOptions {
    /// Frames rendered per batch; progress and cancellation are checked between batches.
    pub chunk_size: usize,
    /// Worker thread count; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Render each distinct frame state once per chunk and reuse the pixels.
    pub static_frame_elision: bool,
    /// Frames to render; `None` renders the whole timeline.
    pub range: Option<FrameRange>,
    /// Mixed audio handed to the sink.
    pub audio: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            threads: None,
            static_frame_elision: true,
            range: None,
            audio: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Aggregated rendering counters.
pub struct RenderStats {
    /// Total requested frames.
    pub frames_total: u64,
    /// Frames that were actually rasterized.
    pub frames_rendered: u64,
    /// Frames reused via static-frame elision.
    pub frames_elided: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Reported after every chunk.
pub struct RenderProgress {
    pub frames_done: u64,
    pub frames_total: u64,
}

impl RenderProgress {
    /// Completed share in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.frames_total == 0 {
            1.0
        } else {
            self.frames_done as f64 / self.frames_total as f64
        }
    }
}

/// Render frames of `prepared` into `sink`.
///
/// Frames are pushed in timeline order. `cancel` is polled before every chunk; once set, the
/// sink is abandoned without `end` and [`ReelError::Cancelled`] is returned.
pub fn render_to_sink(
    prepared: &PreparedProject,
    sink: &mut dyn FrameSink,
    opts: &RenderOptions,
    progress: &mut dyn FnMut(RenderProgress),
    cancel: &AtomicBool,
) -> ReelResult<RenderStats> {
    let full = prepared.evaluator().timeline().range();
    let range = opts.range.unwrap_or(full);
    if range.is_empty() {
        return Err(ReelError::validation("render range must be non-empty"));
    }
    if range.end.0 > full.end.0 {
        return Err(ReelError::validation(format!(
            "render range {}..{} exceeds timeline of {} frames",
            range.start.0, range.end.0, full.end.0
        )));
    }

    let canvas = prepared.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: prepared.fps(),
        audio: opts.audio.clone(),
    })?;

    let pool = build_thread_pool(opts.threads)?;
    let chunk_size = normalized_chunk_size(opts.chunk_size);
    let total = range.len_frames();
    let mut stats = RenderStats::default();

    for chunk in range.chunks(chunk_size) {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(frame = chunk.start.0, "render cancelled");
            return Err(ReelError::Cancelled);
        }

        let out = render_chunk(prepared, chunk, opts.static_frame_elision, &pool)?;
        for (offset, &u) in out.frame_to_unique.iter().enumerate() {
            let frame = out.unique_frames.get(u).ok_or_else(|| {
                ReelError::render("internal error: unique frame index out of range")
            })?;
            sink.push_frame(FrameIndex(chunk.start.0 + offset as u64), frame)?;
        }

        stats.frames_total += out.stats.frames_total;
        stats.frames_rendered += out.stats.frames_rendered;
        stats.frames_elided += out.stats.frames_elided;

        progress(RenderProgress {
            frames_done: chunk.end.0 - range.start.0,
            frames_total: total,
        });
    }

    sink.end()?;
    tracing::debug!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "render finished"
    );
    Ok(stats)
}

struct ChunkOut {
    unique_frames: Vec<FrameRGBA>,
    frame_to_unique: Vec<usize>,
    stats: RenderStats,
}

fn render_chunk(
    prepared: &PreparedProject,
    range: FrameRange,
    elide: bool,
    pool: &rayon::ThreadPool,
) -> ReelResult<ChunkOut> {
    let states = (range.start.0..range.end.0)
        .map(|f| prepared.evaluator().eval_frame(FrameIndex(f)))
        .collect::<ReelResult<Vec<_>>>()?;

    let mut unique_indices = Vec::<usize>::with_capacity(states.len());
    let mut frame_to_unique = Vec::<usize>::with_capacity(states.len());
    if elide {
        let mut first = HashMap::<u64, usize>::new();
        for (idx, state) in states.iter().enumerate() {
            let slot = *first.entry(state.fingerprint()).or_insert_with(|| {
                unique_indices.push(idx);
                unique_indices.len() - 1
            });
            frame_to_unique.push(slot);
        }
    } else {
        unique_indices.extend(0..states.len());
        frame_to_unique.extend(0..states.len());
    }

    let video = decode_chunk_video(prepared, &states, &unique_indices)?;

    let rendered = pool.install(|| {
        unique_indices
            .par_iter()
            .map(|&idx| {
                let state = &states[idx];
                compose(prepared, state, video.frame_for(state))
            })
            .collect::<Vec<_>>()
    });
    let unique_frames = rendered.into_iter().collect::<ReelResult<Vec<_>>>()?;

    let total = states.len() as u64;
    let rendered_count = unique_indices.len() as u64;
    Ok(ChunkOut {
        unique_frames,
        frame_to_unique,
        stats: RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total.saturating_sub(rendered_count),
        },
    })
}

/// Decoded video frames of one chunk, keyed by card.
#[derive(Default)]
struct ChunkVideo {
    by_card: HashMap<usize, (u64, Vec<tiny_skia::Pixmap>)>,
}

impl ChunkVideo {
    /// Frame for `state`; a source that ran short holds its last frame.
    fn frame_for(&self, state: &FrameState) -> Option<&tiny_skia::Pixmap> {
        let local = state.media?.video_frame?;
        let (first, frames) = self.by_card.get(&state.card)?;
        let i = local.checked_sub(*first)? as usize;
        frames.get(i).or_else(|| frames.last())
    }
}

fn decode_chunk_video(
    prepared: &PreparedProject,
    states: &[FrameState],
    unique_indices: &[usize],
) -> ReelResult<ChunkVideo> {
    // Per card: (first state index, last video frame).
    let mut spans = HashMap::<usize, (usize, u64)>::new();
    for &idx in unique_indices {
        let state = &states[idx];
        if video_source_for(prepared, state).is_none() {
            continue;
        }
        let Some(local) = state.media.and_then(|m| m.video_frame) else {
            continue;
        };
        spans
            .entry(state.card)
            .and_modify(|(_, last)| *last = (*last).max(local))
            .or_insert((idx, local));
    }

    let mut out = ChunkVideo::default();
    for (card, (first_idx, last)) in spans {
        let state = &states[first_idx];
        let (Some(src), Some(media)) = (video_source_for(prepared, state), state.media) else {
            continue;
        };
        let Some(first) = media.video_frame else {
            continue;
        };
        let count = u32::try_from(last - first + 1)
            .map_err(|_| ReelError::render("video chunk too long"))?;
        let frames = src.decode_frames(media.source_time, prepared.fps(), count)?;
        if frames.is_empty() {
            tracing::warn!(card, path = %src.path.display(), "video produced no frames, skipping layer");
            continue;
        }
        out.by_card.insert(card, (first, frames));
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "render option 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/pipeline.rs"]
mod tests;
