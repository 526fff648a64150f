use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use resvg::tiny_skia;

use crate::assets::local::{LocalAssets, abbreviate};
use crate::eval::evaluator::{Evaluator, media_owners};
use crate::eval::reveal::{lines_at_step, step_count};
use crate::foundation::color::{Rgba8, parse_css_color};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::{MediaKind, Project};
use crate::render::chrome::{ChromeLayout, render_chrome};
use crate::render::media::{decode_image, fit_into_box, media_box};
use crate::render::svg::FontSet;
use crate::render::text::render_text_block;
use crate::render::video::VideoSource;

/// Media content of one owner card, already sized to its box.
#[derive(Clone, Debug)]
pub enum MediaLayer {
    /// Decoded image fitted into the box.
    Image(Arc<tiny_skia::Pixmap>),
    /// Video decoded per frame at render time.
    Video(VideoSource),
}

impl MediaLayer {
    /// Box size in output pixels.
    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Image(p) => (p.width(), p.height()),
            Self::Video(v) => (v.width, v.height),
        }
    }
}

/// A project with every asset decoded and every static layer rasterized.
///
/// Rendering a frame from a `PreparedProject` does no IO except decoding video frames.
#[derive(Debug)]
pub struct PreparedProject {
    project: Project,
    evaluator: Evaluator,
    background: Rgba8,
    chrome: Arc<tiny_skia::Pixmap>,
    content_top_px: f64,
    /// `text[card][step]`, `None` for steps with nothing to draw.
    text: Vec<Vec<Option<Arc<tiny_skia::Pixmap>>>>,
    media: HashMap<usize, MediaLayer>,
    warnings: Vec<String>,
}

impl PreparedProject {
    /// Decode assets and rasterize chrome and text layers.
    ///
    /// URLs missing from `assets` are skipped with a warning; files that are present but
    /// cannot be decoded are errors.
    pub fn prepare(project: &Project, assets: &LocalAssets, fonts: &FontSet) -> ReelResult<Self> {
        project.validate()?;
        let evaluator = Evaluator::new(project)?;
        let mut warnings = Vec::new();

        let background = parse_css_color(&project.project_settings.background_color)
            .map_err(ReelError::validation)?;

        let logo = match project.project_settings.header.logo.url.as_deref() {
            None => None,
            Some(url) => match assets.get(url) {
                Some(path) => Some(decode_image(path)?),
                None => {
                    warnings.push(missing(url, "logo"));
                    None
                }
            },
        };
        let chrome = render_chrome(fonts, project, logo.as_ref())?;
        let content_top_px = ChromeLayout::new(project).content_top * project.scale();

        let text = project
            .script_cards
            .par_iter()
            .map(|card| {
                (0..step_count(card))
                    .map(|step| {
                        let lines = lines_at_step(card, step);
                        Ok(render_text_block(fonts, project, card, &lines)?.map(Arc::new))
                    })
                    .collect::<ReelResult<Vec<_>>>()
            })
            .collect::<ReelResult<Vec<_>>>()?;

        let mut owners = media_owners(project);
        owners.sort_unstable();
        owners.dedup();

        let s = project.scale();
        let mut media = HashMap::new();
        for owner in owners {
            let card = &project.script_cards[owner];
            let Some(url) = card.media.url.as_deref() else {
                continue;
            };
            let Some(path) = assets.get(url) else {
                warnings.push(missing(url, "media"));
                continue;
            };
            let (bw, bh) = media_box(project, card);
            let (bw, bh) = (px(bw * s), px(bh * s));
            let layer = match card.media.kind {
                MediaKind::Image => {
                    let src = decode_image(path)?;
                    MediaLayer::Image(Arc::new(fit_into_box(&src, card.media.fit, bw, bh)?))
                }
                MediaKind::Video => MediaLayer::Video(VideoSource {
                    path: path.to_path_buf(),
                    fit: card.media.fit,
                    width: bw,
                    height: bh,
                }),
            };
            media.insert(owner, layer);
        }

        for w in &warnings {
            tracing::warn!("{w}");
        }
        tracing::debug!(
            cards = project.script_cards.len(),
            media_layers = media.len(),
            frames = evaluator.timeline().total_frames(),
            "project prepared"
        );

        Ok(Self {
            project: project.clone(),
            evaluator,
            background,
            chrome: Arc::new(chrome),
            content_top_px,
            text,
            media,
            warnings,
        })
    }

    /// The project this was prepared from.
    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn canvas(&self) -> Canvas {
        self.project.canvas()
    }

    pub fn fps(&self) -> Fps {
        self.evaluator.timeline().fps()
    }

    /// Number of frames in the video.
    pub fn total_frames(&self) -> u64 {
        self.evaluator.timeline().total_frames()
    }

    /// Page background; also the color alpha is flattened against when encoding.
    pub fn background(&self) -> Rgba8 {
        self.background
    }

    /// Assets that were skipped while preparing.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn chrome(&self) -> &tiny_skia::Pixmap {
        &self.chrome
    }

    /// Top of the content area in output pixels.
    pub(crate) fn content_top_px(&self) -> f64 {
        self.content_top_px
    }

    pub(crate) fn text_layer(&self, card: usize, step: usize) -> Option<&tiny_skia::Pixmap> {
        self.text.get(card)?.get(step)?.as_deref()
    }

    pub(crate) fn media_layer(&self, owner: usize) -> Option<&MediaLayer> {
        self.media.get(&owner)
    }
}

fn px(v: f64) -> u32 {
    v.round().max(1.0) as u32
}

fn missing(url: &str, what: &str) -> String {
    format!("{what} asset not available, skipping: {}", abbreviate(url))
}

#[cfg(test)]
#[path = "../../tests/unit/render/prepare.rs"]
mod tests;
