use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use resvg::tiny_skia;

use crate::foundation::error::{ReelError, ReelResult};

/// Font database shared by every SVG the engine parses.
#[derive(Clone)]
pub struct FontSet {
    db: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontSet {
    /// System fonts plus every `.ttf`/`.otf`/`.ttc` in `extra_dir`.
    pub fn load(extra_dir: Option<&Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self { db: Arc::new(db) }
    }

    /// Only the fonts in `dir` (no system fonts). Mostly for tests.
    pub fn from_dir(dir: &Path) -> Self {
        let mut db = usvg::fontdb::Database::new();
        load_fonts_from_dir(&mut db, dir);
        Self { db: Arc::new(db) }
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: self.db.clone(),
            font_resolver: make_svg_font_resolver(),
            ..Default::default()
        }
    }

    /// Parse SVG markup.
    pub fn parse(&self, svg: &str) -> ReelResult<usvg::Tree> {
        let tree = usvg::Tree::from_str(svg, &self.options()).context("parse svg markup")?;
        Ok(tree)
    }

    /// Rendered width of one line of text, in pixels.
    ///
    /// Returns `0` for text that produces no outlines (blank lines, missing glyphs).
    pub fn measure_line(&self, line: &str, font: &FontSpec<'_>) -> ReelResult<f64> {
        if line.trim().is_empty() {
            return Ok(0.0);
        }
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"><text x="0" y="0" {attrs} xml:space="preserve">{text}</text></svg>"#,
            attrs = font.svg_attrs(),
            text = xml_escape(line),
        );
        let tree = self.parse(&svg)?;
        let w = f64::from(tree.root().abs_bounding_box().width());
        Ok(if w.is_finite() { w } else { 0.0 })
    }
}

/// Font parameters shared by text measurement and text drawing.
#[derive(Clone, Copy, Debug)]
pub struct FontSpec<'a> {
    /// CSS font-family list.
    pub family: &'a str,
    /// Size in output pixels.
    pub size: f64,
    /// CSS numeric weight.
    pub weight: u16,
    /// Extra advance per character in output pixels.
    pub letter_spacing: f64,
}

impl FontSpec<'_> {
    /// `font-*` and `letter-spacing` attributes for an SVG `<text>` element.
    pub fn svg_attrs(&self) -> String {
        let mut s = format!(
            r#"font-family="{}" font-size="{:.3}" font-weight="{}""#,
            xml_escape(self.family),
            self.size,
            self.weight
        );
        if self.letter_spacing != 0.0 {
            s.push_str(&format!(r#" letter-spacing="{:.3}""#, self.letter_spacing));
        }
        s
    }
}

/// Rasterize `tree` at its intrinsic size into a premultiplied pixmap.
pub fn rasterize(tree: &usvg::Tree) -> ReelResult<tiny_skia::Pixmap> {
    fn to_px(v: f32) -> ReelResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(ReelError::render("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;

    const MAX_DIM: u32 = 16_384;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(ReelError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| ReelError::render("failed to allocate svg pixmap"))?;
    resvg::render(tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Escape text for use inside SVG element content or attribute values.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "fonts directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_fonts_from_dir(db, &path);
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

fn make_svg_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            // Unknown families fall back to the first loaded face rather than dropping text.
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
