use resvg::tiny_skia;

use crate::foundation::color::parse_css_color;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::{Project, ScriptCard, TextAlign};
use crate::render::svg::{FontSet, FontSpec, rasterize, xml_escape};

/// Inner padding of a text block with a background box, in preview units.
pub const TEXT_BOX_PADDING: f64 = 8.0;
/// Horizontal inset used when neither the style nor the layout sets a wrap width.
pub const DEFAULT_TEXT_INSET: f64 = 40.0;

/// Greedy word wrap.
///
/// Each input line is wrapped independently on spaces; a word wider than `max_width` on its
/// own is split between characters. Blank input lines are kept as a single space so they
/// still occupy a line.
pub fn wrap_lines(
    lines: &[String],
    max_width: f64,
    mut measure: impl FnMut(&str) -> ReelResult<f64>,
) -> ReelResult<Vec<String>> {
    let mut out = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            out.push(" ".to_owned());
            continue;
        }
        let mut current = String::new();
        for word in line.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate)? <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if measure(word)? <= max_width {
                current = word.to_owned();
                continue;
            }
            for ch in word.chars() {
                let mut next = current.clone();
                next.push(ch);
                if !current.is_empty() && measure(&next)? > max_width {
                    out.push(std::mem::take(&mut current));
                    current.push(ch);
                } else {
                    current = next;
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    Ok(out)
}

/// Wrap width of a card's text block, in preview units.
pub fn wrap_width(project: &Project, card: &ScriptCard) -> f64 {
    card.style
        .width
        .or(card.layout.text.width)
        .unwrap_or(project.render_metadata.source_width - DEFAULT_TEXT_INSET)
        .max(1.0)
}

/// Rasterize a card's text block showing `lines`.
///
/// Returns `None` when there is nothing to draw. The pixmap is sized to the block, so its
/// top-left lands on the placement position.
pub fn render_text_block(
    fonts: &FontSet,
    project: &Project,
    card: &ScriptCard,
    lines: &[String],
) -> ReelResult<Option<tiny_skia::Pixmap>> {
    if lines.is_empty() {
        return Ok(None);
    }
    let scale = project.scale();
    let style = &card.style;
    let font = FontSpec {
        family: &style.font_family,
        size: style.font_size * scale,
        weight: style.font_weight,
        letter_spacing: style.letter_spacing * scale,
    };
    let line_h = font.size * style.line_height;
    let inner_w = wrap_width(project, card) * scale;
    let wrapped = wrap_lines(lines, inner_w, |s| fonts.measure_line(s, &font))?;

    let background = style
        .background_color
        .as_deref()
        .map(parse_css_color)
        .transpose()
        .map_err(ReelError::validation)?
        .filter(|c| c.a > 0);
    let pad = if background.is_some() {
        TEXT_BOX_PADDING * scale
    } else {
        0.0
    };
    let color = parse_css_color(&style.color).map_err(ReelError::validation)?;

    let width = (inner_w + 2.0 * pad).ceil().max(1.0);
    let height = (wrapped.len() as f64 * line_h + 2.0 * pad).ceil().max(1.0);

    let (anchor, x) = match style.text_align {
        TextAlign::Left => ("start", pad),
        TextAlign::Center => ("middle", width / 2.0),
        TextAlign::Right => ("end", width - pad),
    };

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    if let Some(bg) = background {
        svg.push_str(&format!(
            r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{}" fill-opacity="{:.4}"/>"#,
            bg.svg_hex(),
            bg.opacity()
        ));
    }
    svg.push_str(&format!(
        r#"<text {} fill="{}" fill-opacity="{:.4}" text-anchor="{anchor}" xml:space="preserve">"#,
        font.svg_attrs(),
        color.svg_hex(),
        color.opacity()
    ));
    for (i, line) in wrapped.iter().enumerate() {
        // Approximate CSS half-leading: center the em box in the line box.
        let baseline = pad + i as f64 * line_h + line_h / 2.0 + font.size * 0.35;
        svg.push_str(&format!(
            r#"<tspan x="{x:.3}" y="{baseline:.3}">{}</tspan>"#,
            xml_escape(line)
        ));
    }
    svg.push_str("</text></svg>");

    let tree = fonts.parse(&svg)?;
    rasterize(&tree).map(Some)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
