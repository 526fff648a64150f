//! Header bar and project info block drawn on top of every frame.

use resvg::tiny_skia;

use crate::foundation::color::parse_css_color;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::{HeaderIcon, MediaFit, Project};
use crate::render::media::fit_into_box;
use crate::render::svg::{FontSpec, FontSet, rasterize, xml_escape};

// Preview-unit metrics.
pub const HEADER_HEIGHT: f64 = 65.0;
pub const HEADER_PADDING_X: f64 = 15.0;
pub const ICON_SIZE: f64 = 24.0;
pub const INFO_PADDING: f64 = 16.0;
pub const TITLE_MARGIN_BOTTOM: f64 = 5.0;
pub const META_FONT_SIZE: f64 = 13.0;
pub const INFO_MARGIN_BOTTOM: f64 = 16.0;
pub const DIVIDER: f64 = 1.0;
const CHROME_LINE_HEIGHT: f64 = 1.3;
const DIVIDER_COLOR: &str = "#e5e5e5";

/// Vertical layout of the chrome, in preview units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChromeLayout {
    /// Height of the info block including its padding and divider.
    pub info_height: f64,
    /// Where the content area (media and text placements) starts.
    pub content_top: f64,
}

impl ChromeLayout {
    /// Compute the layout for `project`.
    pub fn new(project: &Project) -> Self {
        let title = project.project_settings.project.title_font_size * CHROME_LINE_HEIGHT;
        let meta = META_FONT_SIZE * CHROME_LINE_HEIGHT;
        let info_height = INFO_PADDING + title + TITLE_MARGIN_BOTTOM + meta + INFO_PADDING + DIVIDER;
        Self {
            info_height,
            content_top: HEADER_HEIGHT + info_height + INFO_MARGIN_BOTTOM,
        }
    }

    /// Total chrome height, in preview units.
    pub fn height(&self) -> f64 {
        HEADER_HEIGHT + self.info_height
    }
}

/// Format a count with `,` thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// The `"{author} | 조회수 {views}"` line under the title.
pub fn meta_line(project: &Project) -> String {
    let info = &project.project_settings.project;
    format!(
        "{} | 조회수 {}",
        info.author.as_deref().unwrap_or(""),
        group_thousands(info.views)
    )
}

fn icon_markup(icon: HeaderIcon) -> &'static str {
    match icon {
        HeaderIcon::Back => r#"<polyline points="15 18 9 12 15 6"/>"#,
        HeaderIcon::Menu => {
            r#"<line x1="3" y1="12" x2="21" y2="12"/><line x1="3" y1="6" x2="21" y2="6"/><line x1="3" y1="18" x2="21" y2="18"/>"#
        }
        HeaderIcon::None => "",
    }
}

fn color_attr(value: &str) -> ReelResult<String> {
    let c = parse_css_color(value).map_err(ReelError::validation)?;
    Ok(format!(
        r#""{}" fill-opacity="{:.4}""#,
        c.svg_hex(),
        c.opacity()
    ))
}

/// Rasterize the chrome at output resolution, with the logo composited in when present.
pub fn render_chrome(
    fonts: &FontSet,
    project: &Project,
    logo: Option<&tiny_skia::Pixmap>,
) -> ReelResult<tiny_skia::Pixmap> {
    let s = project.scale();
    let layout = ChromeLayout::new(project);
    let settings = &project.project_settings;
    let header = &settings.header;
    let info = &settings.project;

    let width = f64::from(project.output.width);
    let height = (layout.height() * s).ceil().max(1.0);
    let header_h = HEADER_HEIGHT * s;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    svg.push_str(&format!(
        r#"<rect x="0" y="{header_h:.3}" width="{width}" height="{:.3}" fill={}/>"#,
        height - header_h,
        color_attr(&settings.background_color)?
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{width}" height="{header_h:.3}" fill={}/>"#,
        color_attr(&header.background_color)?
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="{:.3}" width="{width}" height="{:.3}" fill="{DIVIDER_COLOR}"/>"#,
        height - DIVIDER * s,
        DIVIDER * s
    ));

    let header_color = parse_css_color(&header.color).map_err(ReelError::validation)?;
    let icon = icon_markup(header.icon);
    if !icon.is_empty() {
        svg.push_str(&format!(
            r#"<g transform="translate({:.3} {:.3}) scale({s:.5})" fill="none" stroke="{}" stroke-opacity="{:.4}" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">{icon}</g>"#,
            HEADER_PADDING_X * s,
            (HEADER_HEIGHT - ICON_SIZE) / 2.0 * s,
            header_color.svg_hex(),
            header_color.opacity()
        ));
    }

    if !header.text.trim().is_empty() {
        let font = FontSpec {
            family: &header.font_family,
            size: header.font_size * s,
            weight: 600,
            letter_spacing: 0.0,
        };
        svg.push_str(&format!(
            r#"<text x="{:.3}" y="{:.3}" {} fill={} text-anchor="middle">{}</text>"#,
            width / 2.0,
            header_h / 2.0 + font.size * 0.35,
            font.svg_attrs(),
            color_attr(&header.color)?,
            xml_escape(&header.text)
        ));
    }

    let title_font = FontSpec {
        family: &info.title_font_family,
        size: info.title_font_size * s,
        weight: 700,
        letter_spacing: 0.0,
    };
    let title_top = HEADER_HEIGHT + INFO_PADDING;
    let title_line = info.title_font_size * CHROME_LINE_HEIGHT;
    if !info.title.trim().is_empty() {
        svg.push_str(&format!(
            r#"<text x="{:.3}" y="{:.3}" {} fill={}>{}</text>"#,
            INFO_PADDING * s,
            (title_top + title_line / 2.0) * s + title_font.size * 0.35,
            title_font.svg_attrs(),
            color_attr(&info.title_color)?,
            xml_escape(&info.title)
        ));
    }

    let meta_font = FontSpec {
        family: &info.title_font_family,
        size: META_FONT_SIZE * s,
        weight: 400,
        letter_spacing: 0.0,
    };
    let meta_top = title_top + title_line + TITLE_MARGIN_BOTTOM;
    svg.push_str(&format!(
        r#"<text x="{:.3}" y="{:.3}" {} fill={}>{}</text>"#,
        INFO_PADDING * s,
        (meta_top + META_FONT_SIZE * CHROME_LINE_HEIGHT / 2.0) * s + meta_font.size * 0.35,
        meta_font.svg_attrs(),
        color_attr(&info.meta_color)?,
        xml_escape(&meta_line(project))
    ));
    svg.push_str("</svg>");

    let mut pixmap = rasterize(&fonts.parse(&svg)?)?;

    if let Some(logo) = logo {
        let size = (header.logo.size * s).round().max(1.0) as u32;
        let boxed = fit_into_box(logo, MediaFit::Contain, size, size)?;
        let x = width - HEADER_PADDING_X * s - f64::from(size);
        let y = (header_h - f64::from(size)) / 2.0;
        pixmap.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            boxed.as_ref(),
            &tiny_skia::PixmapPaint::default(),
            tiny_skia::Transform::identity(),
            None,
        );
    }

    Ok(pixmap)
}

#[cfg(test)]
#[path = "../../tests/unit/render/chrome.rs"]
mod tests;
