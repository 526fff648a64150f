use std::collections::HashSet;

use crate::animation::motion::InOut;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::de;

/// The only project schema version this engine accepts.
pub const PROJECT_VERSION: u32 = 1;

fn default_version() -> u32 {
    PROJECT_VERSION
}
fn default_one() -> f64 {
    1.0
}
fn default_bgm_volume() -> f64 {
    0.3
}
fn default_header_font_size() -> f64 {
    18.0
}
fn default_logo_size() -> f64 {
    28.0
}
fn default_title_font_size() -> f64 {
    20.0
}
fn default_font_size() -> f64 {
    24.0
}
fn default_line_height() -> f64 {
    1.4
}
fn default_text_color() -> String {
    "#111111".to_owned()
}
fn default_meta_color() -> String {
    "#888888".to_owned()
}
fn default_background() -> String {
    "#ffffff".to_owned()
}
fn default_font_family() -> String {
    "sans-serif".to_owned()
}
fn default_font_weight() -> u16 {
    400
}
fn default_source_width() -> f64 {
    360.0
}
fn default_show_on_segment() -> u32 {
    1
}

/// A complete video project as posted by the editor.
///
/// Wire names are camelCase; unknown fields are ignored.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Schema version, see [`PROJECT_VERSION`].
    #[serde(default = "default_version")]
    pub version: u32,
    /// Scenes in playback order.
    #[serde(default)]
    pub script_cards: Vec<ScriptCard>,
    /// Background music for the whole video.
    #[serde(rename = "globalBGM", default, skip_serializing_if = "Option::is_none")]
    pub global_bgm: Option<Bgm>,
    /// Chrome and page styling.
    #[serde(default)]
    pub project_settings: ProjectSettings,
    /// Editor preview metrics.
    #[serde(default)]
    pub render_metadata: RenderMetadata,
    /// Output raster settings.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Background music track.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bgm {
    /// Source URL; blank means no music.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,
    /// Linear gain.
    #[serde(default = "default_bgm_volume")]
    pub volume: f64,
}

/// Styling shared by every frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Header bar.
    #[serde(default)]
    pub header: Header,
    /// Project info block below the header.
    #[serde(default)]
    pub project: ProjectInfo,
    /// Page background color.
    #[serde(default = "default_background")]
    pub background_color: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            header: Header::default(),
            project: ProjectInfo::default(),
            background_color: default_background(),
        }
    }
}

/// Icon drawn at the left of the header bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderIcon {
    /// Chevron pointing left.
    Back,
    /// Hamburger menu.
    Menu,
    /// No icon.
    #[default]
    #[serde(other)]
    None,
}

/// Header bar settings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_header_font_size", deserialize_with = "de::length")]
    pub font_size: f64,
    #[serde(default)]
    pub icon: HeaderIcon,
    #[serde(default)]
    pub logo: Logo,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: default_text_color(),
            background_color: default_background(),
            font_family: default_font_family(),
            font_size: default_header_font_size(),
            icon: HeaderIcon::None,
            logo: Logo::default(),
        }
    }
}

/// Square logo drawn at the right of the header bar.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,
    #[serde(default = "default_logo_size", deserialize_with = "de::length")]
    pub size: f64,
}

impl Default for Logo {
    fn default() -> Self {
        Self {
            url: None,
            size: default_logo_size(),
        }
    }
}

/// Title and meta line drawn under the header.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_text_color")]
    pub title_color: String,
    #[serde(default = "default_font_family")]
    pub title_font_family: String,
    #[serde(default = "default_title_font_size", deserialize_with = "de::length")]
    pub title_font_size: f64,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de::views")]
    pub views: u64,
    #[serde(default = "default_meta_color")]
    pub meta_color: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            title_color: default_text_color(),
            title_font_family: default_font_family(),
            title_font_size: default_title_font_size(),
            author: None,
            views: 0,
            meta_color: default_meta_color(),
        }
    }
}

/// Editor preview metrics used to derive the output scale.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMetadata {
    /// Width of the editor preview in CSS pixels.
    #[serde(default = "default_source_width", deserialize_with = "de::number")]
    pub source_width: f64,
}

impl Default for RenderMetadata {
    fn default() -> Self {
        Self {
            source_width: default_source_width(),
        }
    }
}

/// Output raster settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Width in pixels (even).
    pub width: u32,
    /// Height in pixels (even).
    pub height: u32,
    /// Integer frame rate.
    pub fps: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
        }
    }
}

/// One scene: text, media, layout, animation and audio cues.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptCard {
    #[serde(default, deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Seconds on screen.
    #[serde(deserialize_with = "de::number")]
    pub duration: f64,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub layout: CardLayout,
    #[serde(default)]
    pub animations: CardAnimations,
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Non-empty switches the text block into segment reveal mode.
    #[serde(default)]
    pub animation_sequence: Vec<String>,
    #[serde(default)]
    pub media: Media,
    /// Narration clip, usually a `data:audio/...;base64,` URI.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub audio_url: Option<String>,
    #[serde(default = "default_one")]
    pub tts_volume: f64,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub sfx_url: Option<String>,
    #[serde(default = "default_one")]
    pub sfx_volume: f64,
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Text block styling in preview units.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default = "default_font_size", deserialize_with = "de::length")]
    pub font_size: f64,
    /// Multiple of `font_size`.
    #[serde(default = "default_line_height", deserialize_with = "de::number")]
    pub line_height: f64,
    #[serde(default, deserialize_with = "de::length")]
    pub letter_spacing: f64,
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_weight", deserialize_with = "de::font_weight")]
    pub font_weight: u16,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub background_color: Option<String>,
    /// Wrap width; overrides `layout.text.width` when set.
    #[serde(default, deserialize_with = "de::opt_length")]
    pub width: Option<f64>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            line_height: default_line_height(),
            letter_spacing: 0.0,
            color: default_text_color(),
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            text_align: TextAlign::Center,
            background_color: None,
            width: None,
        }
    }
}

/// Static position of a block in preview units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default, deserialize_with = "de::number")]
    pub x: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub y: f64,
    /// Uniform scale; `0` is read as `1`.
    #[serde(default = "default_one", deserialize_with = "de::number")]
    pub scale: f64,
    /// Clockwise rotation in degrees.
    #[serde(default, deserialize_with = "de::number")]
    pub angle: f64,
    #[serde(default, deserialize_with = "de::opt_length")]
    pub width: Option<f64>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            angle: 0.0,
            width: None,
        }
    }
}

impl Placement {
    /// Scale with the editor's `scale || 1` reading applied.
    pub fn effective_scale(&self) -> f64 {
        if self.scale == 0.0 || !self.scale.is_finite() {
            1.0
        } else {
            self.scale
        }
    }
}

/// Per-card placements.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CardLayout {
    #[serde(default)]
    pub text: Placement,
    #[serde(default)]
    pub media: Placement,
}

/// Per-card animations.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CardAnimations {
    #[serde(default)]
    pub text: InOut,
    #[serde(default)]
    pub media: InOut,
}

/// A timed piece of card text.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default)]
    pub text: String,
    /// Seconds from the start of the card.
    #[serde(default, deserialize_with = "de::number")]
    pub start_time: f64,
}

/// Media kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// How media fills its placement box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaFit {
    /// Letterbox inside the box, keeping aspect.
    #[default]
    #[serde(alias = "scale-down")]
    Contain,
    /// Fill the box, keeping aspect, cropping overflow.
    Cover,
    /// Stretch to the box.
    Fill,
}

/// Card media.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub fit: MediaFit,
    /// 1-based segment whose start time reveals the media.
    #[serde(default = "default_show_on_segment")]
    pub show_on_segment: u32,
    /// Keep this media on screen through the card with this id.
    #[serde(default, deserialize_with = "de::opt_id")]
    pub persist_until_card_id: Option<String>,
    /// Offset into a video source, in seconds.
    #[serde(default, deserialize_with = "de::number")]
    pub start_time: f64,
    #[serde(default, deserialize_with = "de::opt_length")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_length")]
    pub height: Option<f64>,
}

impl Default for Media {
    fn default() -> Self {
        Self {
            url: None,
            kind: MediaKind::Image,
            fit: MediaFit::Contain,
            show_on_segment: default_show_on_segment(),
            persist_until_card_id: None,
            start_time: 0.0,
            width: None,
            height: None,
        }
    }
}

impl Project {
    /// Parse a project from JSON text.
    pub fn from_json(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("invalid project json: {e}")))
    }

    /// Parse a project from a JSON reader.
    pub fn from_reader(r: impl std::io::Read) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("invalid project json: {e}")))
    }

    /// Parse from an already-decoded JSON value.
    pub fn from_value(v: serde_json::Value) -> ReelResult<Self> {
        serde_json::from_value(v).map_err(|e| ReelError::serde(format!("invalid project json: {e}")))
    }

    /// Output pixels per preview unit.
    pub fn scale(&self) -> f64 {
        f64::from(self.output.width) / self.render_metadata.source_width
    }

    /// Output frame rate.
    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::whole(self.output.fps)
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.output.width,
            height: self.output.height,
        }
    }

    /// Sum of card durations in seconds.
    pub fn total_duration_secs(&self) -> f64 {
        self.script_cards.iter().map(|c| c.duration).sum()
    }

    /// Trimmed project title, if any.
    pub fn title(&self) -> Option<&str> {
        let t = self.project_settings.project.title.trim();
        (!t.is_empty()).then_some(t)
    }

    /// Every external URL the project references, deduplicated, in first-use order.
    pub fn asset_urls(&self) -> Vec<&str> {
        let per_card = self.script_cards.iter().flat_map(|c| {
            [
                c.media.url.as_ref(),
                c.audio_url.as_ref(),
                c.sfx_url.as_ref(),
            ]
        });
        let mut seen = HashSet::new();
        [
            self.global_bgm.as_ref().and_then(|b| b.url.as_ref()),
            self.project_settings.header.logo.url.as_ref(),
        ]
        .into_iter()
        .chain(per_card)
        .flatten()
        .map(String::as_str)
        .filter(|u| seen.insert(*u))
        .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/project.rs"]
mod tests;
