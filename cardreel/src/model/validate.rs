use std::collections::HashMap;
use std::fmt;

use crate::animation::motion::{AnimName, InOut};
use crate::foundation::color::parse_css_color;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::{PROJECT_VERSION, Placement, Project, ScriptCard};

/// Longest accepted card, in seconds.
pub const MAX_CARD_SECS: f64 = 600.0;
/// Upper bound for any track gain.
pub const MAX_VOLUME: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

/// One problem found in a project, addressed by a JSON path such as `$.scriptCards[2].duration`.
#[derive(Debug, Clone)]
pub struct SchemaError {
    pub(crate) path: Vec<SchemaPathElem>,
    /// Human-readable description.
    pub message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    /// The JSON path of the offending value.
    pub fn path(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// Every problem found in a project.
#[derive(Debug, Clone)]
pub struct SchemaErrors {
    /// Problems in document order.
    pub errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl From<SchemaErrors> for ReelError {
    fn from(e: SchemaErrors) -> Self {
        ReelError::Validation(e.to_string())
    }
}

impl Project {
    /// Validate the project, reporting the full problem list as one error.
    pub fn validate(&self) -> ReelResult<()> {
        validate_project(self).map_err(ReelError::from)
    }
}

struct Checker {
    path: Vec<SchemaPathElem>,
    errors: Vec<SchemaError>,
}

impl Checker {
    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(SchemaError::at(&self.path, message));
    }

    fn push_field(&mut self, field: &'static str, message: impl Into<String>) {
        self.path.push(SchemaPathElem::Field(field));
        self.push(message);
        self.path.pop();
    }

    fn scoped(&mut self, elems: &[SchemaPathElem], f: impl FnOnce(&mut Self)) {
        let depth = self.path.len();
        self.path.extend_from_slice(elems);
        f(self);
        self.path.truncate(depth);
    }

    fn color(&mut self, field: &'static str, value: &str) {
        if let Err(e) = parse_css_color(value) {
            self.push_field(field, e);
        }
    }

    fn positive(&mut self, field: &'static str, v: f64) {
        if !v.is_finite() || v <= 0.0 {
            self.push_field(field, "must be a finite number > 0");
        }
    }

    fn non_negative(&mut self, field: &'static str, v: f64) {
        if !v.is_finite() || v < 0.0 {
            self.push_field(field, "must be a finite number >= 0");
        }
    }

    fn volume(&mut self, field: &'static str, v: f64) {
        if !v.is_finite() || !(0.0..=MAX_VOLUME).contains(&v) {
            self.push_field(field, format!("must be within [0, {MAX_VOLUME}]"));
        }
    }

    fn finite(&mut self, field: &'static str, v: f64) {
        if !v.is_finite() {
            self.push_field(field, "must be a finite number");
        }
    }
}

/// Collect every schema problem in `project`.
pub fn validate_project(project: &Project) -> Result<(), SchemaErrors> {
    use SchemaPathElem::{Field, Index};

    let mut c = Checker {
        path: Vec::new(),
        errors: Vec::new(),
    };

    if project.version != PROJECT_VERSION {
        c.push_field("version", format!("version must be {PROJECT_VERSION}"));
    }

    c.scoped(&[Field("output")], |c| {
        let out = project.output;
        if !(1..=120).contains(&out.fps) {
            c.push_field("fps", "must be within 1..=120");
        }
        for (field, v) in [("width", out.width), ("height", out.height)] {
            if !(16..=4096).contains(&v) || v % 2 != 0 {
                c.push_field(field, "must be an even number within 16..=4096");
            }
        }
    });

    c.scoped(&[Field("renderMetadata")], |c| {
        c.positive("sourceWidth", project.render_metadata.source_width);
    });

    if let Some(bgm) = &project.global_bgm {
        c.scoped(&[Field("globalBGM")], |c| c.volume("volume", bgm.volume));
    }

    let settings = &project.project_settings;
    c.scoped(&[Field("projectSettings")], |c| {
        c.color("backgroundColor", &settings.background_color);
        c.scoped(&[Field("header")], |c| {
            let h = &settings.header;
            c.color("color", &h.color);
            c.color("backgroundColor", &h.background_color);
            c.positive("fontSize", h.font_size);
            c.scoped(&[Field("logo")], |c| c.positive("size", h.logo.size));
        });
        c.scoped(&[Field("project")], |c| {
            let p = &settings.project;
            c.color("titleColor", &p.title_color);
            c.color("metaColor", &p.meta_color);
            c.positive("titleFontSize", p.title_font_size);
        });
    });

    if project.script_cards.is_empty() {
        c.push_field("scriptCards", "must contain at least one card");
    }

    // Pass 1: card ids and their positions.
    let mut first_index = HashMap::<&str, usize>::new();
    for (i, card) in project.script_cards.iter().enumerate() {
        if card.id.trim().is_empty() {
            c.scoped(&[Field("scriptCards"), Index(i)], |c| {
                c.push_field("id", "must be non-empty")
            });
            continue;
        }
        if first_index.insert(card.id.as_str(), i).is_some() {
            c.scoped(&[Field("scriptCards"), Index(i)], |c| {
                c.push_field("id", format!("duplicate card id \"{}\"", card.id))
            });
        }
    }

    // Pass 2: per-card invariants and cross-card references.
    for (i, card) in project.script_cards.iter().enumerate() {
        c.scoped(&[Field("scriptCards"), Index(i)], |c| {
            validate_card(c, card, i, &first_index);
        });
    }

    if c.errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors: c.errors })
    }
}

fn validate_card(c: &mut Checker, card: &ScriptCard, index: usize, ids: &HashMap<&str, usize>) {
    use SchemaPathElem::{Field, Index};

    if !card.duration.is_finite() || card.duration <= 0.0 || card.duration > MAX_CARD_SECS {
        c.push_field("duration", format!("must be > 0 and <= {MAX_CARD_SECS}"));
    }
    c.volume("ttsVolume", card.tts_volume);
    c.volume("sfxVolume", card.sfx_volume);

    c.scoped(&[Field("style")], |c| {
        let s = &card.style;
        c.positive("fontSize", s.font_size);
        c.positive("lineHeight", s.line_height);
        c.finite("letterSpacing", s.letter_spacing);
        c.color("color", &s.color);
        if let Some(bg) = &s.background_color {
            c.color("backgroundColor", bg);
        }
        if let Some(w) = s.width {
            c.positive("width", w);
        }
    });

    c.scoped(&[Field("layout")], |c| {
        c.scoped(&[Field("text")], |c| placement(c, &card.layout.text));
        c.scoped(&[Field("media")], |c| placement(c, &card.layout.media));
    });

    c.scoped(&[Field("animations")], |c| {
        c.scoped(&[Field("text")], |c| in_out(c, &card.animations.text));
        c.scoped(&[Field("media")], |c| in_out(c, &card.animations.media));
    });

    for (si, seg) in card.segments.iter().enumerate() {
        c.scoped(&[Field("segments"), Index(si)], |c| {
            c.non_negative("startTime", seg.start_time)
        });
    }

    c.scoped(&[Field("media")], |c| {
        let m = &card.media;
        if m.show_on_segment < 1 {
            c.push_field("showOnSegment", "must be >= 1");
        }
        c.non_negative("startTime", m.start_time);
        if let Some(w) = m.width {
            c.positive("width", w);
        }
        if let Some(h) = m.height {
            c.positive("height", h);
        }
        if let Some(target) = &m.persist_until_card_id {
            match ids.get(target.as_str()) {
                None => c.push_field(
                    "persistUntilCardId",
                    format!("references unknown card id \"{target}\""),
                ),
                Some(&t) if t < index => c.push_field(
                    "persistUntilCardId",
                    format!("card \"{target}\" comes before the declaring card"),
                ),
                Some(_) => {}
            }
        }
    });
}

fn placement(c: &mut Checker, p: &Placement) {
    c.finite("x", p.x);
    c.finite("y", p.y);
    c.finite("angle", p.angle);
    if !p.scale.is_finite() || p.scale < 0.0 {
        c.push_field("scale", "must be a finite number >= 0");
    }
    if let Some(w) = p.width {
        c.positive("width", w);
    }
}

fn in_out(c: &mut Checker, io: &InOut) {
    use SchemaPathElem::Field;

    c.scoped(&[Field("in")], |c| {
        if io.enter.name == AnimName::Unknown || !io.enter.name.is_entrance() {
            c.push_field("name", "unknown entrance animation");
        }
        c.non_negative("duration", io.enter.duration);
    });
    c.scoped(&[Field("out")], |c| {
        if io.exit.name == AnimName::Unknown || !io.exit.name.is_exit() {
            c.push_field("name", "unknown exit animation");
        }
        c.non_negative("duration", io.exit.duration);
    });
}

#[cfg(test)]
#[path = "../../tests/unit/model/validate.rs"]
mod tests;
