//! Lenient field decoders for values editors emit in more than one shape.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(f64),
    Str(String),
}

fn parse_css_number(s: &str) -> Option<f64> {
    let t = s.trim();
    let t = t.strip_suffix("px").unwrap_or(t).trim();
    t.parse::<f64>().ok()
}

/// `24`, `24.5`, `"24"` and `"24px"` all decode to a number.
pub(crate) fn length<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrStr::deserialize(d)? {
        NumOrStr::Num(v) => Ok(v),
        NumOrStr::Str(s) => parse_css_number(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid length \"{s}\""))),
    }
}

/// Like [`length`], but `null` and `""` decode to `None`.
pub(crate) fn opt_length<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumOrStr>::deserialize(d)? {
        None => Ok(None),
        Some(NumOrStr::Num(v)) => Ok(Some(v)),
        Some(NumOrStr::Str(s)) if s.trim().is_empty() || s.trim() == "auto" => Ok(None),
        Some(NumOrStr::Str(s)) => parse_css_number(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid length \"{s}\""))),
    }
}

/// `null` and blank strings decode to `None`.
pub(crate) fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.filter(|s| !s.trim().is_empty()))
}

/// Identifiers arrive either as strings or as numbers (`Date.now()` style ids).
pub(crate) fn id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_id(d)?.unwrap_or_default())
}

pub(crate) fn opt_id<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumOrStr>::deserialize(d)? {
        None => None,
        Some(NumOrStr::Num(v)) if v.fract() == 0.0 && v.abs() < 9.0e15 => Some(format!("{}", v as i64)),
        Some(NumOrStr::Num(v)) => Some(v.to_string()),
        Some(NumOrStr::Str(s)) => Some(s).filter(|s| !s.trim().is_empty()),
    })
}

/// `400`, `"400"`, `"normal"` and `"bold"`.
pub(crate) fn font_weight<'de, D>(d: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrStr::deserialize(d)? {
        NumOrStr::Num(v) => Ok(v.clamp(1.0, 1000.0) as u16),
        NumOrStr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(400),
            "bold" => Ok(700),
            "lighter" => Ok(300),
            "bolder" => Ok(800),
            other => other
                .parse::<u16>()
                .map_err(|_| serde::de::Error::custom(format!("invalid font weight \"{s}\""))),
        },
    }
}

/// View counts: numbers, numeric strings, or `null`.
pub(crate) fn views<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumOrStr>::deserialize(d)? {
        None => 0,
        Some(NumOrStr::Num(v)) if v.is_finite() && v > 0.0 => v as u64,
        Some(NumOrStr::Num(_)) => 0,
        Some(NumOrStr::Str(s)) => s.trim().replace(',', "").parse::<f64>().map_or(0, |v| {
            if v.is_finite() && v > 0.0 { v as u64 } else { 0 }
        }),
    })
}

/// Plain numbers that editors sometimes serialize as strings (`"1.4"`).
pub(crate) fn number<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    length(d)
}
