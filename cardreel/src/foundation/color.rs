use crate::foundation::math::mul_div255_u8;

/// Straight-alpha RGBA8 color parsed from a CSS-like color string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Build an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Return `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Return the color with alpha multiplied into the color channels.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        [
            mul_div255_u8(u16::from(self.r), a),
            mul_div255_u8(u16::from(self.g), a),
            mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }

    /// `#rrggbb` form used inside generated SVG markup.
    pub fn svg_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a `0..=1` opacity value.
    pub fn opacity(self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

/// Parse a CSS-like color string.
///
/// Accepted forms: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`,
/// `transparent`, and a handful of named colors.
pub fn parse_css_color(input: &str) -> Result<Rgba8, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("color must be non-empty".to_owned());
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(body) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
    {
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| format!("unterminated color function \"{s}\""))?;
        return parse_rgb_fn(body);
    }

    named(&lower).ok_or_else(|| format!("unknown color \"{s}\""))
}

fn parse_hex(hex: &str) -> Result<Rgba8, String> {
    fn nibble(c: u8) -> Result<u8, String> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
    }
    fn byte(pair: &[u8]) -> Result<u8, String> {
        Ok(nibble(pair[0])? * 16 + nibble(pair[1])?)
    }

    let b = hex.as_bytes();
    match b.len() {
        3 => {
            let r = nibble(b[0])?;
            let g = nibble(b[1])?;
            let bl = nibble(b[2])?;
            Ok(Rgba8::rgb(r * 17, g * 17, bl * 17))
        }
        6 => Ok(Rgba8::rgb(byte(&b[0..2])?, byte(&b[2..4])?, byte(&b[4..6])?)),
        8 => Ok(Rgba8 {
            r: byte(&b[0..2])?,
            g: byte(&b[2..4])?,
            b: byte(&b[4..6])?,
            a: byte(&b[6..8])?,
        }),
        _ => Err("hex color must be #rgb, #rrggbb or #rrggbbaa".to_owned()),
    }
}

fn parse_rgb_fn(body: &str) -> Result<Rgba8, String> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err("rgb()/rgba() expects 3 or 4 components".to_owned());
    }

    let channel = |p: &str| -> Result<u8, String> {
        let v: f64 = p
            .parse()
            .map_err(|_| format!("invalid color component \"{p}\""))?;
        if !v.is_finite() {
            return Err(format!("invalid color component \"{p}\""));
        }
        Ok(v.clamp(0.0, 255.0).round() as u8)
    };

    let a = match parts.get(3) {
        Some(p) => {
            let v: f64 = if let Some(pct) = p.strip_suffix('%') {
                pct.trim()
                    .parse::<f64>()
                    .map(|x| x / 100.0)
                    .map_err(|_| format!("invalid alpha \"{p}\""))?
            } else {
                p.parse().map_err(|_| format!("invalid alpha \"{p}\""))?
            };
            if !v.is_finite() {
                return Err(format!("invalid alpha \"{p}\""));
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Ok(Rgba8 {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}

fn named(name: &str) -> Option<Rgba8> {
    Some(match name {
        "transparent" => Rgba8::TRANSPARENT,
        "black" => Rgba8::BLACK,
        "white" => Rgba8::WHITE,
        "red" => Rgba8::rgb(255, 0, 0),
        "green" => Rgba8::rgb(0, 128, 0),
        "blue" => Rgba8::rgb(0, 0, 255),
        "yellow" => Rgba8::rgb(255, 255, 0),
        "orange" => Rgba8::rgb(255, 165, 0),
        "purple" => Rgba8::rgb(128, 0, 128),
        "pink" => Rgba8::rgb(255, 192, 203),
        "gray" | "grey" => Rgba8::rgb(128, 128, 128),
        "lightgray" | "lightgrey" => Rgba8::rgb(211, 211, 211),
        "darkgray" | "darkgrey" => Rgba8::rgb(169, 169, 169),
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
