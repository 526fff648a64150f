use std::path::PathBuf;

use base64::Engine as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Where a project URL points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource<'a> {
    /// Inline `data:` URI.
    Data {
        /// MIME type, `application/octet-stream` when absent.
        mime: &'a str,
        /// Whether the payload is base64.
        base64: bool,
        /// Raw payload after the comma.
        payload: &'a str,
    },
    /// `http://` or `https://` URL.
    Remote(&'a str),
    /// Anything else is read as a local path (`file://` prefix stripped).
    Local(PathBuf),
}

impl<'a> AssetSource<'a> {
    /// Classify a project URL.
    pub fn parse(url: &'a str) -> ReelResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ReelError::asset("asset url must be non-empty"));
        }
        if let Some(rest) = strip_prefix_ci(trimmed, "data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| ReelError::asset("data uri is missing ','"))?;
            let mut parts = meta.split(';');
            let mime = parts.next().filter(|m| !m.is_empty()).unwrap_or("application/octet-stream");
            let base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));
            return Ok(Self::Data {
                mime,
                base64,
                payload,
            });
        }
        if strip_prefix_ci(trimmed, "http://").is_some()
            || strip_prefix_ci(trimmed, "https://").is_some()
        {
            return Ok(Self::Remote(trimmed));
        }
        let path = strip_prefix_ci(trimmed, "file://").unwrap_or(trimmed);
        Ok(Self::Local(PathBuf::from(path)))
    }

    /// Decode an inline payload. Errors for non-data sources.
    pub fn decode_data(&self) -> ReelResult<Vec<u8>> {
        match self {
            Self::Data {
                base64: true,
                payload,
                ..
            } => {
                let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(cleaned.as_bytes())
                    .map_err(|e| ReelError::asset(format!("invalid base64 in data uri: {e}")))
            }
            Self::Data { payload, .. } => {
                Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
            }
            _ => Err(ReelError::asset("not a data uri")),
        }
    }

    /// A file extension suitable for this source, without the dot.
    pub fn extension(&self) -> Option<String> {
        match self {
            Self::Data { mime, .. } => ext_for_mime(mime).map(str::to_owned),
            Self::Remote(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                let last = path.rsplit('/').next()?;
                let (_, ext) = last.rsplit_once('.')?;
                (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                    .then(|| ext.to_ascii_lowercase())
            }
            Self::Local(p) => p
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase),
        }
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Map a MIME type onto a file extension ffmpeg and `image` recognise.
pub fn ext_for_mime(mime: &str) -> Option<&'static str> {
    Some(match mime.trim().to_ascii_lowercase().as_str() {
        "audio/mp3" | "audio/mpeg" | "audio/mpeg3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        "audio/aac" => "aac",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/webm" => "webm",
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
