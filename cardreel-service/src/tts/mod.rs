//! Text-to-speech vendors behind one trait.

use std::sync::Arc;

use base64::Engine as _;

use crate::config::{TtsSettings, TtsVendor};
use crate::error::{ServiceError, ServiceResult};

pub mod elevenlabs;
pub mod google;
pub mod typecast;

pub use elevenlabs::ElevenLabsTts;
pub use google::GoogleTts;
pub use typecast::TypecastTts;

/// One synthesis request as posted to `/api/create-tts`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TtsRequest {
    pub text: String,
    /// Vendor voice id; each vendor has its own default.
    pub voice: Option<String>,
    /// Speaking rate multiplier.
    pub speed: Option<f32>,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Reject blank text before any vendor is contacted.
    pub fn check(&self) -> ServiceResult<()> {
        if self.text.trim().is_empty() {
            return Err(ServiceError::bad_request("text to synthesize is empty"));
        }
        if let Some(speed) = self.speed
            && !(speed.is_finite() && speed > 0.0)
        {
            return Err(ServiceError::bad_request(format!(
                "speed must be a positive number, got {speed}"
            )));
        }
        Ok(())
    }
}

/// Synthesized speech: either hosted by the vendor or returned inline.
#[derive(Clone, Debug, PartialEq)]
pub enum TtsAudio {
    Url(String),
    Inline { mime: String, bytes: Vec<u8> },
}

impl TtsAudio {
    /// A URL usable as a card's `audioUrl`; inline audio becomes a base64 data URI.
    pub fn into_audio_url(self) -> String {
        match self {
            Self::Url(url) => url,
            Self::Inline { mime, bytes } => format!(
                "data:{mime};base64,{}",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            ),
        }
    }
}

#[async_trait::async_trait]
pub trait TtsProvider: Send + Sync {
    /// Vendor name for logs.
    fn name(&self) -> &'static str;

    async fn synthesize(&self, req: &TtsRequest) -> ServiceResult<TtsAudio>;
}

/// Build the configured vendor. `Ok(None)` when no provider is selected.
pub fn provider_from_settings(
    settings: &TtsSettings,
    client: reqwest::Client,
) -> ServiceResult<Option<Arc<dyn TtsProvider>>> {
    let Some(vendor) = settings.provider else {
        return Ok(None);
    };
    let provider: Arc<dyn TtsProvider> = match vendor {
        TtsVendor::Google => Arc::new(GoogleTts::new(
            client,
            required(&settings.google_api_key, "GOOGLE_TTS_API_KEY")?,
        )),
        TtsVendor::ElevenLabs => {
            let mut tts = ElevenLabsTts::new(
                client,
                required(&settings.elevenlabs_api_key, "ELEVENLABS_API_KEY")?,
                required(&settings.elevenlabs_voice_id, "ELEVENLABS_VOICE_ID")?,
            );
            if let Some(model) = settings.elevenlabs_model_id.as_deref() {
                tts = tts.with_model(model);
            }
            Arc::new(tts)
        }
        TtsVendor::Typecast => Arc::new(TypecastTts::new(
            client,
            required(&settings.typecast_api_key, "TYPECAST_API_KEY")?,
            required(&settings.typecast_actor_id, "TYPECAST_ACTOR_ID")?,
        )),
    };
    tracing::info!(provider = provider.name(), "tts provider configured");
    Ok(Some(provider))
}

fn required(value: &Option<String>, env: &str) -> ServiceResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ServiceError::config(format!("{env} is not set")))
}

/// Body of a non-success vendor response, shortened for error messages.
pub(crate) async fn error_body(resp: reqwest::Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        format!("status {status}")
    } else {
        let cut = text.char_indices().nth(200).map_or(text.len(), |(i, _)| i);
        format!("status {status}: {}", &text[..cut])
    }
}
