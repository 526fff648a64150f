use crate::error::{ServiceError, ServiceResult};
use crate::tts::{TtsAudio, TtsProvider, TtsRequest, error_body};

pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_ENDPOINT: &str = "https://api.elevenlabs.io";

/// ElevenLabs text-to-speech returning MP3 bytes.
pub struct ElevenLabsTts {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    endpoint: String,
}

impl ElevenLabsTts {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            model_id: DEFAULT_MODEL.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl TtsProvider for ElevenLabsTts {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, req: &TtsRequest) -> ServiceResult<TtsAudio> {
        req.check()?;
        let voice = req.voice.as_deref().unwrap_or(&self.voice_id);
        let url = format!(
            "{}/v1/text-to-speech/{voice}?output_format=mp3_44100_128",
            self.endpoint.trim_end_matches('/')
        );
        let body = serde_json::json!({
            "text": req.text,
            "model_id": self.model_id,
        });

        let resp = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ServiceError::tts(format!(
                "elevenlabs synthesis failed with {}",
                error_body(resp).await
            )));
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(ServiceError::tts("elevenlabs returned empty audio"));
        }
        Ok(TtsAudio::Inline {
            mime: "audio/mpeg".to_owned(),
            bytes: bytes.to_vec(),
        })
    }
}
