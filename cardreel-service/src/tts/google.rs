use base64::Engine as _;

use crate::error::{ServiceError, ServiceResult};
use crate::tts::{TtsAudio, TtsProvider, TtsRequest, error_body};

pub const DEFAULT_VOICE: &str = "ko-KR-Standard-C";
const LANGUAGE_CODE: &str = "ko-KR";
const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com";

/// Google Cloud Text-to-Speech over REST, authenticated with an API key.
pub struct GoogleTts {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleTts {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn body(req: &TtsRequest) -> serde_json::Value {
        serde_json::json!({
            "input": { "ssml": ssml(&req.text, req.speed.unwrap_or(1.0)) },
            "voice": {
                "languageCode": LANGUAGE_CODE,
                "name": req.voice.as_deref().unwrap_or(DEFAULT_VOICE),
            },
            "audioConfig": { "audioEncoding": "MP3" },
        })
    }
}

/// Wrap text in a prosody element carrying the speaking rate.
pub fn ssml(text: &str, rate: f32) -> String {
    format!(
        "<speak><prosody rate=\"{rate}\">{}</prosody></speak>",
        escape_xml(text)
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[async_trait::async_trait]
impl TtsProvider for GoogleTts {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn synthesize(&self, req: &TtsRequest) -> ServiceResult<TtsAudio> {
        req.check()?;
        let url = format!("{}/v1/text:synthesize", self.endpoint.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::body(req))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ServiceError::tts(format!(
                "google synthesize failed with {}",
                error_body(resp).await
            )));
        }

        let parsed: SynthesizeResponse = resp.json().await?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(parsed.audio_content.as_bytes())
            .map_err(|e| ServiceError::tts(format!("google returned invalid audioContent: {e}")))?;
        Ok(TtsAudio::Inline {
            mime: "audio/mp3".to_owned(),
            bytes,
        })
    }
}
