use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};
use crate::tts::{TtsAudio, TtsProvider, TtsRequest, error_body};

const DEFAULT_ENDPOINT: &str = "https://typecast.ai";
const DEFAULT_TEMPO: f32 = 1.5;

/// Typecast speech synthesis: submit, then poll until the clip is ready.
pub struct TypecastTts {
    client: reqwest::Client,
    api_key: String,
    actor_id: String,
    endpoint: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl TypecastTts {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            actor_id: actor_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            poll_interval: Duration::from_secs(1),
            max_polls: 20,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    fn body(&self, req: &TtsRequest) -> serde_json::Value {
        serde_json::json!({
            "text": req.text,
            "actor_id": req.voice.as_deref().unwrap_or(&self.actor_id),
            "lang": "auto",
            "tempo": req.speed.unwrap_or(DEFAULT_TEMPO),
            "volume": 100,
            "pitch": 0,
            "xapi_hd": true,
            "max_seconds": 60,
            "model_version": "latest",
            "xapi_audio_format": "wav",
        })
    }

    async fn poll(&self, url: &str) -> ServiceResult<String> {
        for attempt in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;
            let resp = self
                .client
                .get(url)
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(ServiceError::tts(format!(
                    "typecast polling failed with {}",
                    error_body(resp).await
                )));
            }
            let PollEnvelope { result } = resp.json().await?;
            match result.status.as_str() {
                "done" => {
                    return result.audio_download_url.ok_or_else(|| {
                        ServiceError::tts("typecast finished without audio_download_url")
                    });
                }
                "progress" => tracing::debug!(attempt, "typecast synthesis in progress"),
                other => {
                    return Err(ServiceError::tts(format!(
                        "typecast synthesis failed with status '{other}'"
                    )));
                }
            }
        }
        Err(ServiceError::tts(format!(
            "typecast synthesis not done after {} polls",
            self.max_polls
        )))
    }
}

#[derive(serde::Deserialize)]
struct SpeakEnvelope {
    result: Option<SpeakResult>,
}

#[derive(serde::Deserialize)]
struct SpeakResult {
    speak_v2_url: Option<String>,
}

#[derive(serde::Deserialize)]
struct PollEnvelope {
    result: PollResult,
}

#[derive(serde::Deserialize)]
struct PollResult {
    status: String,
    audio_download_url: Option<String>,
}

#[async_trait::async_trait]
impl TtsProvider for TypecastTts {
    fn name(&self) -> &'static str {
        "typecast"
    }

    async fn synthesize(&self, req: &TtsRequest) -> ServiceResult<TtsAudio> {
        req.check()?;
        let url = format!("{}/api/speak", self.endpoint.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&self.body(req))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ServiceError::tts(format!(
                "typecast speak request failed with {}",
                error_body(resp).await
            )));
        }

        let envelope: SpeakEnvelope = resp.json().await?;
        let poll_url = envelope
            .result
            .and_then(|r| r.speak_v2_url)
            .ok_or_else(|| ServiceError::tts("typecast response has no speak_v2_url"))?;

        let audio_url = self.poll(&poll_url).await?;
        Ok(TtsAudio::Url(audio_url))
    }
}
