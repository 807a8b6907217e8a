//! Speechify batch synthesis. Emotion markup is embedded in the input text as
//! `<speechify:style>` spans by the renderer; audio comes back base64 encoded
//! under `audio_data`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::base::{AudioData, SynthesisError, Synthesizer};
use super::decode_base64_audio;
use crate::core::emotion::{ProviderId, RenderedRequest};

pub const SPEECHIFY_TTS_URL: &str = "https://api.sws.speechify.com/v1/audio/speech";
const DEFAULT_VOICE_ID: &str = "oliver";

#[derive(Debug, Deserialize)]
struct SpeechifyResponse {
    audio_data: Option<String>,
}

pub struct SpeechifySynthesizer {
    api_key: String,
    voice_id: String,
    client: reqwest::Client,
}

impl SpeechifySynthesizer {
    pub fn new(api_key: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            client,
        }
    }

    fn build_request(&self, request: &RenderedRequest) -> reqwest::RequestBuilder {
        let body = json!({
            "input": request.text,
            "voice_id": self.voice_id,
            "audio_format": "mp3",
            "model": request.model,
        });

        self.client
            .post(SPEECHIFY_TTS_URL)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
    }
}

#[async_trait]
impl Synthesizer for SpeechifySynthesizer {
    fn provider(&self) -> ProviderId {
        ProviderId::Speechify
    }

    fn voice_id(&self) -> &str {
        &self.voice_id
    }

    async fn synthesize(&self, request: &RenderedRequest) -> Result<AudioData, SynthesisError> {
        debug!(model = %request.model, "Speechify synthesis request");
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(SynthesisError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ProviderApiError {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: SpeechifyResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("bad JSON envelope: {e}")))?;
        let audio_b64 = envelope.audio_data.filter(|s| !s.is_empty()).ok_or_else(|| {
            SynthesisError::InvalidResponse("no audio data in response".to_string())
        })?;

        Ok(AudioData::from_bytes(decode_base64_audio(&audio_b64)?))
    }
}
