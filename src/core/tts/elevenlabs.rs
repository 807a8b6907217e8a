//! ElevenLabs batch synthesis over the text-to-speech REST endpoint.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::base::{AudioData, SynthesisError, Synthesizer};
use crate::core::emotion::{ProviderId, RenderedRequest};

pub const ELEVENLABS_TTS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";
// Mark
const DEFAULT_VOICE_ID: &str = "1SM7GgM6IMuvQlz2BwM3";
const OUTPUT_FORMAT: &str = "mp3_44100_128";

pub struct ElevenLabsSynthesizer {
    api_key: String,
    voice_id: String,
    client: reqwest::Client,
}

impl ElevenLabsSynthesizer {
    pub fn new(api_key: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            client,
        }
    }

    fn build_request(&self, request: &RenderedRequest) -> reqwest::RequestBuilder {
        let url = format!("{ELEVENLABS_TTS_URL}/{}", self.voice_id);
        let body = json!({
            "text": request.text,
            "model_id": request.model,
        });

        self.client
            .post(url)
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
    }
}

#[async_trait]
impl Synthesizer for ElevenLabsSynthesizer {
    fn provider(&self) -> ProviderId {
        ProviderId::ElevenLabs
    }

    fn voice_id(&self) -> &str {
        &self.voice_id
    }

    async fn synthesize(&self, request: &RenderedRequest) -> Result<AudioData, SynthesisError> {
        debug!(model = %request.model, "ElevenLabs synthesis request");
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

        let bytes = response
            .bytes()
            .await
            .map_err(SynthesisError::from_reqwest)?;
        Ok(AudioData::from_bytes(bytes.to_vec()))
    }
}
