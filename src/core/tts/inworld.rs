//! Inworld AI batch synthesis. Audio comes back base64-encoded in a JSON
//! envelope rather than as raw bytes.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::base::{AudioData, SynthesisError, Synthesizer};
use super::decode_base64_audio;
use crate::core::emotion::{ProviderId, RenderedRequest};

pub const INWORLD_TTS_URL: &str = "https://api.inworld.ai/tts/v1/voice";
const DEFAULT_VOICE_ID: &str = "Alex";
const AUDIO_ENCODING: &str = "MP3";
const SAMPLE_RATE_HERTZ: &str = "44100";

#[derive(Debug, Deserialize)]
struct InworldResponse {
    #[serde(rename = "audioContent")]
    audio_content: Option<String>,
}

pub struct InworldSynthesizer {
    api_key: String,
    voice_id: String,
    client: reqwest::Client,
}

impl InworldSynthesizer {
    pub fn new(api_key: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            client,
        }
    }

    fn build_request(&self, request: &RenderedRequest) -> reqwest::RequestBuilder {
        let body = json!({
            "text": request.text,
            "voiceId": self.voice_id,
            "modelId": request.model,
            "audioConfig": {
                "audioEncoding": AUDIO_ENCODING,
                "sampleRateHertz": SAMPLE_RATE_HERTZ,
            },
        });

        // Inworld uses HTTP Basic with the key as the credential.
        self.client
            .post(INWORLD_TTS_URL)
            .header("Authorization", format!("Basic {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
    }
}

#[async_trait]
impl Synthesizer for InworldSynthesizer {
    fn provider(&self) -> ProviderId {
        ProviderId::Inworld
    }

    fn voice_id(&self) -> &str {
        &self.voice_id
    }

    async fn synthesize(&self, request: &RenderedRequest) -> Result<AudioData, SynthesisError> {
        debug!(model = %request.model, "Inworld synthesis request");
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

        let envelope: InworldResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("bad JSON envelope: {e}")))?;
        let audio_b64 = envelope
            .audio_content
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                SynthesisError::InvalidResponse("no audio content in response".to_string())
            })?;

        Ok(AudioData::from_bytes(decode_base64_audio(&audio_b64)?))
    }
}
