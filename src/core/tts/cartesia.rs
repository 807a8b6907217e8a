//! Cartesia batch synthesis over the `/tts/bytes` REST endpoint.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::base::{AudioData, SynthesisError, Synthesizer};
use crate::core::emotion::{ProviderId, RenderedRequest};

pub const CARTESIA_TTS_URL: &str = "https://api.cartesia.ai/tts/bytes";
const API_VERSION: &str = "2025-04-16";
// Kyle
const DEFAULT_VOICE_ID: &str = "c961b81c-a935-4c17-bfb3-ba2239de8c2f";
const SAMPLE_RATE: u32 = 44_100;
const BIT_RATE: u32 = 128_000;

pub struct CartesiaSynthesizer {
    api_key: String,
    voice_id: String,
    client: reqwest::Client,
}

impl CartesiaSynthesizer {
    pub fn new(api_key: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            client,
        }
    }

    fn build_request(&self, request: &RenderedRequest) -> reqwest::RequestBuilder {
        let body = json!({
            "model_id": request.model,
            "transcript": request.text,
            "voice": {
                "mode": "id",
                "id": self.voice_id,
            },
            "language": "en",
            "output_format": {
                "container": "mp3",
                "bit_rate": BIT_RATE,
                "sample_rate": SAMPLE_RATE,
            },
        });

        self.client
            .post(CARTESIA_TTS_URL)
            .bearer_auth(&self.api_key)
            .header("Cartesia-Version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
    }
}

#[async_trait]
impl Synthesizer for CartesiaSynthesizer {
    fn provider(&self) -> ProviderId {
        ProviderId::Cartesia
    }

    fn voice_id(&self) -> &str {
        &self.voice_id
    }

    async fn synthesize(&self, request: &RenderedRequest) -> Result<AudioData, SynthesisError> {
        debug!(model = %request.model, "Cartesia synthesis request");
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
