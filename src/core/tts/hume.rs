//! Hume Octave batch synthesis.
//!
//! Emotions ride in the utterance `description` field rather than in the
//! text; the renderer decides whether that field is present (Octave 2 ignores
//! descriptions, so it is omitted there entirely). Audio comes back base64
//! encoded under `generations[0].audio`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::base::{AudioData, SynthesisError, Synthesizer};
use super::decode_base64_audio;
use crate::core::emotion::{ProviderId, RenderedRequest};

pub const HUME_TTS_URL: &str = "https://api.hume.ai/v0/tts";
// Booming American Narrator
const DEFAULT_VOICE_ID: &str = "445d65ed-a87f-4140-9820-daf6d4f0a200";

#[derive(Debug, Deserialize)]
struct HumeResponse {
    #[serde(default)]
    generations: Vec<HumeGeneration>,
}

#[derive(Debug, Deserialize)]
struct HumeGeneration {
    audio: Option<String>,
}

pub struct HumeSynthesizer {
    api_key: String,
    voice_id: String,
    client: reqwest::Client,
}

impl HumeSynthesizer {
    pub fn new(api_key: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            client,
        }
    }

    fn build_request(&self, request: &RenderedRequest) -> reqwest::RequestBuilder {
        let mut utterance = json!({
            "text": request.text,
            "voice": { "id": self.voice_id },
        });
        if let Some(description) = &request.description {
            utterance["description"] = json!(description);
        }

        let body = json!({
            "utterances": [utterance],
            "format": { "type": "mp3" },
            "version": request.model,
        });

        self.client
            .post(HUME_TTS_URL)
            .header("X-Hume-Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
    }
}

#[async_trait]
impl Synthesizer for HumeSynthesizer {
    fn provider(&self) -> ProviderId {
        ProviderId::Hume
    }

    fn voice_id(&self) -> &str {
        &self.voice_id
    }

    async fn synthesize(&self, request: &RenderedRequest) -> Result<AudioData, SynthesisError> {
        debug!(version = %request.model, "Hume synthesis request");
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

        let envelope: HumeResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("bad JSON envelope: {e}")))?;
        let first = envelope.generations.into_iter().next().ok_or_else(|| {
            SynthesisError::InvalidResponse("no generations in response".to_string())
        })?;
        let audio_b64 = first.audio.filter(|s| !s.is_empty()).ok_or_else(|| {
            SynthesisError::InvalidResponse("no audio data in generation".to_string())
        })?;

        Ok(AudioData::from_bytes(decode_base64_audio(&audio_b64)?))
    }
}
