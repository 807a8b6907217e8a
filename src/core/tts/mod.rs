pub mod base;
pub mod cartesia;
pub mod elevenlabs;
pub mod hume;
pub mod inworld;
pub mod speechify;

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

pub use base::{AudioData, SynthesisError, Synthesizer};
pub use cartesia::{CARTESIA_TTS_URL, CartesiaSynthesizer};
pub use elevenlabs::{ELEVENLABS_TTS_URL, ElevenLabsSynthesizer};
pub use hume::{HUME_TTS_URL, HumeSynthesizer};
pub use inworld::{INWORLD_TTS_URL, InworldSynthesizer};
pub use speechify::{SPEECHIFY_TTS_URL, SpeechifySynthesizer};

use crate::core::emotion::ProviderId;

/// Build the shared HTTP client used by every synthesizer in a batch.
///
/// One pooled client is enough: batch calls are independent single-shot
/// requests, so per-provider pools would buy nothing.
pub fn http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<reqwest::Client, SynthesisError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| SynthesisError::InvalidConfiguration(format!("HTTP client: {e}")))
}

/// Factory for provider synthesizers.
///
/// Adding a provider means adding one profile entry and one synthesizer
/// module here; the dispatcher and session are untouched.
pub fn create_synthesizer(
    id: ProviderId,
    api_key: &str,
    client: reqwest::Client,
) -> Result<Arc<dyn Synthesizer>, SynthesisError> {
    if api_key.trim().is_empty() {
        return Err(SynthesisError::InvalidConfiguration(format!(
            "API key is required for {id}"
        )));
    }
    Ok(match id {
        ProviderId::Cartesia => Arc::new(CartesiaSynthesizer::new(api_key, client)),
        ProviderId::Inworld => Arc::new(InworldSynthesizer::new(api_key, client)),
        ProviderId::ElevenLabs => Arc::new(ElevenLabsSynthesizer::new(api_key, client)),
        ProviderId::Hume => Arc::new(HumeSynthesizer::new(api_key, client)),
        ProviderId::Speechify => Arc::new(SpeechifySynthesizer::new(api_key, client)),
    })
}

/// Decode a base64 audio field from a JSON envelope response.
pub(crate) fn decode_base64_audio(b64: &str) -> Result<Vec<u8>, SynthesisError> {
    BASE64
        .decode(b64)
        .map_err(|e| SynthesisError::InvalidResponse(format!("bad base64 audio: {e}")))
}
