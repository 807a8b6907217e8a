//! Shared synthesizer abstraction for HTTP TTS providers.

use async_trait::async_trait;

use crate::core::emotion::{ProviderId, RenderedRequest};
use crate::utils::audio::AudioFormat;

/// Audio returned by one provider for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    /// Complete audio bytes (batch synthesis, never partial).
    pub data: Vec<u8>,
    /// Container format sniffed from the byte header.
    pub format: AudioFormat,
}

impl AudioData {
    /// Wrap raw provider bytes, sniffing the container format.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let format = AudioFormat::sniff(&data).unwrap_or(AudioFormat::Mp3);
        Self { data, format }
    }
}

/// Per-provider synthesis failures. Always scoped to one provider; none of
/// these abort the rest of a comparison batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SynthesisError {
    #[error("missing API key for {0}")]
    MissingCredential(ProviderId),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("provider API error ({status}): {body}")]
    ProviderApiError { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("superseded by a newer submission")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SynthesisError {
    /// Short stable label for result slots and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SynthesisError::MissingCredential(_) => "missing_credential",
            SynthesisError::Timeout(_) => "timeout",
            SynthesisError::NetworkError(_) => "network_error",
            SynthesisError::ProviderApiError { .. } => "provider_api_error",
            SynthesisError::InvalidResponse(_) => "invalid_response",
            SynthesisError::Cancelled => "cancelled",
            SynthesisError::InvalidConfiguration(_) => "invalid_configuration",
            SynthesisError::Internal(_) => "internal",
        }
    }

    /// Map a transport-level failure onto the taxonomy.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SynthesisError::Timeout(err.to_string())
        } else {
            SynthesisError::NetworkError(err.to_string())
        }
    }
}

/// One HTTP TTS provider: takes a rendered request, returns complete audio.
///
/// Implementations are stateless beyond credentials and a shared HTTP client,
/// so a single instance can serve concurrent batches.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Which provider this synthesizer talks to.
    fn provider(&self) -> ProviderId;

    /// Voice used for synthesis, recorded alongside saved results.
    fn voice_id(&self) -> &str;

    /// Perform one batch synthesis call. A non-2xx status maps to
    /// `ProviderApiError`, transport failures to `NetworkError`/`Timeout`,
    /// and a malformed audio envelope to `InvalidResponse`.
    async fn synthesize(&self, request: &RenderedRequest) -> Result<AudioData, SynthesisError>;
}
