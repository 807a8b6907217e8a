use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::emotion::ProviderId;

/// Process-wide configuration, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Per-provider API keys; a missing key skips that provider with a
    /// per-provider warning, never the whole batch.
    pub cartesia_api_key: Option<String>,
    pub inworld_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub hume_api_key: Option<String>,
    pub speechify_api_key: Option<String>,
    /// TCP connect timeout in seconds.
    pub connect_timeout_seconds: u64,
    /// Per-provider wall-clock budget for one synthesis call, in seconds.
    pub request_timeout_seconds: u64,
    /// Where per-request audio folders are written.
    pub data_dir: PathBuf,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            cartesia_api_key: None,
            inworld_api_key: None,
            elevenlabs_api_key: None,
            hume_api_key: None,
            speechify_api_key: None,
            connect_timeout_seconds: 10,
            request_timeout_seconds: 60,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl EvalConfig {
    /// Load configuration from environment variables, with sensible defaults.
    /// Also loads from a .env file if present using dotenvy.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let cartesia_api_key = env::var("CARTESIA_API_KEY").ok();
        let inworld_api_key = env::var("INWORLD_API_KEY").ok();
        let elevenlabs_api_key = env::var("ELEVENLABS_API_KEY").ok();
        let hume_api_key = env::var("HUME_API_KEY").ok();
        let speechify_api_key = env::var("SPEECHIFY_API_KEY").ok();

        let connect_timeout_seconds = match env::var("TTS_CONNECT_TIMEOUT_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| format!("Invalid TTS_CONNECT_TIMEOUT_SECONDS: {e}"))?,
            Err(_) => 10,
        };
        let request_timeout_seconds = match env::var("TTS_REQUEST_TIMEOUT_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| format!("Invalid TTS_REQUEST_TIMEOUT_SECONDS: {e}"))?,
            Err(_) => 60,
        };

        let data_dir = env::var("TTS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Ok(EvalConfig {
            cartesia_api_key,
            inworld_api_key,
            elevenlabs_api_key,
            hume_api_key,
            speechify_api_key,
            connect_timeout_seconds,
            request_timeout_seconds,
            data_dir,
        })
    }

    /// API key for one provider, if configured.
    pub fn api_key(&self, id: ProviderId) -> Option<&str> {
        let key = match id {
            ProviderId::Cartesia => &self.cartesia_api_key,
            ProviderId::Inworld => &self.inworld_api_key,
            ProviderId::ElevenLabs => &self.elevenlabs_api_key,
            ProviderId::Hume => &self.hume_api_key,
            ProviderId::Speechify => &self.speechify_api_key,
        };
        key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Providers that have an API key configured, in display order.
    pub fn configured_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.api_key(*id).is_some())
            .collect()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
