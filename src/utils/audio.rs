//! Audio persistence: format sniffing, per-request data folders and history.
//!
//! Every submission gets `data/<uuid>/` holding `request.json` plus one audio
//! file per successful provider (`cartesia.mp3`, `elevenlabs.wav`, ...).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::core::emotion::ProviderId;

/// Audio container formats the comparison tool recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    /// Detect the container from the byte header; None when unrecognized.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WAVE" {
            Some(AudioFormat::Wav)
        } else if data.starts_with(b"ID3") || data.starts_with(&[0xFF, 0xFB]) {
            Some(AudioFormat::Mp3)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

/// Settings snapshot for one provider, stored in `request.json` so past
/// generations can be replayed against the models that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub name: String,
    pub model_id: String,
    pub voice_id: String,
}

/// Metadata written next to the audio files of one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub timestamp: DateTime<Utc>,
    pub uuid: String,
    pub text: String,
    #[serde(default)]
    pub provider_settings: Vec<ProviderSettings>,
}

/// Create a unique folder for one submission and persist its metadata.
///
/// Returns the request uuid and the created folder path.
pub fn create_request_folder(
    data_dir: &Path,
    text: &str,
    provider_settings: &[ProviderSettings],
) -> io::Result<(String, PathBuf)> {
    let request_uuid = Uuid::new_v4().to_string();
    let folder = data_dir.join(&request_uuid);
    fs::create_dir_all(&folder)?;

    let record = RequestRecord {
        timestamp: Utc::now(),
        uuid: request_uuid.clone(),
        text: text.to_string(),
        provider_settings: provider_settings.to_vec(),
    };
    let json = serde_json::to_string_pretty(&record).map_err(io::Error::other)?;
    fs::write(folder.join("request.json"), json)?;

    Ok((request_uuid, folder))
}

/// Save one provider's audio into the request folder.
pub fn save_audio(
    data: &[u8],
    provider: ProviderId,
    format: AudioFormat,
    request_folder: &Path,
) -> io::Result<PathBuf> {
    let path = request_folder.join(format!("{}.{}", provider.as_str(), format.extension()));
    fs::write(&path, data)?;
    Ok(path)
}

/// List past submissions, newest first. Folders without a readable
/// `request.json` are skipped.
pub fn recent_requests(data_dir: &Path, limit: usize) -> Vec<(PathBuf, RequestRecord)> {
    let Ok(entries) = fs::read_dir(data_dir) else {
        return Vec::new();
    };

    let mut records: Vec<(PathBuf, RequestRecord)> = Vec::new();
    for entry in entries.flatten() {
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }
        let json_path = folder.join("request.json");
        let Ok(raw) = fs::read_to_string(&json_path) else {
            continue;
        };
        match serde_json::from_str::<RequestRecord>(&raw) {
            Ok(record) => records.push((folder, record)),
            Err(e) => warn!("Skipping malformed {}: {e}", json_path.display()),
        }
    }

    records.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
    records.truncate(limit);
    records
}
