//! Static provider capability profiles.
//!
//! One declarative entry per provider: which models it exposes, whether it
//! honors emotion markup at all, which markup style it speaks, and how each
//! [`EmotionTag`] maps to the provider's native emotion name. The table is
//! process-wide immutable data; adding a provider means adding one entry here
//! plus one synthesizer, with no orchestrator changes.

use std::fmt;
use std::str::FromStr;

use super::tag::EmotionTag;

/// Identifier for a registered TTS provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Cartesia,
    Inworld,
    ElevenLabs,
    Hume,
    Speechify,
}

impl ProviderId {
    /// All registered providers, in display order.
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Cartesia,
        ProviderId::Inworld,
        ProviderId::ElevenLabs,
        ProviderId::Hume,
        ProviderId::Speechify,
    ];

    /// Lowercase machine name, used for CLI flags, env lookups and filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Cartesia => "cartesia",
            ProviderId::Inworld => "inworld",
            ProviderId::ElevenLabs => "elevenlabs",
            ProviderId::Hume => "hume",
            ProviderId::Speechify => "speechify",
        }
    }

    /// Human-readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Cartesia => "Cartesia",
            ProviderId::Inworld => "Inworld AI",
            ProviderId::ElevenLabs => "ElevenLabs",
            ProviderId::Hume => "Hume",
            ProviderId::Speechify => "Speechify",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a provider name that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cartesia" => Ok(ProviderId::Cartesia),
            "inworld" | "inworld-ai" => Ok(ProviderId::Inworld),
            "elevenlabs" => Ok(ProviderId::ElevenLabs),
            "hume" => Ok(ProviderId::Hume),
            "speechify" => Ok(ProviderId::Speechify),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// How a provider expects emotion information to be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupStyle {
    /// Inline `[emotion]` tokens inside the text (Cartesia, Inworld, ElevenLabs).
    InlineBracket,
    /// Comma-joined native names in a side-channel `description` field (Hume).
    DescriptionField,
    /// SSML-like `<speechify:style emotion="...">` span wrapper (Speechify).
    StyleAttribute,
}

/// Declarative capability profile for one provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderProfile {
    pub id: ProviderId,
    /// Selectable model ids, default first.
    pub models: &'static [&'static str],
    /// Whether any emotion markup is honored by this provider at all.
    /// When false the emotion map is empty and tags are dropped silently.
    pub can_emote: bool,
    pub markup_style: MarkupStyle,
    /// EmotionTag -> provider-native name. A missing key means the emotion is
    /// unsupported on this provider and is downgraded at render time.
    pub emotion_map: &'static [(EmotionTag, &'static str)],
}

impl ProviderProfile {
    /// Default model id for this provider.
    pub fn default_model(&self) -> &'static str {
        self.models[0]
    }

    /// Native name for an emotion, or None when the provider has no mapping.
    pub fn native_emotion(&self, tag: EmotionTag) -> Option<&'static str> {
        self.emotion_map
            .iter()
            .find(|(key, _)| *key == tag)
            .map(|(_, native)| *native)
    }

    /// Whether emotion markup is honored for a specific model.
    ///
    /// Cartesia emotes only on the sonic-3 family and ElevenLabs only on
    /// eleven_v3; every other provider's models inherit the profile flag.
    pub fn can_emote_with(&self, model: &str) -> bool {
        if !self.can_emote {
            return false;
        }
        match self.id {
            ProviderId::Cartesia => model.starts_with("sonic-3"),
            ProviderId::ElevenLabs => model == "eleven_v3",
            _ => true,
        }
    }
}

const CARTESIA: ProviderProfile = ProviderProfile {
    id: ProviderId::Cartesia,
    models: &["sonic-3", "sonic-2"],
    can_emote: true,
    markup_style: MarkupStyle::InlineBracket,
    emotion_map: &[
        (EmotionTag::Laughter, "laughter"),
        (EmotionTag::Angry, "angry"),
        (EmotionTag::Excited, "excited"),
        (EmotionTag::Sad, "sad"),
        (EmotionTag::Scared, "scared"),
    ],
};

const INWORLD: ProviderProfile = ProviderProfile {
    id: ProviderId::Inworld,
    models: &["inworld-tts-1", "inworld-tts-1-max"],
    can_emote: true,
    markup_style: MarkupStyle::InlineBracket,
    emotion_map: &[
        (EmotionTag::Laughter, "laughing"),
        (EmotionTag::Angry, "angry"),
        (EmotionTag::Excited, "happy"),
        (EmotionTag::Sad, "sad"),
        (EmotionTag::Scared, "fearful"),
    ],
};

const ELEVENLABS: ProviderProfile = ProviderProfile {
    id: ProviderId::ElevenLabs,
    models: &["eleven_v3", "eleven_flash_v2_5"],
    can_emote: true,
    markup_style: MarkupStyle::InlineBracket,
    emotion_map: &[
        (EmotionTag::Laughter, "laughter"),
        (EmotionTag::Angry, "angry"),
        (EmotionTag::Excited, "excited"),
        (EmotionTag::Sad, "sad"),
        (EmotionTag::Scared, "scared"),
    ],
};

const HUME: ProviderProfile = ProviderProfile {
    id: ProviderId::Hume,
    // Hume selects Octave versions by number; "2" is the current default.
    models: &["2", "1"],
    can_emote: true,
    markup_style: MarkupStyle::DescriptionField,
    emotion_map: &[
        (EmotionTag::Laughter, "laughter"),
        (EmotionTag::Angry, "angry"),
        (EmotionTag::Excited, "happy"),
        (EmotionTag::Sad, "sad"),
        (EmotionTag::Scared, "fearful"),
    ],
};

const SPEECHIFY: ProviderProfile = ProviderProfile {
    id: ProviderId::Speechify,
    models: &["simba-english"],
    can_emote: true,
    markup_style: MarkupStyle::StyleAttribute,
    // No laughter mapping; laughter downgrades with a capability warning.
    emotion_map: &[
        (EmotionTag::Angry, "angry"),
        (EmotionTag::Excited, "energetic"),
        (EmotionTag::Sad, "sad"),
        (EmotionTag::Scared, "terrified"),
    ],
};

/// Look up the static profile for a provider. O(1).
pub fn profile_for(id: ProviderId) -> &'static ProviderProfile {
    match id {
        ProviderId::Cartesia => &CARTESIA,
        ProviderId::Inworld => &INWORLD,
        ProviderId::ElevenLabs => &ELEVENLABS,
        ProviderId::Hume => &HUME,
        ProviderId::Speechify => &SPEECHIFY,
    }
}
